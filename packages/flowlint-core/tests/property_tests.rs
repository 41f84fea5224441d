//! Generated-program properties
//!
//! Any program assembled from the supported statement set must build a
//! graph, keep that graph stable under repeated finalization, and drive
//! the liveness fixpoint to termination.

use proptest::prelude::*;

use flowlint_core::{
    CfgBuilder, LiveVariableAnalyzer, NameResolver, NodeId, SymbolTableBuilder, TreeBuilder,
};

#[derive(Debug, Clone)]
enum GenStmt {
    Assign { target: u8, value: u8 },
    Use(u8),
    Ret(Option<u8>),
    If { cond: u8, then: Vec<GenStmt>, otherwise: Vec<GenStmt> },
    While { cond: u8, body: Vec<GenStmt> },
    DoWhile { cond: u8, body: Vec<GenStmt> },
}

fn gen_stmt() -> impl Strategy<Value = GenStmt> {
    let leaf = prop_oneof![
        (0u8..4, 0u8..4).prop_map(|(target, value)| GenStmt::Assign { target, value }),
        (0u8..4).prop_map(GenStmt::Use),
        proptest::option::of(0u8..4).prop_map(GenStmt::Ret),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (
                0u8..4,
                prop::collection::vec(inner.clone(), 0..3),
                prop::collection::vec(inner.clone(), 0..3)
            )
                .prop_map(|(cond, then, otherwise)| GenStmt::If { cond, then, otherwise }),
            (0u8..4, prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(cond, body)| GenStmt::While { cond, body }),
            (0u8..4, prop::collection::vec(inner, 0..3))
                .prop_map(|(cond, body)| GenStmt::DoWhile { cond, body }),
        ]
    })
}

fn var(b: &mut TreeBuilder, index: u8) -> NodeId {
    b.ident(&format!("v{index}"))
}

fn emit(b: &mut TreeBuilder, stmt: &GenStmt) -> NodeId {
    match stmt {
        GenStmt::Assign { target, value } => {
            let target = var(b, *target);
            let value = var(b, *value);
            let assign = b.assign(target, value);
            b.expr_stmt(assign)
        }
        GenStmt::Use(index) => {
            let callee = b.ident("use");
            let arg = var(b, *index);
            let call = b.call(callee, vec![arg]);
            b.expr_stmt(call)
        }
        GenStmt::Ret(value) => {
            let value = value.map(|index| var(b, index));
            b.ret(value)
        }
        GenStmt::If { cond, then, otherwise } => {
            let cond = var(b, *cond);
            let then = emit_block(b, then);
            let otherwise = if otherwise.is_empty() {
                None
            } else {
                Some(emit_block(b, otherwise))
            };
            b.if_stmt(cond, then, otherwise)
        }
        GenStmt::While { cond, body } => {
            let cond = var(b, *cond);
            let body = emit_block(b, body);
            b.while_stmt(cond, body)
        }
        GenStmt::DoWhile { cond, body } => {
            let body = emit_block(b, body);
            let cond = var(b, *cond);
            b.do_while(body, cond)
        }
    }
}

fn emit_block(b: &mut TreeBuilder, stmts: &[GenStmt]) -> NodeId {
    let ids: Vec<NodeId> = stmts.iter().map(|s| emit(b, s)).collect();
    b.block(ids)
}

proptest! {
    #[test]
    fn supported_programs_always_analyze(stmts in prop::collection::vec(gen_stmt(), 0..6)) {
        let mut b = TreeBuilder::new();
        let ids: Vec<NodeId> = stmts.iter().map(|s| emit(&mut b, s)).collect();
        let tree = b.finish(ids.clone());

        let cfg = CfgBuilder::build(&tree, &ids).unwrap();
        let mut again = cfg.clone();
        again.finalize();
        prop_assert_eq!(&cfg, &again);

        let resolver = NameResolver::for_tree(&tree);
        let table = SymbolTableBuilder::build(&tree, &resolver);
        let analyzer = LiveVariableAnalyzer::new(&tree, &table);
        prop_assert!(analyzer.analyze(tree.root(), &ids).is_some());
    }
}
