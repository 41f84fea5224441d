//! End-to-end dead-store detection
//!
//! Scenarios run through the full pipeline: usage table, backward CFG,
//! liveness fixpoint, committed dead flags.

use flowlint_core::{
    AnalyzeUnitUseCase, BinaryOp, LiveVariableAnalyzer, NameResolver, SymbolTableBuilder,
    SyntaxTree, TreeBuilder, UnitAnalysis, UsageTable,
};

fn analyze_unit(tree: &SyntaxTree) -> UnitAnalysis {
    let resolver = NameResolver::for_tree(tree);
    AnalyzeUnitUseCase::new(resolver).execute(tree)
}

fn analyze_top_level(
    tree: &SyntaxTree,
    statements: &[flowlint_core::NodeId],
) -> (flowlint_core::LvaReturn, UsageTable) {
    let resolver = NameResolver::for_tree(tree);
    let table = SymbolTableBuilder::build(tree, &resolver);
    let analyzer = LiveVariableAnalyzer::new(tree, &table);
    let result = analyzer.analyze(tree.root(), statements).unwrap();
    (result, table)
}

#[test]
fn overwritten_store_in_branch_is_live_on_the_other_path() {
    // x = 1; if (c) { x = 2; } use(x);
    let mut b = TreeBuilder::new();
    let x0 = b.ident("x");
    let one = b.number("1");
    let a0 = b.assign(x0, one);
    let s0 = b.expr_stmt(a0);
    let c = b.ident("c");
    let x1 = b.ident("x");
    let two = b.number("2");
    let a1 = b.assign(x1, two);
    let then_branch = b.expr_stmt(a1);
    let if_stmt = b.if_stmt(c, then_branch, None);
    let use_fn = b.ident("use");
    let x2 = b.ident("x");
    let call = b.call(use_fn, vec![x2]);
    let s2 = b.expr_stmt(call);
    let tree = b.finish(vec![s0, if_stmt, s2]);

    let (result, table) = analyze_top_level(&tree, &[s0, if_stmt, s2]);
    // the false path reads the first store, the true path the second
    assert!(!result.is_dead(table.lookup_id(x0).unwrap()));
    assert!(!result.is_dead(table.lookup_id(x1).unwrap()));
}

#[test]
fn store_overwritten_on_every_path_is_dead() {
    // x = 1; if (c) { x = 2; } else { x = 3; } use(x);
    let mut b = TreeBuilder::new();
    let x0 = b.ident("x");
    let one = b.number("1");
    let a0 = b.assign(x0, one);
    let s0 = b.expr_stmt(a0);
    let c = b.ident("c");
    let x1 = b.ident("x");
    let two = b.number("2");
    let a1 = b.assign(x1, two);
    let then_branch = b.expr_stmt(a1);
    let x2 = b.ident("x");
    let three = b.number("3");
    let a2 = b.assign(x2, three);
    let else_branch = b.expr_stmt(a2);
    let if_stmt = b.if_stmt(c, then_branch, Some(else_branch));
    let use_fn = b.ident("use");
    let x3 = b.ident("x");
    let call = b.call(use_fn, vec![x3]);
    let s2 = b.expr_stmt(call);
    let tree = b.finish(vec![s0, if_stmt, s2]);

    let (result, table) = analyze_top_level(&tree, &[s0, if_stmt, s2]);
    assert!(result.is_dead(table.lookup_id(x0).unwrap()));
    assert!(!result.is_dead(table.lookup_id(x1).unwrap()));
    assert!(!result.is_dead(table.lookup_id(x2).unwrap()));
}

#[test]
fn do_while_back_edge_reaches_fixpoint() {
    // x = 0; do { use(x); x = f(x); } while (c);
    let mut b = TreeBuilder::new();
    let x0 = b.ident("x");
    let zero = b.number("0");
    let a0 = b.assign(x0, zero);
    let s0 = b.expr_stmt(a0);
    let use_fn = b.ident("use");
    let x1 = b.ident("x");
    let call1 = b.call(use_fn, vec![x1]);
    let s1 = b.expr_stmt(call1);
    let x2 = b.ident("x");
    let f = b.ident("f");
    let x3 = b.ident("x");
    let call2 = b.call(f, vec![x3]);
    let a2 = b.assign(x2, call2);
    let s2 = b.expr_stmt(a2);
    let body = b.block(vec![s1, s2]);
    let c = b.ident("c");
    let do_stmt = b.do_while(body, c);
    let tree = b.finish(vec![s0, do_stmt]);

    let (result, table) = analyze_top_level(&tree, &[s0, do_stmt]);
    // the store at the loop bottom is read on the next iteration
    assert!(!result.is_dead(table.lookup_id(x2).unwrap()));
    assert!(!result.is_dead(table.lookup_id(x0).unwrap()));
}

#[test]
fn for_loop_without_initializer_keeps_prior_stores_out_of_the_back_edge() {
    // x = 0; for (; c; ) { use(x); x = f(); }
    let mut b = TreeBuilder::new();
    let x0 = b.ident("x");
    let zero = b.number("0");
    let a0 = b.assign(x0, zero);
    let s0 = b.expr_stmt(a0);
    let c = b.ident("c");
    let use_fn = b.ident("use");
    let x1 = b.ident("x");
    let call1 = b.call(use_fn, vec![x1]);
    let s1 = b.expr_stmt(call1);
    let x2 = b.ident("x");
    let f = b.ident("f");
    let call2 = b.call(f, vec![]);
    let a2 = b.assign(x2, call2);
    let s2 = b.expr_stmt(a2);
    let body = b.block(vec![s1, s2]);
    let for_stmt = b.for_stmt(None, Some(c), None, body);
    let tree = b.finish(vec![s0, for_stmt]);

    let (result, table) = analyze_top_level(&tree, &[s0, for_stmt]);
    // without an initializer the condition block is the back-edge
    // target; the statement before the loop must not end up inside it
    assert!(!result.is_dead(table.lookup_id(x2).unwrap()));
    assert!(!result.is_dead(table.lookup_id(x0).unwrap()));
}

#[test]
fn compound_assignment_reads_before_writing() {
    // x = 1; x += 1;
    let mut b = TreeBuilder::new();
    let x0 = b.ident("x");
    let one = b.number("1");
    let a0 = b.assign(x0, one);
    let s0 = b.expr_stmt(a0);
    let x1 = b.ident("x");
    let one2 = b.number("1");
    let a1 = b.binary(BinaryOp::AddAssign, x1, one2);
    let s1 = b.expr_stmt(a1);
    let tree = b.finish(vec![s0, s1]);

    let (result, table) = analyze_top_level(&tree, &[s0, s1]);
    // the initial store is consumed by the compound assignment
    assert!(!result.is_dead(table.lookup_id(x0).unwrap()));
    // the compounded value itself is never read
    assert!(result.is_dead(table.lookup_id(x1).unwrap()));
}

#[test]
fn destructuring_assignment_flags_unread_targets() {
    // [a, b] = f(); use(a);
    let mut b = TreeBuilder::new();
    let a = b.ident("a");
    let b_id = b.ident("b");
    let target = b.array(vec![a, b_id]);
    let f = b.ident("f");
    let call = b.call(f, vec![]);
    let assign = b.assign(target, call);
    let s0 = b.expr_stmt(assign);
    let use_fn = b.ident("use");
    let a_read = b.ident("a");
    let call2 = b.call(use_fn, vec![a_read]);
    let s1 = b.expr_stmt(call2);
    let tree = b.finish(vec![s0, s1]);

    let (result, table) = analyze_top_level(&tree, &[s0, s1]);
    assert!(!result.is_dead(table.lookup_id(a).unwrap()));
    assert!(result.is_dead(table.lookup_id(b_id).unwrap()));
}

#[test]
fn switch_fallthrough_carries_liveness_across_clauses() {
    // switch (k) { case 1: x = 1; case 2: use(x); default: x = 2; }
    let mut b = TreeBuilder::new();
    let k = b.ident("k");
    let one = b.number("1");
    let x0 = b.ident("x");
    let one_val = b.number("1");
    let a0 = b.assign(x0, one_val);
    let s0 = b.expr_stmt(a0);
    let case1 = b.case(one, vec![s0]);
    let two = b.number("2");
    let use_fn = b.ident("use");
    let x1 = b.ident("x");
    let call = b.call(use_fn, vec![x1]);
    let s1 = b.expr_stmt(call);
    let case2 = b.case(two, vec![s1]);
    let x2 = b.ident("x");
    let two_val = b.number("2");
    let a2 = b.assign(x2, two_val);
    let s2 = b.expr_stmt(a2);
    let default = b.default_clause(vec![s2]);
    let switch = b.switch(k, vec![case1, case2, default]);
    let tree = b.finish(vec![switch]);

    let (result, table) = analyze_top_level(&tree, &[switch]);
    // case 1 falls through into the read in case 2
    assert!(!result.is_dead(table.lookup_id(x0).unwrap()));
    // the default store is never read
    assert!(result.is_dead(table.lookup_id(x2).unwrap()));
}

#[test]
fn closures_suppress_all_verdicts_for_captured_symbols() {
    // function outer() { let x = 1; x = 2; cb = () => x; }
    let mut b = TreeBuilder::new();
    let outer_name = b.ident("outer");
    let x0 = b.ident("x");
    let one = b.number("1");
    let decl = b.var_decl(x0, Some(one));
    let s0 = b.var_stmt(vec![decl]);
    let x1 = b.ident("x");
    let two = b.number("2");
    let a1 = b.assign(x1, two);
    let s1 = b.expr_stmt(a1);
    let x2 = b.ident("x");
    let ret = b.ret(Some(x2));
    let arrow_body = b.block(vec![ret]);
    let arrow = b.arrow(vec![], arrow_body);
    let cb = b.ident("cb");
    let a2 = b.assign(cb, arrow);
    let s2 = b.expr_stmt(a2);
    let body = b.block(vec![s0, s1, s2]);
    let func = b.function_decl(outer_name, vec![], body);
    let tree = b.finish(vec![func]);

    let analysis = analyze_unit(&tree);
    // x escapes into the closure: even the overwritten first store is
    // not reported
    assert!(!analysis.table.lookup(x0).unwrap().dead);
    assert!(!analysis.table.lookup(x1).unwrap().dead);
}

#[test]
fn parameter_initial_value_liveness_at_entry() {
    // function f(p) { return p; }   function g(q) { q = 1; return q; }
    let mut b = TreeBuilder::new();
    let f_name = b.ident("f");
    let p = b.ident("p");
    let f_param = b.param(p);
    let p_read = b.ident("p");
    let f_ret = b.ret(Some(p_read));
    let f_body = b.block(vec![f_ret]);
    let f = b.function_decl(f_name, vec![f_param], f_body);

    let g_name = b.ident("g");
    let q = b.ident("q");
    let g_param = b.param(q);
    let q1 = b.ident("q");
    let one = b.number("1");
    let qa = b.assign(q1, one);
    let g_s0 = b.expr_stmt(qa);
    let q_read = b.ident("q");
    let g_ret = b.ret(Some(q_read));
    let g_body = b.block(vec![g_s0, g_ret]);
    let g = b.function_decl(g_name, vec![g_param], g_body);
    let tree = b.finish(vec![f, g]);

    let resolver = NameResolver::for_tree(&tree);
    let p_symbol = resolver.symbol_named("p").unwrap();
    let q_symbol = resolver.symbol_named("q").unwrap();
    let table = SymbolTableBuilder::build(&tree, &resolver);
    let analyzer = LiveVariableAnalyzer::new(&tree, &table);

    let f_result = analyzer.analyze_function(f).unwrap();
    assert!(f_result.live_at_start().unwrap().contains(&p_symbol));

    let g_result = analyzer.analyze_function(g).unwrap();
    // q is overwritten before any read: its initial value is ignored
    assert!(!g_result.live_at_start().unwrap().contains(&q_symbol));
}

#[test]
fn declaration_without_read_is_dead_and_exemptible() {
    // let n = 0; let m = compute(); n and m never read
    let mut b = TreeBuilder::new();
    let n = b.ident("n");
    let zero = b.number("0");
    let dn = b.var_decl(n, Some(zero));
    let s0 = b.var_stmt(vec![dn]);
    let m = b.ident("m");
    let compute = b.ident("compute");
    let call = b.call(compute, vec![]);
    let dm = b.var_decl(m, Some(call));
    let s1 = b.var_stmt(vec![dm]);
    let tree = b.finish(vec![s0, s1]);

    let (result, table) = analyze_top_level(&tree, &[s0, s1]);
    assert!(result.is_dead(table.lookup_id(n).unwrap()));
    assert!(result.is_dead(table.lookup_id(m).unwrap()));
    // a rule layer would keep the `m` report and drop the `n` one
    assert!(flowlint_core::is_basic_default_value(&tree, zero));
    assert!(!flowlint_core::is_basic_default_value(&tree, call));
}

#[test]
fn while_loop_with_accumulator_converges() {
    // s = 0; i = 0; while (i < n) { s = s + i; i = i + 1; } use(s);
    let mut b = TreeBuilder::new();
    let s0_id = b.ident("s");
    let zero1 = b.number("0");
    let sa = b.assign(s0_id, zero1);
    let st0 = b.expr_stmt(sa);
    let i0 = b.ident("i");
    let zero2 = b.number("0");
    let ia = b.assign(i0, zero2);
    let st1 = b.expr_stmt(ia);
    let i_cond = b.ident("i");
    let n = b.ident("n");
    let cond = b.binary(BinaryOp::Lt, i_cond, n);
    let s1_id = b.ident("s");
    let s_read = b.ident("s");
    let i_read = b.ident("i");
    let sum = b.binary(BinaryOp::Add, s_read, i_read);
    let sb = b.assign(s1_id, sum);
    let st2 = b.expr_stmt(sb);
    let i1 = b.ident("i");
    let i_read2 = b.ident("i");
    let one = b.number("1");
    let inc = b.binary(BinaryOp::Add, i_read2, one);
    let ib = b.assign(i1, inc);
    let st3 = b.expr_stmt(ib);
    let body = b.block(vec![st2, st3]);
    let while_stmt = b.while_stmt(cond, body);
    let use_fn = b.ident("use");
    let s_final = b.ident("s");
    let call = b.call(use_fn, vec![s_final]);
    let st4 = b.expr_stmt(call);
    let tree = b.finish(vec![st0, st1, while_stmt, st4]);

    let (result, table) = analyze_top_level(&tree, &[st0, st1, while_stmt, st4]);
    for store in [s0_id, i0, s1_id, i1] {
        assert!(
            !result.is_dead(table.lookup_id(store).unwrap()),
            "store {} should be live",
            tree.text(store)
        );
    }
}
