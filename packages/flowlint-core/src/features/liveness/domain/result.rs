//! Liveness analysis result model

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::features::flow_graph::domain::{BlockId, ControlFlowGraph};
use crate::features::symbols::domain::UsageId;
use crate::shared::models::{AstKind, LiteralKind, NodeId, SymbolId, SyntaxTree, UnaryOp};

/// Outcome of analyzing one function body.
///
/// `dead` holds the verdicts of the final fixpoint iteration; the caller
/// commits them into the usage table (`UsageTable::mark_dead`). The
/// analyzer itself never mutates shared state, which is what allows
/// analyzing the functions of a unit in parallel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LvaReturn {
    pub cfg: ControlFlowGraph,
    /// Per block: symbols whose value may be read after entering it
    pub block_live_in: FxHashMap<BlockId, FxHashSet<SymbolId>>,
    /// Write usages whose stored value is never read
    pub dead: FxHashSet<UsageId>,
}

impl LvaReturn {
    pub fn is_dead(&self, usage: UsageId) -> bool {
        self.dead.contains(&usage)
    }

    /// Symbols live when control enters `block`. For the start block
    /// this is the set of values that must already exist at function
    /// entry (parameters whose initial value is actually used).
    pub fn live_symbols_at_entry(&self, block: BlockId) -> Option<&FxHashSet<SymbolId>> {
        self.block_live_in.get(&block)
    }

    pub fn live_at_start(&self) -> Option<&FxHashSet<SymbolId>> {
        self.live_symbols_at_entry(self.cfg.start())
    }
}

/// Trivial initializer values that rule layers typically exempt from
/// dead-store reporting: `0`, `1`, empty string, `true`/`false`,
/// `null`, unary minus over those, and empty array or object literals.
/// Consulted by consumers only; the analysis itself does not special-case
/// these.
pub fn is_basic_default_value(tree: &SyntaxTree, node: NodeId) -> bool {
    match tree.kind(node) {
        AstKind::Literal { kind } => match kind {
            LiteralKind::Boolean | LiteralKind::Null => true,
            LiteralKind::Number => matches!(tree.text(node), "0" | "1"),
            LiteralKind::String => matches!(tree.text(node), "\"\"" | "''"),
            _ => false,
        },
        AstKind::PrefixUnary {
            op: UnaryOp::Minus,
            operand,
        } => is_basic_default_value(tree, *operand),
        AstKind::ArrayLit { elements } => elements.is_empty(),
        AstKind::ObjectLit { properties } => properties.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::TreeBuilder;

    #[test]
    fn test_basic_default_values() {
        let mut b = TreeBuilder::new();
        let zero = b.number("0");
        let two = b.number("2");
        let yes = b.boolean(true);
        let nil = b.null();
        let empty_str = b.string("");
        let full_str = b.string("x");
        let neg_one = {
            let one = b.number("1");
            b.prefix(UnaryOp::Minus, one)
        };
        let empty_arr = b.array(vec![]);
        let arr = {
            let e = b.number("3");
            b.array(vec![e])
        };
        let empty_obj = b.object(vec![]);
        let x = b.ident("x");
        let tree = b.finish(vec![zero, two, yes, nil, empty_str, full_str, neg_one, empty_arr, arr, empty_obj, x]);

        for node in [zero, yes, nil, empty_str, neg_one, empty_arr, empty_obj] {
            assert!(is_basic_default_value(&tree, node), "{}", tree.text(node));
        }
        for node in [two, full_str, arr, x] {
            assert!(!is_basic_default_value(&tree, node), "{}", tree.text(node));
        }
    }
}
