//! Spelling-based symbol resolution
//!
//! Interns every identifier spelling in a unit up front and resolves
//! nodes by their text. No lexical scoping: two identifiers with the
//! same spelling are the same symbol. Sufficient for single-scope
//! fixtures and tests; a real frontend plugs its own resolver into the
//! `SymbolResolver` port instead.

use rustc_hash::FxHashMap;

use crate::features::symbols::ports::SymbolResolver;
use crate::shared::models::{AstKind, NodeId, SymbolId, SyntaxTree};

#[derive(Debug, Default)]
pub struct NameResolver {
    by_name: FxHashMap<String, SymbolId>,
}

impl NameResolver {
    pub fn for_tree(tree: &SyntaxTree) -> Self {
        let mut by_name = FxHashMap::default();
        for id in tree.node_ids() {
            if matches!(tree.kind(id), AstKind::Ident) {
                let next = SymbolId(by_name.len() as u32);
                by_name.entry(tree.text(id).to_string()).or_insert(next);
            }
        }
        Self { by_name }
    }

    pub fn symbol_named(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }
}

impl SymbolResolver for NameResolver {
    fn resolve(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolId> {
        if !tree.is_identifier(node) {
            return None;
        }
        self.by_name.get(tree.text(node)).copied()
    }
}
