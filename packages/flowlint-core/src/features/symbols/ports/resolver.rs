use crate::shared::models::{NodeId, SymbolId, SyntaxTree};

/// Resolution oracle mapping identifier nodes to symbol identities.
///
/// Scoping and shadowing rules live behind this trait; the analyses
/// only require that two nodes naming the same entity resolve to the
/// same `SymbolId`. Returning `None` means the identifier is not
/// resolvable (unknown global, property name, ...) and the usage is
/// skipped.
pub trait SymbolResolver: Send + Sync {
    fn resolve(&self, tree: &SyntaxTree, node: NodeId) -> Option<SymbolId>;
}
