/*
 * Flowlint Core - dead-store analysis engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/    : Common models (SyntaxTree, Span, SymbolId)
 * - features/  : Vertical slices (symbols → flow_graph → liveness)
 *
 * The pipeline for one compilation unit:
 *   usage table (symbols) → per-function CFG (flow_graph, built
 *   backward) → live-variable fixpoint (liveness) → dead flags
 *   committed back into the usage table.
 */

#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional

pub mod errors;
pub mod features;
pub mod shared;

pub use errors::{FlowlintError, Result};
pub use features::flow_graph::{BlockId, BlockKind, CfgBlock, CfgBuilder, ControlFlowGraph};
pub use features::liveness::{
    is_basic_default_value, AnalyzeUnitUseCase, LiveVariableAnalyzer, LvaReturn, UnitAnalysis,
};
pub use features::symbols::{
    NameResolver, SymbolResolver, SymbolTableBuilder, Usage, UsageFlag, UsageFlags, UsageId,
    UsageTable,
};
pub use shared::models::{
    collect_left_hand_identifiers, AstKind, BinaryOp, ForEachKind, LiteralKind, NodeId, Span,
    SymbolId, SyntaxTree, TreeBuilder, UnaryOp,
};
