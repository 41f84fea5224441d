//! Flow-graph feature - per-function control flow graphs
//!
//! Blocks are built backward from the function exit, then finalized:
//! predecessors derived, empty blocks collapsed.

pub mod domain;
pub mod infrastructure;

pub use domain::{BlockId, BlockKind, CfgBlock, ControlFlowGraph};
pub use infrastructure::CfgBuilder;
