mod cfg;

pub use cfg::{BlockId, BlockKind, CfgBlock, ControlFlowGraph};
