//! Control-flow graph block model
//!
//! A graph is a dense arena of blocks. Block 0 is always the synthetic
//! end block; edges are stored forward (successors) and derived backward
//! (predecessors) during `finalize`. Element lists hold syntax nodes in
//! execution order once construction is done.

use serde::{Deserialize, Serialize};

use crate::shared::models::{NodeId, SyntaxTree};

/// Dense index of a block in its graph arena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Straight-line block with unconditional out-edges
    Generic { successors: Vec<BlockId> },
    /// Two-way branch; `label` is the source rendering of the condition
    Branching {
        label: String,
        true_successor: BlockId,
        false_successor: BlockId,
    },
    /// Synthetic exit; ignores elements, has no successors
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfgBlock {
    pub kind: BlockKind,
    /// Syntax nodes executed in this block, in execution order
    pub elements: Vec<NodeId>,
    /// Derived by `finalize`; may hold duplicates when both branch arms
    /// of a predecessor target this block
    pub predecessors: Vec<BlockId>,
    /// Spliced out by empty-block collapse
    pub removed: bool,
}

impl CfgBlock {
    pub fn generic() -> Self {
        Self {
            kind: BlockKind::Generic {
                successors: Vec::new(),
            },
            elements: Vec::new(),
            predecessors: Vec::new(),
            removed: false,
        }
    }

    pub fn end() -> Self {
        Self {
            kind: BlockKind::End,
            elements: Vec::new(),
            predecessors: Vec::new(),
            removed: false,
        }
    }

    /// Out-edges in deterministic order (true arm before false arm).
    pub fn successors(&self) -> Vec<BlockId> {
        match &self.kind {
            BlockKind::Generic { successors } => successors.clone(),
            BlockKind::Branching {
                true_successor,
                false_successor,
                ..
            } => vec![*true_successor, *false_successor],
            BlockKind::End => Vec::new(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self.kind, BlockKind::End)
    }

    fn replace_successor(&mut self, from: BlockId, to: BlockId) {
        match &mut self.kind {
            BlockKind::Generic { successors } => {
                for successor in successors {
                    if *successor == from {
                        *successor = to;
                    }
                }
            }
            BlockKind::Branching {
                true_successor,
                false_successor,
                ..
            } => {
                if *true_successor == from {
                    *true_successor = to;
                }
                if *false_successor == from {
                    *false_successor = to;
                }
            }
            BlockKind::End => {}
        }
    }
}

/// Control-flow graph of one function body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    blocks: Vec<CfgBlock>,
    start: BlockId,
    end: BlockId,
}

impl ControlFlowGraph {
    pub(crate) fn new(blocks: Vec<CfgBlock>, start: BlockId, end: BlockId) -> Self {
        Self { blocks, start, end }
    }

    pub fn start(&self) -> BlockId {
        self.start
    }

    pub fn end(&self) -> BlockId {
        self.end
    }

    pub fn block(&self, id: BlockId) -> &CfgBlock {
        &self.blocks[id.index()]
    }

    /// Live blocks (collapsed blocks excluded), in arena order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &CfgBlock)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.removed)
            .map(|(i, b)| (BlockId(i as u32), b))
    }

    pub fn successors(&self, id: BlockId) -> Vec<BlockId> {
        self.blocks[id.index()].successors()
    }

    pub fn predecessors(&self, id: BlockId) -> &[BlockId] {
        &self.blocks[id.index()].predecessors
    }

    /// Normalize the graph: derive predecessors, splice out empty
    /// straight-line blocks, derive predecessors again. Idempotent.
    pub fn finalize(&mut self) {
        self.make_bidirectional();
        self.collapse_empty();
        self.make_bidirectional();
    }

    fn make_bidirectional(&mut self) {
        for block in &mut self.blocks {
            block.predecessors.clear();
        }
        for index in 0..self.blocks.len() {
            if self.blocks[index].removed {
                continue;
            }
            let id = BlockId(index as u32);
            for successor in self.blocks[index].successors() {
                self.blocks[successor.index()].predecessors.push(id);
            }
        }
    }

    /// Splice out generic blocks with no elements and exactly one
    /// successor, redirecting their predecessors. The start block
    /// migrates to its successor when collapsed.
    fn collapse_empty(&mut self) {
        for index in 0..self.blocks.len() {
            let id = BlockId(index as u32);
            let block = &self.blocks[index];
            if block.removed || id == self.end {
                continue;
            }
            let successors = match &block.kind {
                BlockKind::Generic { successors } => successors,
                _ => continue,
            };
            if !block.elements.is_empty() || successors.len() != 1 {
                continue;
            }
            let target = successors[0];
            if target == id {
                continue;
            }
            self.blocks[index].removed = true;
            let predecessors = std::mem::take(&mut self.blocks[index].predecessors);
            for predecessor in &predecessors {
                self.blocks[predecessor.index()].replace_successor(id, target);
            }
            self.blocks[target.index()]
                .predecessors
                .retain(|p| *p != id);
            self.blocks[target.index()]
                .predecessors
                .extend(predecessors);
            if self.start == id {
                self.start = target;
            }
        }
    }

    /// Human-readable topology rendering for tests and debugging.
    pub fn to_text(&self, tree: &SyntaxTree) -> String {
        let mut out = String::new();
        for (id, block) in self.blocks() {
            let mut line = format!("B{}", id.0);
            if id == self.start {
                line.push_str("(start)");
            }
            match &block.kind {
                BlockKind::End => line.push_str("(end)"),
                BlockKind::Generic { successors } => {
                    line.push_str(&render_elements(tree, &block.elements));
                    let targets: Vec<String> =
                        successors.iter().map(|s| format!("B{}", s.0)).collect();
                    line.push_str(&format!(" -> {}", targets.join(",")));
                }
                BlockKind::Branching {
                    label,
                    true_successor,
                    false_successor,
                } => {
                    line.push_str(&format!("<{label}>"));
                    line.push_str(&render_elements(tree, &block.elements));
                    line.push_str(&format!(
                        " T->B{} F->B{}",
                        true_successor.0, false_successor.0
                    ));
                }
            }
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

fn render_elements(tree: &SyntaxTree, elements: &[NodeId]) -> String {
    if elements.is_empty() {
        return " []".to_string();
    }
    let rendered: Vec<&str> = elements.iter().map(|e| tree.text(*e)).collect();
    format!(" [{}]", rendered.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generic_to(successors: Vec<BlockId>, elements: Vec<NodeId>) -> CfgBlock {
        CfgBlock {
            kind: BlockKind::Generic { successors },
            elements,
            predecessors: Vec::new(),
            removed: false,
        }
    }

    #[test]
    fn test_collapse_splices_empty_chain() {
        // B3 -> B2(empty) -> B1(empty) -> B0(end), start = B3
        let blocks = vec![
            CfgBlock::end(),
            generic_to(vec![BlockId(0)], vec![]),
            generic_to(vec![BlockId(1)], vec![]),
            generic_to(vec![BlockId(2)], vec![NodeId(42)]),
        ];
        let mut cfg = ControlFlowGraph::new(blocks, BlockId(3), BlockId(0));
        cfg.finalize();

        assert_eq!(cfg.successors(BlockId(3)), vec![BlockId(0)]);
        assert_eq!(cfg.predecessors(BlockId(0)), &[BlockId(3)]);
        assert_eq!(cfg.blocks().count(), 2);
    }

    #[test]
    fn test_collapse_migrates_start() {
        // start is empty and falls through to the block with content
        let blocks = vec![
            CfgBlock::end(),
            generic_to(vec![BlockId(0)], vec![NodeId(7)]),
            generic_to(vec![BlockId(1)], vec![]),
        ];
        let mut cfg = ControlFlowGraph::new(blocks, BlockId(2), BlockId(0));
        cfg.finalize();

        assert_eq!(cfg.start(), BlockId(1));
        assert!(cfg.block(BlockId(2)).removed);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let blocks = vec![
            CfgBlock::end(),
            generic_to(vec![BlockId(0)], vec![]),
            CfgBlock {
                kind: BlockKind::Branching {
                    label: "c".to_string(),
                    true_successor: BlockId(1),
                    false_successor: BlockId(0),
                },
                elements: vec![NodeId(1)],
                predecessors: Vec::new(),
                removed: false,
            },
        ];
        let mut cfg = ControlFlowGraph::new(blocks, BlockId(2), BlockId(0));
        cfg.finalize();
        let once = cfg.clone();
        cfg.finalize();
        assert_eq!(cfg, once);
    }

    #[test]
    fn test_branching_blocks_are_never_collapsed() {
        // empty branching block over (c) with both arms to end
        let blocks = vec![
            CfgBlock::end(),
            CfgBlock {
                kind: BlockKind::Branching {
                    label: "c".to_string(),
                    true_successor: BlockId(0),
                    false_successor: BlockId(0),
                },
                elements: Vec::new(),
                predecessors: Vec::new(),
                removed: false,
            },
        ];
        let mut cfg = ControlFlowGraph::new(blocks, BlockId(1), BlockId(0));
        cfg.finalize();
        assert!(!cfg.block(BlockId(1)).removed);
        assert_eq!(cfg.predecessors(BlockId(0)), &[BlockId(1), BlockId(1)]);
    }
}
