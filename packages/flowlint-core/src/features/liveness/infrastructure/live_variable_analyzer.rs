//! Backward live-variable worklist fixpoint
//!
//! A symbol is live at a point when its current value may be read on
//! some path from that point. Blocks are processed backward: a block's
//! exit set is the union of its successors' entry sets, then elements
//! are scanned in reverse execution order applying kill (write) and gen
//! (read) effects. Blocks whose entry set changed requeue their
//! predecessors until the sets stabilize.
//!
//! Symbols captured by nested functions are excluded entirely: a
//! closure may read or write them at any time, so no flow claim is
//! safe.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::features::flow_graph::domain::{BlockId, ControlFlowGraph};
use crate::features::flow_graph::infrastructure::CfgBuilder;
use crate::features::liveness::domain::LvaReturn;
use crate::features::symbols::domain::{UsageId, UsageTable};
use crate::shared::models::{
    collect_left_hand_identifiers, AstKind, BinaryOp, NodeId, SymbolId, SyntaxTree,
};

pub struct LiveVariableAnalyzer<'a> {
    tree: &'a SyntaxTree,
    table: &'a UsageTable,
}

struct Pass<'a> {
    tree: &'a SyntaxTree,
    table: &'a UsageTable,
    root: NodeId,
    block_live_in: FxHashMap<BlockId, FxHashSet<SymbolId>>,
    dead: FxHashSet<UsageId>,
    captured: FxHashMap<SymbolId, bool>,
}

impl<'a> LiveVariableAnalyzer<'a> {
    pub fn new(tree: &'a SyntaxTree, table: &'a UsageTable) -> Self {
        Self { tree, table }
    }

    /// Analyze a function-like node. `None` when the body is not a
    /// statement block or its flow graph cannot be built — a skipped
    /// function, not an error.
    pub fn analyze_function(&self, function: NodeId) -> Option<LvaReturn> {
        let body = match self.tree.kind(function) {
            AstKind::FunctionDecl { body, .. }
            | AstKind::FunctionExpr { body, .. }
            | AstKind::ArrowFunction { body, .. } => *body,
            _ => return None,
        };
        let statements = match self.tree.kind(body) {
            AstKind::Block { statements } => statements.clone(),
            _ => return None,
        };
        self.analyze(function, &statements)
    }

    /// Analyze an arbitrary statement list. `root` determines which
    /// usages count as nested-function captures: any usage enclosed by
    /// a different function than `root`'s.
    pub fn analyze(&self, root: NodeId, statements: &[NodeId]) -> Option<LvaReturn> {
        let cfg = match CfgBuilder::build(self.tree, statements) {
            Ok(cfg) => cfg,
            Err(error) => {
                debug!(%error, "flow graph unavailable, skipping liveness analysis");
                return None;
            }
        };
        let root = if self.tree.kind(root).is_function_like() {
            root
        } else {
            self.tree.enclosing_function(root)
        };
        let mut pass = Pass {
            tree: self.tree,
            table: self.table,
            root,
            block_live_in: FxHashMap::default(),
            dead: FxHashSet::default(),
            captured: FxHashMap::default(),
        };
        pass.run(&cfg);
        Some(LvaReturn {
            cfg,
            block_live_in: pass.block_live_in,
            dead: pass.dead,
        })
    }
}

impl Pass<'_> {
    fn run(&mut self, cfg: &ControlFlowGraph) {
        let mut worklist: VecDeque<BlockId> = cfg
            .blocks()
            .filter(|(_, block)| !block.is_end())
            .map(|(id, _)| id)
            .collect();
        worklist.push_back(cfg.end());

        let mut iterations = 0usize;
        while let Some(block) = worklist.pop_back() {
            iterations += 1;
            let entry = self.compute_entry_set(cfg, block);
            let changed = self
                .block_live_in
                .get(&block)
                .map_or(true, |old| *old != entry);
            if changed {
                for predecessor in cfg.predecessors(block) {
                    worklist.push_front(*predecessor);
                }
            }
            self.block_live_in.insert(block, entry);
            trace!(block = block.0, iterations, "liveness iteration");
        }
        debug!(iterations, dead = self.dead.len(), "liveness fixpoint reached");
    }

    /// Exit set from successors, then reverse element scan.
    fn compute_entry_set(&mut self, cfg: &ControlFlowGraph, block: BlockId) -> FxHashSet<SymbolId> {
        let mut live = FxHashSet::default();
        for successor in cfg.successors(block) {
            if let Some(entry) = self.block_live_in.get(&successor) {
                live.extend(entry.iter().copied());
            }
        }
        for element in cfg.block(block).elements.iter().rev() {
            match self.tree.kind(*element) {
                AstKind::Binary {
                    op: BinaryOp::Assign,
                    left,
                    ..
                } => {
                    // the assignment element stands in for its targets
                    for target in collect_left_hand_identifiers(self.tree, *left).identifiers {
                        self.track(self.table.lookup_id(target), &mut live);
                    }
                }
                _ => self.track(self.table.lookup_id(*element), &mut live),
            }
        }
        live
    }

    fn track(&mut self, usage: Option<UsageId>, live: &mut FxHashSet<SymbolId>) {
        let Some(id) = usage else { return };
        let usage = self.table.usage(id);
        if self.is_captured(usage.symbol) {
            return;
        }
        if usage.flags.is_write() {
            if live.remove(&usage.symbol) {
                self.dead.remove(&id);
            } else {
                self.dead.insert(id);
            }
        }
        if usage.flags.is_read() {
            live.insert(usage.symbol);
        }
    }

    fn is_captured(&mut self, symbol: SymbolId) -> bool {
        if let Some(captured) = self.captured.get(&symbol) {
            return *captured;
        }
        let captured = self
            .table
            .usages_of(symbol)
            .any(|usage| self.tree.enclosing_function(usage.node) != self.root);
        self.captured.insert(symbol, captured);
        captured
    }
}
