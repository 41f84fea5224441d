//! Per-unit analysis orchestration
//!
//! Builds the usage table once, then runs the liveness analysis over
//! every function-like node. Functions are independent, so they run in
//! parallel; dead-store verdicts are committed to the table
//! sequentially afterwards.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::features::liveness::domain::LvaReturn;
use crate::features::liveness::infrastructure::LiveVariableAnalyzer;
use crate::features::symbols::domain::UsageTable;
use crate::features::symbols::infrastructure::SymbolTableBuilder;
use crate::features::symbols::ports::SymbolResolver;
use crate::shared::models::{NodeId, SyntaxTree};

/// Everything a rule layer needs about one analyzed unit. Results are
/// keyed by function node; `None` marks functions that were skipped
/// (unsupported control flow or a non-block body).
#[derive(Debug)]
pub struct UnitAnalysis {
    pub table: UsageTable,
    pub functions: FxHashMap<NodeId, Option<LvaReturn>>,
}

impl UnitAnalysis {
    pub fn result_for(&self, function: NodeId) -> Option<&LvaReturn> {
        self.functions.get(&function).and_then(|r| r.as_ref())
    }

    pub fn analyzed_count(&self) -> usize {
        self.functions.values().filter(|r| r.is_some()).count()
    }
}

pub struct AnalyzeUnitUseCase<R: SymbolResolver> {
    resolver: R,
}

impl<R: SymbolResolver> AnalyzeUnitUseCase<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn execute(&self, tree: &SyntaxTree) -> UnitAnalysis {
        let mut table = SymbolTableBuilder::build(tree, &self.resolver);
        let functions: Vec<NodeId> = tree
            .node_ids()
            .filter(|id| tree.kind(*id).is_function_like())
            .collect();
        debug!(functions = functions.len(), usages = table.len(), "analyzing unit");

        let results: Vec<(NodeId, Option<LvaReturn>)> = functions
            .par_iter()
            .map(|function| {
                let analyzer = LiveVariableAnalyzer::new(tree, &table);
                (*function, analyzer.analyze_function(*function))
            })
            .collect();

        let mut by_function = FxHashMap::default();
        for (function, result) in results {
            if let Some(result) = &result {
                table.mark_dead(result.dead.iter().copied());
            }
            by_function.insert(function, result);
        }
        UnitAnalysis {
            table,
            functions: by_function,
        }
    }
}
