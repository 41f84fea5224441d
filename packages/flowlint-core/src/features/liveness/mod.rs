//! Liveness feature - backward live-variable analysis
//!
//! Computes, per control-flow block, the symbols whose current value may
//! still be read, and flags writes that are never observed (dead
//! stores).

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{AnalyzeUnitUseCase, UnitAnalysis};
pub use domain::{is_basic_default_value, LvaReturn};
pub use infrastructure::LiveVariableAnalyzer;
