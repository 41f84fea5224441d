mod analyze_unit;

pub use analyze_unit::{AnalyzeUnitUseCase, UnitAnalysis};
