mod live_variable_analyzer;

pub use live_variable_analyzer::LiveVariableAnalyzer;
