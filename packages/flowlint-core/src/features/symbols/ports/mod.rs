mod resolver;

pub use resolver::SymbolResolver;
