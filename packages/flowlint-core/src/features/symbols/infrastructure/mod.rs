mod name_resolver;
mod table_builder;

pub use name_resolver::NameResolver;
pub use table_builder::SymbolTableBuilder;
