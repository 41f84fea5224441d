//! Symbols feature - usage table construction
//!
//! Records every resolvable identifier usage in a compilation unit with
//! its access flags (declaration / write / read). The table is the
//! shared input of the liveness analysis.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{Usage, UsageFlag, UsageFlags, UsageId, UsageTable};
pub use infrastructure::{NameResolver, SymbolTableBuilder};
pub use ports::SymbolResolver;
