//! Symbol identity
//!
//! A `SymbolId` is an opaque, stable identity for a named entity
//! (variable, parameter, field, ...). It is minted by an external
//! resolution oracle, never by the analyses in this crate; here it is
//! only ever used as an immutable key.

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}
