//! Usage table
//!
//! Append-only record of identifier usages. Each usage ties a syntax
//! node to the symbol it resolves to, with access flags and a dead-store
//! marker filled in later by the liveness analysis.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::shared::models::{NodeId, SymbolId};

/// Access kind bitflags
/// Using u8 for efficient bit operations
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageFlag {
    Declaration = 1,
    Write = 2,
    Read = 4,
}

/// Combined access flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct UsageFlags(pub u8);

impl UsageFlags {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn declaration() -> Self {
        Self(UsageFlag::Declaration as u8)
    }

    pub fn write() -> Self {
        Self(UsageFlag::Write as u8)
    }

    pub fn read() -> Self {
        Self(UsageFlag::Read as u8)
    }

    pub fn read_write() -> Self {
        Self(UsageFlag::Read as u8 | UsageFlag::Write as u8)
    }

    pub fn add(&mut self, flag: UsageFlag) {
        self.0 |= flag as u8;
    }

    pub fn has(&self, flag: UsageFlag) -> bool {
        self.0 & (flag as u8) != 0
    }

    pub fn is_declaration(&self) -> bool {
        self.has(UsageFlag::Declaration)
    }

    pub fn is_write(&self) -> bool {
        self.has(UsageFlag::Write)
    }

    pub fn is_read(&self) -> bool {
        self.has(UsageFlag::Read)
    }
}

impl std::ops::BitOr for UsageFlags {
    type Output = UsageFlags;

    fn bitor(self, rhs: UsageFlags) -> UsageFlags {
        UsageFlags(self.0 | rhs.0)
    }
}

/// Dense index of a usage in its `UsageTable`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UsageId(pub u32);

impl UsageId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// One recorded identifier usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub symbol: SymbolId,
    pub node: NodeId,
    pub flags: UsageFlags,
    /// Set by the liveness analysis: the value written here is never read
    pub dead: bool,
}

/// Append-only usage table for one compilation unit.
///
/// A node carries at most one usage. Registration is first-wins: once a
/// node is recorded, later attempts with different flags are ignored.
/// This lets specific visit sites (assignment targets, declarations)
/// claim a node before the generic read visit reaches it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageTable {
    usages: Vec<Usage>,
    by_node: FxHashMap<NodeId, UsageId>,
    by_symbol: FxHashMap<SymbolId, Vec<UsageId>>,
}

impl UsageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a usage unless the node already carries one. Returns the
    /// id of the usage now associated with the node (new or existing).
    pub fn register(&mut self, symbol: SymbolId, node: NodeId, flags: UsageFlags) -> UsageId {
        if let Some(existing) = self.by_node.get(&node) {
            return *existing;
        }
        let id = UsageId(self.usages.len() as u32);
        self.usages.push(Usage {
            symbol,
            node,
            flags,
            dead: false,
        });
        self.by_node.insert(node, id);
        self.by_symbol.entry(symbol).or_default().push(id);
        id
    }

    /// The usage recorded at `node`, if any.
    pub fn lookup(&self, node: NodeId) -> Option<&Usage> {
        self.by_node.get(&node).map(|id| &self.usages[id.index()])
    }

    pub fn lookup_id(&self, node: NodeId) -> Option<UsageId> {
        self.by_node.get(&node).copied()
    }

    pub fn usage(&self, id: UsageId) -> &Usage {
        &self.usages[id.index()]
    }

    /// All usages of `symbol`, in registration order.
    pub fn usages_of(&self, symbol: SymbolId) -> impl Iterator<Item = &Usage> + '_ {
        self.by_symbol
            .get(&symbol)
            .into_iter()
            .flatten()
            .map(move |id| &self.usages[id.index()])
    }

    /// Symbols with at least one recorded usage.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.by_symbol.keys().copied()
    }

    pub fn all_usages(&self) -> impl Iterator<Item = &Usage> + '_ {
        self.usages.iter()
    }

    pub fn len(&self) -> usize {
        self.usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// Commit dead-store verdicts produced by the liveness analysis.
    pub fn mark_dead(&mut self, dead: impl IntoIterator<Item = UsageId>) {
        for id in dead {
            self.usages[id.index()].dead = true;
        }
    }

    /// Usages flagged as dead stores, in registration order.
    pub fn dead_usages(&self) -> impl Iterator<Item = &Usage> + '_ {
        self.usages.iter().filter(|u| u.dead)
    }
}
