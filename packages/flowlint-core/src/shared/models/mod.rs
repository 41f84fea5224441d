//! Shared models

pub mod ast;
mod span;
mod symbol;

pub use ast::{
    collect_left_hand_identifiers, AstKind, BinaryOp, ForEachKind, LeftHandSides, LiteralKind,
    NodeId, SyntaxNode, SyntaxTree, TreeBuilder, UnaryOp,
};
pub use span::Span;
pub use symbol::SymbolId;
