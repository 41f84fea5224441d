//! Usage table construction
//!
//! One exhaustive traversal over the syntax tree. Identifiers default
//! to reads; the specific cases below (assignment targets, variable
//! bindings, declarations, increment/decrement) claim their nodes with
//! stronger flags before the generic visit can reach them — the table's
//! first-wins registration makes the order safe.

use tracing::trace;

use crate::features::symbols::domain::{UsageFlags, UsageTable};
use crate::features::symbols::ports::SymbolResolver;
use crate::shared::models::{collect_left_hand_identifiers, AstKind, NodeId, SyntaxTree};

pub struct SymbolTableBuilder<'a> {
    tree: &'a SyntaxTree,
    resolver: &'a dyn SymbolResolver,
    table: UsageTable,
}

impl<'a> SymbolTableBuilder<'a> {
    pub fn build(tree: &'a SyntaxTree, resolver: &'a dyn SymbolResolver) -> UsageTable {
        let mut builder = Self {
            tree,
            resolver,
            table: UsageTable::new(),
        };
        builder.visit(tree.root());
        builder.table
    }

    fn visit(&mut self, node: NodeId) {
        match self.tree.kind(node) {
            AstKind::Ident => {
                self.register(node, UsageFlags::read());
            }
            AstKind::Binary { op, left, right } if op.is_assignment() => {
                let flags = if op.is_compound_assignment() {
                    UsageFlags::read_write()
                } else {
                    UsageFlags::write()
                };
                let lhs = collect_left_hand_identifiers(self.tree, *left);
                for target in lhs.identifiers {
                    self.register(target, flags);
                }
                for other in lhs.non_identifiers {
                    self.visit(other);
                }
                self.visit(*right);
            }
            AstKind::PrefixUnary { op, operand } | AstKind::PostfixUnary { op, operand }
                if op.is_inc_dec() =>
            {
                self.register(*operand, UsageFlags::read_write());
                self.visit(*operand);
            }
            AstKind::VarDecl { name, initializer } => {
                self.declare(*name, initializer.is_some());
                if let Some(init) = initializer {
                    self.visit(*init);
                }
            }
            AstKind::Param { name, initializer } => {
                self.declare(*name, true);
                if let Some(init) = initializer {
                    self.visit(*init);
                }
            }
            AstKind::FunctionDecl { name, params, body } => {
                self.register(*name, UsageFlags::declaration());
                for param in params.clone() {
                    self.visit(param);
                }
                self.visit(*body);
            }
            AstKind::ClassDecl { name }
            | AstKind::EnumDecl { name }
            | AstKind::InterfaceDecl { name }
            | AstKind::TypeAliasDecl { name }
            | AstKind::ModuleDecl { name } => {
                self.register(*name, UsageFlags::declaration());
            }
            AstKind::ImportDecl { names } => {
                for name in names.clone() {
                    self.register(name, UsageFlags::declaration());
                }
            }
            // the property name is not a value position
            AstKind::PropertyAssignment { value, .. } => {
                self.visit(*value);
            }
            _ => {
                for child in self.tree.kind(node).children() {
                    self.visit(child);
                }
            }
        }
    }

    /// Record variable bindings introduced by `name` (an identifier or
    /// a destructuring pattern). `has_value` is true when a value flows
    /// into the binding at the declaration site.
    fn declare(&mut self, name: NodeId, has_value: bool) {
        match self.tree.kind(name) {
            AstKind::Ident => {
                let flags = if has_value {
                    UsageFlags::declaration() | UsageFlags::write()
                } else {
                    UsageFlags::declaration()
                };
                self.register(name, flags);
            }
            AstKind::ObjectPattern { elements } | AstKind::ArrayPattern { elements } => {
                for element in elements.clone() {
                    match self.tree.kind(element) {
                        AstKind::BindingElement { name, initializer } => {
                            let (name, initializer) = (*name, *initializer);
                            self.declare(name, true);
                            if let Some(init) = initializer {
                                self.visit(init);
                            }
                        }
                        _ => self.declare(element, true),
                    }
                }
            }
            _ => {}
        }
    }

    /// Resolve and record; unresolvable usages are skipped silently.
    fn register(&mut self, node: NodeId, flags: UsageFlags) {
        let node = self.tree.skip_parens(node);
        if !self.tree.is_identifier(node) {
            return;
        }
        match self.resolver.resolve(self.tree, node) {
            Some(symbol) => {
                self.table.register(symbol, node, flags);
            }
            None => trace!(text = self.tree.text(node), "unresolved identifier skipped"),
        }
    }
}
