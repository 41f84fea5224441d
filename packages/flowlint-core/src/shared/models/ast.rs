//! Syntax tree model
//!
//! The analyses in this crate consume a syntax tree through a small
//! surface: node kind discrimination, parent/child navigation and the
//! source text of a node. Rather than dragging a full parser frontend
//! in, the tree is an owned arena of nodes addressed by dense `NodeId`
//! indices, with the kind as a single tagged union that traversals can
//! match exhaustively. `TreeBuilder` is the construction seam an
//! external parser adapter targets; it also composes a source rendering
//! for every node so graph labels and value checks work without the
//! original text.

use serde::{Deserialize, Serialize};

use super::Span;

/// Dense index of a node in its `SyntaxTree` arena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
    Null,
    Regex,
    Template,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // assignments
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    // short-circuit
    And,
    Or,
    // plain binary
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Comma,
}

impl BinaryOp {
    /// Any operator that stores into its left-hand side.
    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::RemAssign
        )
    }

    /// Read-modify-write operators (`+=` and friends, but not `=`).
    pub fn is_compound_assignment(&self) -> bool {
        self.is_assignment() && !matches!(self, BinaryOp::Assign)
    }

    pub fn token(&self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubAssign => "-=",
            BinaryOp::MulAssign => "*=",
            BinaryOp::DivAssign => "/=",
            BinaryOp::RemAssign => "%=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Comma => ",",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Increment,
    Decrement,
    Plus,
    Minus,
    Not,
    TypeOf,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn is_inc_dec(&self) -> bool {
        matches!(self, UnaryOp::Increment | UnaryOp::Decrement)
    }

    pub fn token(&self) -> &'static str {
        match self {
            UnaryOp::Increment => "++",
            UnaryOp::Decrement => "--",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::TypeOf => "typeof ",
            UnaryOp::Void => "void ",
            UnaryOp::Delete => "delete ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForEachKind {
    In,
    Of,
}

/// Node kind, carrying the child structure.
///
/// All child references are `NodeId`s into the owning arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstKind {
    /// Whole compilation unit
    Root { statements: Vec<NodeId> },

    // ── expressions ────────────────────────────────────────────────
    Ident,
    Literal { kind: LiteralKind },
    Call { callee: NodeId, args: Vec<NodeId> },
    New { callee: NodeId, args: Vec<NodeId> },
    Conditional { condition: NodeId, when_true: NodeId, when_false: NodeId },
    Binary { op: BinaryOp, left: NodeId, right: NodeId },
    PrefixUnary { op: UnaryOp, operand: NodeId },
    PostfixUnary { op: UnaryOp, operand: NodeId },
    Paren { expression: NodeId },
    ArrayLit { elements: Vec<NodeId> },
    ObjectLit { properties: Vec<NodeId> },
    /// `name: value` inside an object literal; `name` is not a value usage
    PropertyAssignment { name: NodeId, value: NodeId },
    /// `{ x }` — the name is a value read
    ShorthandProperty { name: NodeId },
    /// `obj.name` — the property name is not a resolvable value position
    PropertyAccess { object: NodeId, name: String },
    ElementAccess { object: NodeId, index: NodeId },
    FunctionExpr { name: Option<String>, params: Vec<NodeId>, body: NodeId },
    ArrowFunction { params: Vec<NodeId>, body: NodeId },
    ClassExpr { name: Option<String> },

    // ── bindings ───────────────────────────────────────────────────
    Param { name: NodeId, initializer: Option<NodeId> },
    ObjectPattern { elements: Vec<NodeId> },
    ArrayPattern { elements: Vec<NodeId> },
    BindingElement { name: NodeId, initializer: Option<NodeId> },
    /// One `name = init` declarator in a variable statement
    VarDecl { name: NodeId, initializer: Option<NodeId> },

    // ── statements ─────────────────────────────────────────────────
    Block { statements: Vec<NodeId> },
    ExprStmt { expression: NodeId },
    VarStmt { declarations: Vec<NodeId> },
    If { condition: NodeId, then_branch: NodeId, else_branch: Option<NodeId> },
    For {
        initializer: Option<NodeId>,
        condition: Option<NodeId>,
        incrementor: Option<NodeId>,
        body: NodeId,
    },
    ForEach { kind: ForEachKind, initializer: NodeId, expression: NodeId, body: NodeId },
    While { condition: NodeId, body: NodeId },
    DoWhile { body: NodeId, condition: NodeId },
    Switch { expression: NodeId, clauses: Vec<NodeId> },
    CaseClause { expression: NodeId, statements: Vec<NodeId> },
    DefaultClause { statements: Vec<NodeId> },
    Return { expression: Option<NodeId> },
    Empty,
    Break,
    Continue,
    Throw { expression: NodeId },
    Try {
        block: NodeId,
        catch_param: Option<NodeId>,
        catch_block: Option<NodeId>,
        finally_block: Option<NodeId>,
    },
    Labeled { label: String, statement: NodeId },

    // ── declarations ───────────────────────────────────────────────
    FunctionDecl { name: NodeId, params: Vec<NodeId>, body: NodeId },
    ClassDecl { name: NodeId },
    EnumDecl { name: NodeId },
    InterfaceDecl { name: NodeId },
    TypeAliasDecl { name: NodeId },
    ModuleDecl { name: NodeId },
    ImportDecl { names: Vec<NodeId> },
}

impl AstKind {
    /// Child node ids in source order.
    pub fn children(&self) -> Vec<NodeId> {
        use AstKind::*;
        match self {
            Root { statements } | Block { statements } | VarStmt { declarations: statements } => {
                statements.clone()
            }
            Ident | Literal { .. } | ClassExpr { .. } | Empty | Break | Continue => Vec::new(),
            Call { callee, args } | New { callee, args } => {
                let mut out = vec![*callee];
                out.extend(args.iter().copied());
                out
            }
            Conditional {
                condition,
                when_true,
                when_false,
            } => vec![*condition, *when_true, *when_false],
            Binary { left, right, .. } => vec![*left, *right],
            PrefixUnary { operand, .. } | PostfixUnary { operand, .. } => vec![*operand],
            Paren { expression }
            | ExprStmt { expression }
            | Throw { expression } => vec![*expression],
            ArrayLit { elements }
            | ObjectPattern { elements }
            | ArrayPattern { elements } => elements.clone(),
            ObjectLit { properties } => properties.clone(),
            PropertyAssignment { name, value } => vec![*name, *value],
            ShorthandProperty { name } => vec![*name],
            PropertyAccess { object, .. } => vec![*object],
            ElementAccess { object, index } => vec![*object, *index],
            FunctionExpr { params, body, .. } | ArrowFunction { params, body } => {
                let mut out = params.clone();
                out.push(*body);
                out
            }
            Param { name, initializer }
            | BindingElement { name, initializer }
            | VarDecl { name, initializer } => {
                let mut out = vec![*name];
                out.extend(initializer.iter().copied());
                out
            }
            If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut out = vec![*condition, *then_branch];
                out.extend(else_branch.iter().copied());
                out
            }
            For {
                initializer,
                condition,
                incrementor,
                body,
            } => {
                let mut out = Vec::new();
                out.extend(initializer.iter().copied());
                out.extend(condition.iter().copied());
                out.extend(incrementor.iter().copied());
                out.push(*body);
                out
            }
            ForEach {
                initializer,
                expression,
                body,
                ..
            } => vec![*initializer, *expression, *body],
            While { condition, body } => vec![*condition, *body],
            DoWhile { body, condition } => vec![*body, *condition],
            Switch {
                expression,
                clauses,
            } => {
                let mut out = vec![*expression];
                out.extend(clauses.iter().copied());
                out
            }
            CaseClause {
                expression,
                statements,
            } => {
                let mut out = vec![*expression];
                out.extend(statements.iter().copied());
                out
            }
            DefaultClause { statements } => statements.clone(),
            Return { expression } => expression.iter().copied().collect(),
            Try {
                block,
                catch_param,
                catch_block,
                finally_block,
            } => {
                let mut out = vec![*block];
                out.extend(catch_param.iter().copied());
                out.extend(catch_block.iter().copied());
                out.extend(finally_block.iter().copied());
                out
            }
            Labeled { statement, .. } => vec![*statement],
            FunctionDecl { name, params, body } => {
                let mut out = vec![*name];
                out.extend(params.iter().copied());
                out.push(*body);
                out
            }
            ClassDecl { name }
            | EnumDecl { name }
            | InterfaceDecl { name }
            | TypeAliasDecl { name }
            | ModuleDecl { name } => vec![*name],
            ImportDecl { names } => names.clone(),
        }
    }

    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            AstKind::FunctionDecl { .. } | AstKind::FunctionExpr { .. } | AstKind::ArrowFunction { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: AstKind,
    pub parent: Option<NodeId>,
    pub text: String,
    pub span: Span,
}

/// Arena-backed syntax tree for one compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &AstKind {
        &self.nodes[id.index()].kind
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].text
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids, in arena order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Ancestors of `id`, nearest first (excluding `id` itself).
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.parent(id);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.parent(next);
            Some(next)
        })
    }

    /// Nearest function-like ancestor, or the root when the node sits
    /// at the top level of the unit.
    pub fn enclosing_function(&self, id: NodeId) -> NodeId {
        self.ancestors(id)
            .find(|a| self.kind(*a).is_function_like())
            .unwrap_or(self.root)
    }

    /// Drill down through parenthesized expressions.
    pub fn skip_parens(&self, mut id: NodeId) -> NodeId {
        while let AstKind::Paren { expression } = self.kind(id) {
            id = *expression;
        }
        id
    }

    pub fn is_identifier(&self, id: NodeId) -> bool {
        matches!(self.kind(id), AstKind::Ident)
    }
}

/// Identifiers and non-identifier sub-expressions bound by an
/// assignment target, in source order.
#[derive(Debug, Default)]
pub struct LeftHandSides {
    pub identifiers: Vec<NodeId>,
    pub non_identifiers: Vec<NodeId>,
}

/// Split an assignment target into the identifiers it binds and the
/// remaining sub-expressions. Destructuring targets (`[a, b] = ...`,
/// `({x} = ...)`) are array/object literals on the left side, so the
/// walk recurses through literal positions; anything else (member
/// accesses, calls) is a non-identifier and is reported as-is.
pub fn collect_left_hand_identifiers(tree: &SyntaxTree, node: NodeId) -> LeftHandSides {
    let mut out = LeftHandSides::default();
    collect(tree, node, &mut out);
    return out;

    fn collect(tree: &SyntaxTree, node: NodeId, out: &mut LeftHandSides) {
        let node = tree.skip_parens(node);
        match tree.kind(node) {
            AstKind::Ident => out.identifiers.push(node),
            AstKind::ObjectLit { properties } => {
                for property in properties {
                    collect(tree, *property, out);
                }
            }
            AstKind::ArrayLit { elements } => {
                for element in elements {
                    collect(tree, *element, out);
                }
            }
            AstKind::PropertyAssignment { value, .. } => collect(tree, *value, out),
            AstKind::ShorthandProperty { name } => collect(tree, *name, out),
            _ => out.non_identifiers.push(node),
        }
    }
}

/// Construction API for `SyntaxTree`.
///
/// Children are built bottom-up; `finish` wires parent links by walking
/// the structure from the root. The builder composes a `text` rendering
/// per node, which stands in for the original source snippet.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: AstKind, text: String) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let line = self.nodes.len() as u32 + 1;
        self.nodes.push(SyntaxNode {
            kind,
            parent: None,
            text,
            span: Span::new(line, 0, line, 0),
        });
        id
    }

    fn text_of(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].text
    }

    fn join(&self, ids: &[NodeId], sep: &str) -> String {
        ids.iter()
            .map(|id| self.text_of(*id).to_string())
            .collect::<Vec<_>>()
            .join(sep)
    }

    // ── expressions ────────────────────────────────────────────────

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.push(AstKind::Ident, name.to_string())
    }

    pub fn number(&mut self, text: &str) -> NodeId {
        self.push(AstKind::Literal { kind: LiteralKind::Number }, text.to_string())
    }

    pub fn string(&mut self, value: &str) -> NodeId {
        self.push(
            AstKind::Literal { kind: LiteralKind::String },
            format!("\"{value}\""),
        )
    }

    pub fn boolean(&mut self, value: bool) -> NodeId {
        let text = if value { "true" } else { "false" };
        self.push(AstKind::Literal { kind: LiteralKind::Boolean }, text.to_string())
    }

    pub fn null(&mut self) -> NodeId {
        self.push(AstKind::Literal { kind: LiteralKind::Null }, "null".to_string())
    }

    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        let text = format!("{}({})", self.text_of(callee), self.join(&args, ", "));
        self.push(AstKind::Call { callee, args }, text)
    }

    pub fn new_expr(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        let text = format!("new {}({})", self.text_of(callee), self.join(&args, ", "));
        self.push(AstKind::New { callee, args }, text)
    }

    pub fn conditional(&mut self, condition: NodeId, when_true: NodeId, when_false: NodeId) -> NodeId {
        let text = format!(
            "{} ? {} : {}",
            self.text_of(condition),
            self.text_of(when_true),
            self.text_of(when_false)
        );
        self.push(
            AstKind::Conditional { condition, when_true, when_false },
            text,
        )
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        let text = format!("{} {} {}", self.text_of(left), op.token(), self.text_of(right));
        self.push(AstKind::Binary { op, left, right }, text)
    }

    pub fn assign(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.binary(BinaryOp::Assign, left, right)
    }

    pub fn prefix(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        let text = format!("{}{}", op.token(), self.text_of(operand));
        self.push(AstKind::PrefixUnary { op, operand }, text)
    }

    pub fn postfix(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        let text = format!("{}{}", self.text_of(operand), op.token());
        self.push(AstKind::PostfixUnary { op, operand }, text)
    }

    pub fn paren(&mut self, expression: NodeId) -> NodeId {
        let text = format!("({})", self.text_of(expression));
        self.push(AstKind::Paren { expression }, text)
    }

    pub fn array(&mut self, elements: Vec<NodeId>) -> NodeId {
        let text = format!("[{}]", self.join(&elements, ", "));
        self.push(AstKind::ArrayLit { elements }, text)
    }

    pub fn object(&mut self, properties: Vec<NodeId>) -> NodeId {
        let text = format!("{{{}}}", self.join(&properties, ", "));
        self.push(AstKind::ObjectLit { properties }, text)
    }

    pub fn property(&mut self, name: NodeId, value: NodeId) -> NodeId {
        let text = format!("{}: {}", self.text_of(name), self.text_of(value));
        self.push(AstKind::PropertyAssignment { name, value }, text)
    }

    pub fn shorthand(&mut self, name: NodeId) -> NodeId {
        let text = self.text_of(name).to_string();
        self.push(AstKind::ShorthandProperty { name }, text)
    }

    pub fn prop_access(&mut self, object: NodeId, name: &str) -> NodeId {
        let text = format!("{}.{}", self.text_of(object), name);
        self.push(
            AstKind::PropertyAccess { object, name: name.to_string() },
            text,
        )
    }

    pub fn elem_access(&mut self, object: NodeId, index: NodeId) -> NodeId {
        let text = format!("{}[{}]", self.text_of(object), self.text_of(index));
        self.push(AstKind::ElementAccess { object, index }, text)
    }

    pub fn function_expr(&mut self, name: Option<&str>, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let text = format!(
            "function {}({}) {{...}}",
            name.unwrap_or(""),
            self.join(&params, ", ")
        );
        self.push(
            AstKind::FunctionExpr { name: name.map(str::to_string), params, body },
            text,
        )
    }

    pub fn arrow(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let text = format!("({}) => {{...}}", self.join(&params, ", "));
        self.push(AstKind::ArrowFunction { params, body }, text)
    }

    // ── bindings ───────────────────────────────────────────────────

    pub fn param(&mut self, name: NodeId) -> NodeId {
        let text = self.text_of(name).to_string();
        self.push(AstKind::Param { name, initializer: None }, text)
    }

    pub fn param_with_default(&mut self, name: NodeId, initializer: NodeId) -> NodeId {
        let text = format!("{} = {}", self.text_of(name), self.text_of(initializer));
        self.push(AstKind::Param { name, initializer: Some(initializer) }, text)
    }

    pub fn object_pattern(&mut self, elements: Vec<NodeId>) -> NodeId {
        let text = format!("{{{}}}", self.join(&elements, ", "));
        self.push(AstKind::ObjectPattern { elements }, text)
    }

    pub fn array_pattern(&mut self, elements: Vec<NodeId>) -> NodeId {
        let text = format!("[{}]", self.join(&elements, ", "));
        self.push(AstKind::ArrayPattern { elements }, text)
    }

    pub fn binding_element(&mut self, name: NodeId, initializer: Option<NodeId>) -> NodeId {
        let text = match initializer {
            Some(init) => format!("{} = {}", self.text_of(name), self.text_of(init)),
            None => self.text_of(name).to_string(),
        };
        self.push(AstKind::BindingElement { name, initializer }, text)
    }

    pub fn var_decl(&mut self, name: NodeId, initializer: Option<NodeId>) -> NodeId {
        let text = match initializer {
            Some(init) => format!("{} = {}", self.text_of(name), self.text_of(init)),
            None => self.text_of(name).to_string(),
        };
        self.push(AstKind::VarDecl { name, initializer }, text)
    }

    // ── statements ─────────────────────────────────────────────────

    pub fn expr_stmt(&mut self, expression: NodeId) -> NodeId {
        let text = format!("{};", self.text_of(expression));
        self.push(AstKind::ExprStmt { expression }, text)
    }

    pub fn var_stmt(&mut self, declarations: Vec<NodeId>) -> NodeId {
        let text = format!("let {};", self.join(&declarations, ", "));
        self.push(AstKind::VarStmt { declarations }, text)
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        let text = "{...}".to_string();
        self.push(AstKind::Block { statements }, text)
    }

    pub fn if_stmt(&mut self, condition: NodeId, then_branch: NodeId, else_branch: Option<NodeId>) -> NodeId {
        let text = format!("if ({})", self.text_of(condition));
        self.push(
            AstKind::If { condition, then_branch, else_branch },
            text,
        )
    }

    pub fn for_stmt(
        &mut self,
        initializer: Option<NodeId>,
        condition: Option<NodeId>,
        incrementor: Option<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let part = |b: &Self, id: Option<NodeId>| {
            id.map(|id| b.text_of(id).to_string()).unwrap_or_default()
        };
        let text = format!(
            "for({};{};{})",
            part(self, initializer),
            part(self, condition),
            part(self, incrementor)
        );
        self.push(
            AstKind::For { initializer, condition, incrementor, body },
            text,
        )
    }

    pub fn for_each(&mut self, kind: ForEachKind, initializer: NodeId, expression: NodeId, body: NodeId) -> NodeId {
        let keyword = match kind {
            ForEachKind::In => "in",
            ForEachKind::Of => "of",
        };
        let text = format!(
            "for({} {} {})",
            self.text_of(initializer),
            keyword,
            self.text_of(expression)
        );
        self.push(
            AstKind::ForEach { kind, initializer, expression, body },
            text,
        )
    }

    pub fn while_stmt(&mut self, condition: NodeId, body: NodeId) -> NodeId {
        let text = format!("while({})", self.text_of(condition));
        self.push(AstKind::While { condition, body }, text)
    }

    pub fn do_while(&mut self, body: NodeId, condition: NodeId) -> NodeId {
        let text = format!("while({})", self.text_of(condition));
        self.push(AstKind::DoWhile { body, condition }, text)
    }

    pub fn switch(&mut self, expression: NodeId, clauses: Vec<NodeId>) -> NodeId {
        let text = format!("switch({})", self.text_of(expression));
        self.push(AstKind::Switch { expression, clauses }, text)
    }

    pub fn case(&mut self, expression: NodeId, statements: Vec<NodeId>) -> NodeId {
        let text = format!("case {}:", self.text_of(expression));
        self.push(AstKind::CaseClause { expression, statements }, text)
    }

    pub fn default_clause(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.push(AstKind::DefaultClause { statements }, "default:".to_string())
    }

    pub fn ret(&mut self, expression: Option<NodeId>) -> NodeId {
        let text = match expression {
            Some(expr) => format!("return {};", self.text_of(expr)),
            None => "return;".to_string(),
        };
        self.push(AstKind::Return { expression }, text)
    }

    pub fn empty(&mut self) -> NodeId {
        self.push(AstKind::Empty, ";".to_string())
    }

    pub fn brk(&mut self) -> NodeId {
        self.push(AstKind::Break, "break;".to_string())
    }

    pub fn cont(&mut self) -> NodeId {
        self.push(AstKind::Continue, "continue;".to_string())
    }

    pub fn throw_stmt(&mut self, expression: NodeId) -> NodeId {
        let text = format!("throw {};", self.text_of(expression));
        self.push(AstKind::Throw { expression }, text)
    }

    pub fn try_stmt(
        &mut self,
        block: NodeId,
        catch_param: Option<NodeId>,
        catch_block: Option<NodeId>,
        finally_block: Option<NodeId>,
    ) -> NodeId {
        self.push(
            AstKind::Try { block, catch_param, catch_block, finally_block },
            "try".to_string(),
        )
    }

    pub fn labeled(&mut self, label: &str, statement: NodeId) -> NodeId {
        let text = format!("{label}:");
        self.push(
            AstKind::Labeled { label: label.to_string(), statement },
            text,
        )
    }

    // ── declarations ───────────────────────────────────────────────

    pub fn function_decl(&mut self, name: NodeId, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let text = format!(
            "function {}({}) {{...}}",
            self.text_of(name),
            self.join(&params, ", ")
        );
        self.push(AstKind::FunctionDecl { name, params, body }, text)
    }

    pub fn class_decl(&mut self, name: NodeId) -> NodeId {
        let text = format!("class {}", self.text_of(name));
        self.push(AstKind::ClassDecl { name }, text)
    }

    pub fn enum_decl(&mut self, name: NodeId) -> NodeId {
        let text = format!("enum {}", self.text_of(name));
        self.push(AstKind::EnumDecl { name }, text)
    }

    pub fn interface_decl(&mut self, name: NodeId) -> NodeId {
        let text = format!("interface {}", self.text_of(name));
        self.push(AstKind::InterfaceDecl { name }, text)
    }

    pub fn type_alias_decl(&mut self, name: NodeId) -> NodeId {
        let text = format!("type {}", self.text_of(name));
        self.push(AstKind::TypeAliasDecl { name }, text)
    }

    pub fn module_decl(&mut self, name: NodeId) -> NodeId {
        let text = format!("module {}", self.text_of(name));
        self.push(AstKind::ModuleDecl { name }, text)
    }

    pub fn import_decl(&mut self, names: Vec<NodeId>) -> NodeId {
        let text = format!("import {{{}}}", self.join(&names, ", "));
        self.push(AstKind::ImportDecl { names }, text)
    }

    /// Close the unit: create the root node, wire parent links, return
    /// the finished tree.
    pub fn finish(mut self, statements: Vec<NodeId>) -> SyntaxTree {
        let root = self.push(AstKind::Root { statements }, String::new());
        let mut tree = SyntaxTree { nodes: self.nodes, root };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in tree.kind(id).children() {
                tree.nodes[child.index()].parent = Some(id);
                stack.push(child);
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_links() {
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let one = b.number("1");
        let assign = b.assign(x, one);
        let stmt = b.expr_stmt(assign);
        let tree = b.finish(vec![stmt]);

        assert_eq!(tree.parent(x), Some(assign));
        assert_eq!(tree.parent(assign), Some(stmt));
        assert_eq!(tree.parent(stmt), Some(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(tree.text(assign), "x = 1");
    }

    #[test]
    fn test_enclosing_function() {
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let read = b.expr_stmt(x);
        let body = b.block(vec![read]);
        let arrow = b.arrow(vec![], body);
        let stmt = b.expr_stmt(arrow);
        let tree = b.finish(vec![stmt]);

        assert_eq!(tree.enclosing_function(x), arrow);
        assert_eq!(tree.enclosing_function(arrow), tree.root());
    }

    #[test]
    fn test_collect_left_hand_identifiers_destructuring() {
        // [a, b.c] = ...
        let mut b = TreeBuilder::new();
        let a = b.ident("a");
        let obj = b.ident("b");
        let member = b.prop_access(obj, "c");
        let target = b.array(vec![a, member]);
        let tree = b.finish(vec![target]);

        let lhs = collect_left_hand_identifiers(&tree, target);
        assert_eq!(lhs.identifiers, vec![a]);
        assert_eq!(lhs.non_identifiers, vec![member]);
    }

    #[test]
    fn test_skip_parens() {
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let p1 = b.paren(x);
        let p2 = b.paren(p1);
        let tree = b.finish(vec![p2]);
        assert_eq!(tree.skip_parens(p2), x);
    }
}
