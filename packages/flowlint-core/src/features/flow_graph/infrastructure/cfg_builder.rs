//! Backward control-flow graph construction
//!
//! Statements are processed in reverse source order, so every block's
//! successors exist before the block itself. `current` always names the
//! block that follows the construct being built; each statement handler
//! returns the block where control enters that statement.
//!
//! Element lists are appended in reverse execution order during the
//! walk and flipped once at the end of `build`.

use tracing::debug;

use crate::errors::{FlowlintError, Result};
use crate::features::flow_graph::domain::{BlockId, BlockKind, CfgBlock, ControlFlowGraph};
use crate::shared::models::{
    collect_left_hand_identifiers, AstKind, BinaryOp, LiteralKind, NodeId, SyntaxTree,
};

const END: BlockId = BlockId(0);

pub struct CfgBuilder<'a> {
    tree: &'a SyntaxTree,
    blocks: Vec<CfgBlock>,
}

impl<'a> CfgBuilder<'a> {
    /// Build the graph of a statement list (a function body). Fails
    /// with `UnsupportedConstruct` when the list contains control flow
    /// outside the supported set; never produces a wrong graph.
    pub fn build(tree: &'a SyntaxTree, statements: &[NodeId]) -> Result<ControlFlowGraph> {
        debug!(statements = statements.len(), "building control flow graph");
        let mut builder = Self {
            tree,
            blocks: vec![CfgBlock::end()],
        };
        let current = builder.create_predecessor_block(END);
        let start = builder.build_statements(current, statements)?;
        for block in &mut builder.blocks {
            block.elements.reverse();
        }
        let mut cfg = ControlFlowGraph::new(builder.blocks, start, END);
        cfg.finalize();
        Ok(cfg)
    }

    fn build_statements(&mut self, mut current: BlockId, statements: &[NodeId]) -> Result<BlockId> {
        for statement in statements.iter().rev() {
            current = self.build_statement(current, *statement)?;
        }
        Ok(current)
    }

    fn build_statement(&mut self, current: BlockId, statement: NodeId) -> Result<BlockId> {
        match self.tree.kind(statement) {
            AstKind::Block { statements } => self.build_statements(current, &statements.clone()),
            AstKind::ExprStmt { expression } => self.build_expression(current, *expression),
            AstKind::VarStmt { declarations } => {
                self.build_declaration_list(current, &declarations.clone())
            }
            AstKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let (condition, then_branch, else_branch) = (*condition, *then_branch, *else_branch);
                let mut when_false = current;
                if let Some(else_branch) = else_branch {
                    let predecessor = self.create_predecessor_block(current);
                    when_false = self.build_statement(predecessor, else_branch)?;
                }
                let predecessor = self.create_predecessor_block(current);
                let when_true = self.build_statement(predecessor, then_branch)?;
                let label = format!("if ({})", self.tree.text(condition));
                let branching = self.create_branching_block(label, when_true, when_false);
                self.build_expression(branching, condition)
            }
            AstKind::For {
                initializer,
                condition,
                incrementor,
                body,
            } => {
                let (initializer, condition, incrementor, body) =
                    (*initializer, *condition, *incrementor, *body);
                let loop_bottom = self.create_block();
                let mut last_in_body = loop_bottom;
                if let Some(incrementor) = incrementor {
                    last_in_body = self.build_expression(last_in_body, incrementor)?;
                }
                let first_in_body = self.build_statement(last_in_body, body)?;
                let loop_root = match condition {
                    Some(condition) => {
                        let label = self.tree.text(statement).to_string();
                        let branching =
                            self.create_branching_block(label, first_in_body, current);
                        self.build_expression(branching, condition)?
                    }
                    None => self.create_predecessor_block(first_in_body),
                };
                let loop_start = match initializer {
                    Some(initializer) => {
                        let predecessor = self.create_predecessor_block(loop_root);
                        self.build_for_initializer(predecessor, initializer)?
                    }
                    None => loop_root,
                };
                self.add_successor(loop_bottom, loop_root);
                // fresh block so statements before the loop stay outside
                // the back edge (loop_start is the back-edge target when
                // there is no initializer)
                Ok(self.create_predecessor_block(loop_start))
            }
            AstKind::ForEach { .. } => self.build_for_each_loop(current, statement),
            AstKind::While { condition, body } => {
                let (condition, body) = (*condition, *body);
                let loop_bottom = self.create_block();
                let first_in_body = self.build_statement(loop_bottom, body)?;
                // `while (true)` has no feasible false exit
                let loop_root = if self.is_true_literal(condition) {
                    self.create_predecessor_block(first_in_body)
                } else {
                    let label = self.tree.text(statement).to_string();
                    self.create_branching_block(label, first_in_body, current)
                };
                let loop_start = self.build_expression(loop_root, condition)?;
                self.add_successor(loop_bottom, loop_start);
                // fresh block so statements before the loop stay outside
                // the back edge
                Ok(self.create_predecessor_block(loop_start))
            }
            AstKind::DoWhile { body, condition } => {
                let (body, condition) = (*body, *condition);
                let do_block_end = self.create_block();
                let do_block_start = self.build_statement(do_block_end, body)?;
                let label = self.tree.text(statement).to_string();
                let branching = self.create_branching_block(label, do_block_start, current);
                let while_start = self.build_expression(branching, condition)?;
                self.add_successor(do_block_end, while_start);
                // fresh block: the loop repeats through do_block_start
                Ok(self.create_predecessor_block(do_block_start))
            }
            AstKind::Switch { .. } => self.build_switch(current, statement),
            AstKind::Return { expression } => {
                let expression = *expression;
                let predecessor = self.create_predecessor_block(END);
                match expression {
                    Some(expression) => self.build_expression(predecessor, expression),
                    None => Ok(predecessor),
                }
            }
            AstKind::Empty => Ok(current),
            AstKind::Break => Err(FlowlintError::unsupported("break statement")),
            AstKind::Continue => Err(FlowlintError::unsupported("continue statement")),
            AstKind::Throw { .. } => Err(FlowlintError::unsupported("throw statement")),
            AstKind::Try { .. } => Err(FlowlintError::unsupported("try statement")),
            AstKind::Labeled { .. } => Err(FlowlintError::unsupported("labeled statement")),
            AstKind::FunctionDecl { .. } => {
                Err(FlowlintError::unsupported("nested function declaration"))
            }
            AstKind::ClassDecl { .. } => Err(FlowlintError::unsupported("class declaration")),
            AstKind::EnumDecl { .. } => Err(FlowlintError::unsupported("enum declaration")),
            AstKind::InterfaceDecl { .. }
            | AstKind::TypeAliasDecl { .. }
            | AstKind::ModuleDecl { .. }
            | AstKind::ImportDecl { .. } => {
                // type-level declarations carry no runtime control flow
                self.add_element(current, statement);
                Ok(current)
            }
            other => Err(FlowlintError::internal(format!(
                "unexpected statement kind: {other:?}"
            ))),
        }
    }

    /// Default clause bodies are built up front (they are entered when
    /// every case test fails); case clauses are then chained in reverse
    /// so each failed test falls to the next one, and clause bodies
    /// fall through structurally to the following clause's body.
    fn build_switch(&mut self, current: BlockId, switch: NodeId) -> Result<BlockId> {
        let (expression, clauses) = match self.tree.kind(switch) {
            AstKind::Switch {
                expression,
                clauses,
            } => (*expression, clauses.clone()),
            _ => return Err(FlowlintError::internal("expected switch statement")),
        };
        let after_switch = current;
        let mut default_block_end = None;
        let mut default_block = None;
        for clause in &clauses {
            if let AstKind::DefaultClause { statements } = self.tree.kind(*clause) {
                let statements = statements.clone();
                let end = self.create_block();
                default_block_end = Some(end);
                default_block = Some(self.build_statements(end, &statements)?);
            }
        }
        let mut clause_statements_start = after_switch;
        let mut next_block = default_block.unwrap_or(after_switch);
        for clause in clauses.iter().rev() {
            match self.tree.kind(*clause) {
                AstKind::CaseClause {
                    expression,
                    statements,
                } => {
                    let (case_expression, statements) = (*expression, statements.clone());
                    let predecessor = self.create_predecessor_block(clause_statements_start);
                    clause_statements_start = self.build_statements(predecessor, &statements)?;
                    let label = self.tree.text(case_expression).to_string();
                    let test =
                        self.create_branching_block(label, clause_statements_start, next_block);
                    next_block = self.build_expression(test, case_expression)?;
                }
                AstKind::DefaultClause { .. } => {
                    let end = default_block_end
                        .ok_or_else(|| FlowlintError::internal("default clause without block"))?;
                    self.add_successor(end, clause_statements_start);
                    clause_statements_start = default_block
                        .ok_or_else(|| FlowlintError::internal("default clause without block"))?;
                }
                other => {
                    return Err(FlowlintError::internal(format!(
                        "unexpected switch clause: {other:?}"
                    )))
                }
            }
        }
        self.build_expression(next_block, expression)
    }

    fn build_for_each_loop(&mut self, current: BlockId, for_each: NodeId) -> Result<BlockId> {
        let (initializer, expression, body) = match self.tree.kind(for_each) {
            AstKind::ForEach {
                initializer,
                expression,
                body,
                ..
            } => (*initializer, *expression, *body),
            _ => return Err(FlowlintError::internal("expected for-each statement")),
        };
        let loop_body_end = self.create_block();
        let loop_body_start = self.build_statement(loop_body_end, body)?;
        let label = self.tree.text(for_each).to_string();
        let branching = self.create_branching_block(label, loop_body_start, current);
        let initializer_start = self.build_for_initializer(branching, initializer)?;
        let predecessor = self.create_predecessor_block(initializer_start);
        let loop_start = self.build_expression(predecessor, expression)?;
        self.add_successor(loop_body_end, initializer_start);
        Ok(loop_start)
    }

    fn build_for_initializer(&mut self, current: BlockId, initializer: NodeId) -> Result<BlockId> {
        match self.tree.kind(initializer) {
            AstKind::VarStmt { declarations } => {
                self.build_declaration_list(current, &declarations.clone())
            }
            AstKind::VarDecl { .. } => self.build_declaration(current, initializer),
            _ => self.build_expression(current, initializer),
        }
    }

    fn build_declaration_list(
        &mut self,
        mut current: BlockId,
        declarations: &[NodeId],
    ) -> Result<BlockId> {
        for declaration in declarations.iter().rev() {
            current = self.build_declaration(current, *declaration)?;
        }
        Ok(current)
    }

    // binding name first: the name executes after its initializer
    fn build_declaration(&mut self, mut current: BlockId, declaration: NodeId) -> Result<BlockId> {
        match self.tree.kind(declaration) {
            AstKind::VarDecl { name, initializer } => {
                let (name, initializer) = (*name, *initializer);
                current = self.build_binding_name(current, name)?;
                if let Some(initializer) = initializer {
                    current = self.build_expression(current, initializer)?;
                }
                Ok(current)
            }
            _ => Err(FlowlintError::internal("expected variable declaration")),
        }
    }

    fn build_binding_name(&mut self, mut current: BlockId, name: NodeId) -> Result<BlockId> {
        match self.tree.kind(name) {
            AstKind::Ident => self.build_expression(current, name),
            AstKind::ObjectPattern { elements } | AstKind::ArrayPattern { elements } => {
                let elements = elements.clone();
                for element in elements.iter().rev() {
                    current = self.build_binding_element(current, *element)?;
                }
                Ok(current)
            }
            _ => Ok(current),
        }
    }

    fn build_binding_element(&mut self, mut current: BlockId, element: NodeId) -> Result<BlockId> {
        match self.tree.kind(element) {
            AstKind::BindingElement { name, initializer } => {
                let (name, initializer) = (*name, *initializer);
                current = self.build_binding_name(current, name)?;
                if let Some(initializer) = initializer {
                    current = self.build_expression(current, initializer)?;
                }
                Ok(current)
            }
            AstKind::Empty => Ok(current),
            _ => self.build_binding_name(current, element),
        }
    }

    fn build_expression(&mut self, mut current: BlockId, expression: NodeId) -> Result<BlockId> {
        match self.tree.kind(expression) {
            AstKind::Call { callee, args } | AstKind::New { callee, args } => {
                let (callee, args) = (*callee, args.clone());
                self.add_element(current, expression);
                // arguments evaluate left to right, so lower them right to left
                for arg in args.iter().rev() {
                    current = self.build_expression(current, *arg)?;
                }
                self.build_expression(current, callee)
            }
            AstKind::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                let (condition, when_true, when_false) = (*condition, *when_true, *when_false);
                let predecessor = self.create_predecessor_block(current);
                let when_false = self.build_expression(predecessor, when_false)?;
                let predecessor = self.create_predecessor_block(current);
                let when_true = self.build_expression(predecessor, when_true)?;
                let label = self.tree.text(expression).to_string();
                let branching = self.create_branching_block(label, when_true, when_false);
                self.build_expression(branching, condition)
            }
            AstKind::Binary { op, left, right } => {
                let (op, left, right) = (*op, *left, *right);
                self.build_binary_expression(current, expression, op, left, right)
            }
            AstKind::Paren { expression } => self.build_expression(current, *expression),
            AstKind::ObjectLit { properties } => {
                let properties = properties.clone();
                self.add_element(current, expression);
                for property in properties.iter().rev() {
                    match self.tree.kind(*property) {
                        AstKind::PropertyAssignment { value, .. } => {
                            current = self.build_expression(current, *value)?;
                        }
                        AstKind::ShorthandProperty { name } => {
                            current = self.build_expression(current, *name)?;
                        }
                        _ => {}
                    }
                }
                Ok(current)
            }
            AstKind::ArrayLit { elements } => {
                let elements = elements.clone();
                self.add_element(current, expression);
                for element in elements.iter().rev() {
                    current = self.build_expression(current, *element)?;
                }
                Ok(current)
            }
            AstKind::Ident | AstKind::Literal { .. } => {
                self.add_element(current, expression);
                Ok(current)
            }
            // closures are single opaque elements: control never enters them here
            AstKind::FunctionExpr { .. } | AstKind::ArrowFunction { .. } | AstKind::ClassExpr { .. } => {
                self.add_element(current, expression);
                Ok(current)
            }
            AstKind::PropertyAccess { object, .. } => {
                let object = *object;
                self.add_element(current, expression);
                self.build_expression(current, object)
            }
            AstKind::ElementAccess { object, index } => {
                let (object, index) = (*object, *index);
                self.add_element(current, expression);
                current = self.build_expression(current, index)?;
                self.build_expression(current, object)
            }
            AstKind::PrefixUnary { operand, .. } | AstKind::PostfixUnary { operand, .. } => {
                let operand = *operand;
                self.add_element(current, expression);
                self.build_expression(current, operand)
            }
            AstKind::Empty => Ok(current),
            other => Err(FlowlintError::internal(format!(
                "unexpected expression kind: {other:?}"
            ))),
        }
    }

    fn build_binary_expression(
        &mut self,
        current: BlockId,
        expression: NodeId,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    ) -> Result<BlockId> {
        match op {
            BinaryOp::And => {
                let mut when_false = current;
                let mut when_true = current;
                // an empty branching block means we are the condition of
                // an enclosing branch: short-circuit shares its false arm
                if let Some(false_successor) = self.empty_branching_false_successor(current) {
                    when_false = false_successor;
                } else {
                    when_true = self.create_predecessor_block(current);
                }
                when_true = self.build_expression(when_true, right)?;
                let label = self.tree.text(left).to_string();
                let branching = self.create_branching_block(label, when_true, when_false);
                self.build_expression(branching, left)
            }
            BinaryOp::Or => {
                let mut when_false = current;
                let mut when_true = current;
                if let Some(true_successor) = self.empty_branching_true_successor(current) {
                    when_true = true_successor;
                } else {
                    when_false = self.create_predecessor_block(current);
                }
                when_false = self.build_expression(when_false, right)?;
                let label = self.tree.text(left).to_string();
                let branching = self.create_branching_block(label, when_true, when_false);
                self.build_expression(branching, left)
            }
            BinaryOp::Assign => {
                // the assignment element itself carries the store; bound
                // identifiers are not lowered as reads
                self.add_element(current, expression);
                let mut current = self.build_expression(current, right)?;
                let lhs = collect_left_hand_identifiers(self.tree, left);
                for node in lhs.non_identifiers {
                    current = self.build_expression(current, node)?;
                }
                Ok(current)
            }
            _ => {
                self.add_element(current, expression);
                let current = self.build_expression(current, right)?;
                self.build_expression(current, left)
            }
        }
    }

    fn is_true_literal(&self, expression: NodeId) -> bool {
        let expression = self.tree.skip_parens(expression);
        matches!(
            self.tree.kind(expression),
            AstKind::Literal {
                kind: LiteralKind::Boolean
            }
        ) && self.tree.text(expression) == "true"
    }

    fn empty_branching_false_successor(&self, block: BlockId) -> Option<BlockId> {
        match &self.blocks[block.index()].kind {
            BlockKind::Branching { false_successor, .. }
                if self.blocks[block.index()].elements.is_empty() =>
            {
                Some(*false_successor)
            }
            _ => None,
        }
    }

    fn empty_branching_true_successor(&self, block: BlockId) -> Option<BlockId> {
        match &self.blocks[block.index()].kind {
            BlockKind::Branching { true_successor, .. }
                if self.blocks[block.index()].elements.is_empty() =>
            {
                Some(*true_successor)
            }
            _ => None,
        }
    }

    fn create_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(CfgBlock::generic());
        id
    }

    fn create_predecessor_block(&mut self, successor: BlockId) -> BlockId {
        let id = self.create_block();
        self.add_successor(id, successor);
        id
    }

    fn create_branching_block(
        &mut self,
        label: String,
        true_successor: BlockId,
        false_successor: BlockId,
    ) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(CfgBlock {
            kind: BlockKind::Branching {
                label,
                true_successor,
                false_successor,
            },
            elements: Vec::new(),
            predecessors: Vec::new(),
            removed: false,
        });
        id
    }

    fn add_successor(&mut self, block: BlockId, successor: BlockId) {
        if let BlockKind::Generic { successors } = &mut self.blocks[block.index()].kind {
            successors.push(successor);
        }
    }

    fn add_element(&mut self, block: BlockId, node: NodeId) {
        let block = &mut self.blocks[block.index()];
        // the end block accepts no elements
        if !block.is_end() {
            block.elements.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::TreeBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_straight_line_assignment() {
        // x = 1;
        let mut b = TreeBuilder::new();
        let x = b.ident("x");
        let one = b.number("1");
        let assign = b.assign(x, one);
        let stmt = b.expr_stmt(assign);
        let tree = b.finish(vec![stmt]);

        let cfg = CfgBuilder::build(&tree, &[stmt]).unwrap();
        assert_eq!(cfg.to_text(&tree), "B0(end)\nB1(start) [1, x = 1] -> B0\n");
    }

    #[test]
    fn test_if_else_topology() {
        // if (c) { x; } else { y; }
        let mut b = TreeBuilder::new();
        let c = b.ident("c");
        let x = b.ident("x");
        let then_branch = b.expr_stmt(x);
        let y = b.ident("y");
        let else_branch = b.expr_stmt(y);
        let stmt = b.if_stmt(c, then_branch, Some(else_branch));
        let tree = b.finish(vec![stmt]);

        let cfg = CfgBuilder::build(&tree, &[stmt]).unwrap();
        assert_eq!(
            cfg.to_text(&tree),
            "B0(end)\nB2 [y] -> B0\nB3 [x] -> B0\nB4(start)<if (c)> [c] T->B3 F->B2\n"
        );
    }

    #[test]
    fn test_while_loop_back_edge() {
        // while (c) { x = y; }
        let mut b = TreeBuilder::new();
        let c = b.ident("c");
        let x = b.ident("x");
        let y = b.ident("y");
        let assign = b.assign(x, y);
        let stmt = b.expr_stmt(assign);
        let body = b.block(vec![stmt]);
        let while_stmt = b.while_stmt(c, body);
        let tree = b.finish(vec![while_stmt]);

        let cfg = CfgBuilder::build(&tree, &[while_stmt]).unwrap();
        assert_eq!(
            cfg.to_text(&tree),
            "B0(end)\nB2 [y, x = y] -> B3\nB3(start)<while(c)> [c] T->B2 F->B0\n"
        );
    }

    #[test]
    fn test_call_arguments_lower_right_to_left() {
        // f(a, b);
        let mut b = TreeBuilder::new();
        let f = b.ident("f");
        let a = b.ident("a");
        let arg_b = b.ident("b");
        let call = b.call(f, vec![a, arg_b]);
        let stmt = b.expr_stmt(call);
        let tree = b.finish(vec![stmt]);

        let cfg = CfgBuilder::build(&tree, &[stmt]).unwrap();
        // execution order: callee, then arguments left to right, then the call
        assert_eq!(
            cfg.to_text(&tree),
            "B0(end)\nB1(start) [f, a, b, f(a, b)] -> B0\n"
        );
    }

    #[test]
    fn test_unsupported_constructs_are_rejected() {
        let mut b = TreeBuilder::new();
        let brk = b.brk();
        let c = b.ident("c");
        let body = b.block(vec![brk]);
        let while_stmt = b.while_stmt(c, body);
        let tree = b.finish(vec![while_stmt]);

        let err = CfgBuilder::build(&tree, &[while_stmt]).unwrap_err();
        assert!(matches!(err, FlowlintError::UnsupportedConstruct(_)));
    }
}
