/*!
# Expression Pattern Matching Utilities

Utilities for matching patterns in expression sub-trees, used by rule predicates
that need to look inside a node (e.g. whether a condition already calls the
enable-check).
*/

use crate::ast::{Expr, ExprKind, LambdaBody, Statement, StatementKind};

/// Pattern matcher for expression nodes
pub trait ExprPattern {
    /// Check if this pattern matches the given expression
    fn matches(&self, expr: &Expr) -> bool;
}

impl<F> ExprPattern for F
where
    F: Fn(&Expr) -> bool,
{
    fn matches(&self, expr: &Expr) -> bool {
        self(expr)
    }
}

/// Pattern matcher utility
pub struct PatternMatcher;

impl PatternMatcher {
    /// Match method calls with a specific name, whatever their receiver
    pub fn call_named(name: &str) -> CallNameMatcher {
        CallNameMatcher {
            name: name.to_string(),
        }
    }

    /// Match identifiers with a specific name
    pub fn identifier(name: &str) -> IdentifierMatcher {
        IdentifierMatcher {
            name: name.to_string(),
        }
    }
}

/// Method call name matcher
pub struct CallNameMatcher {
    name: String,
}

impl ExprPattern for CallNameMatcher {
    fn matches(&self, expr: &Expr) -> bool {
        matches!(&expr.kind, ExprKind::MethodCall(call) if call.name == self.name)
    }
}

/// Identifier name matcher
pub struct IdentifierMatcher {
    name: String,
}

impl ExprPattern for IdentifierMatcher {
    fn matches(&self, expr: &Expr) -> bool {
        matches!(&expr.kind, ExprKind::Identifier(name) if name == &self.name)
    }
}

/// Utility for deep expression traversal and pattern matching
pub struct ExprWalker;

impl ExprWalker {
    /// Find all expressions matching a pattern, in pre-order
    pub fn find_all<'a, P: ExprPattern + ?Sized>(expr: &'a Expr, pattern: &P) -> Vec<&'a Expr> {
        let mut matches = Vec::new();
        Self::find_all_recursive(expr, pattern, &mut matches);
        matches
    }

    /// Whether any expression in the tree matches
    pub fn contains<P: ExprPattern + ?Sized>(expr: &Expr, pattern: &P) -> bool {
        if pattern.matches(expr) {
            return true;
        }
        Self::children(expr)
            .into_iter()
            .any(|child| Self::contains(child, pattern))
    }

    fn find_all_recursive<'a, P: ExprPattern + ?Sized>(
        expr: &'a Expr,
        pattern: &P,
        matches: &mut Vec<&'a Expr>,
    ) {
        if pattern.matches(expr) {
            matches.push(expr);
        }
        for child in Self::children(expr) {
            Self::find_all_recursive(child, pattern, matches);
        }
    }

    /// Direct sub-expressions, including those inside lambda block bodies
    pub fn children(expr: &Expr) -> Vec<&Expr> {
        match &expr.kind {
            ExprKind::Identifier(_) | ExprKind::Literal(_) | ExprKind::Other(_) => Vec::new(),
            ExprKind::FieldAccess { target, .. } => vec![&**target],
            ExprKind::MethodCall(call) => call
                .select
                .as_deref()
                .into_iter()
                .chain(call.args.iter())
                .collect(),
            ExprKind::New { args, .. } => args.iter().collect(),
            ExprKind::Cast { expr, .. } => vec![&**expr],
            ExprKind::Binary { left, right, .. } => vec![&**left, &**right],
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => vec![&**condition, &**then_expr, &**else_expr],
            ExprKind::Lambda(lambda) => match &lambda.body {
                LambdaBody::Expr(body) => vec![&**body],
                LambdaBody::Block(block) => {
                    let mut exprs = Vec::new();
                    for stmt in &block.statements {
                        statement_exprs(stmt, &mut exprs);
                    }
                    exprs
                }
            },
            ExprKind::MemberReference { target, .. } => vec![&**target],
        }
    }
}

fn statement_exprs<'a>(stmt: &'a Statement, out: &mut Vec<&'a Expr>) {
    match &stmt.kind {
        StatementKind::Expression(expr) => out.push(expr),
        StatementKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            out.push(condition);
            statement_exprs(then_branch, out);
            if let Some(else_stmt) = else_branch {
                statement_exprs(else_stmt, out);
            }
        }
        StatementKind::Block(block) => {
            for inner in &block.statements {
                statement_exprs(inner, out);
            }
        }
        StatementKind::LocalVariable { initializer, .. } => out.extend(initializer.iter()),
        StatementKind::Return(value) => out.extend(value.iter()),
        StatementKind::Compound(clauses) => {
            for clause in clauses {
                out.extend(clause.header.iter().flatten());
                if let Some(body) = &clause.body {
                    statement_exprs(body, out);
                }
            }
        }
        StatementKind::Other(_) => {}
    }
}
