/*!
# Rewrite Framework

Per-node rewrite rules and the walker that drives them.

## Architecture

- `RewriteRule`: a stateless decision function over one call expression or statement
- `RulePass`: post-order walker applying a single rule to a compilation unit
- `AncestorChain`: the enclosing nodes of the node under examination, passed
  explicitly alongside it
- `ExprWalker` / `PatternMatcher`: sub-tree scans used by rule predicates
- `debug_rules`: the lazy-wrap, fluent-API and guard-insertion rules

## Example Usage

```rust
use debug_better_core::{GuardInsertionRule, RulePass, TypeTable, CompilationUnit};

let pass = RulePass::new(GuardInsertionRule::new());
let unit = CompilationUnit::default();
let output = pass.run(&unit, &TypeTable::new());
assert_eq!(output.summary.rewrites, 0);
```
*/

pub mod debug_rules;
pub mod patterns;
pub mod rules;
pub mod walker;

// Re-export main types
pub use patterns::{ExprPattern, ExprWalker, PatternMatcher};
pub use rules::{RewriteRule, RuleStats};
pub use walker::{Diagnostic, PassOutput, RewriteSummary, RulePass};

use crate::ast::{ClassDecl, Expr, FieldDecl, MethodDecl, Statement, StatementKind};
use crate::logger::LoggerConventions;
use crate::types::TypeResolver;

/// Outcome of offering one node to a rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleResult<T> {
    NoChange,
    Replace(T),
}

impl<T> RuleResult<T> {
    pub fn is_change(&self) -> bool {
        matches!(self, RuleResult::Replace(_))
    }

    pub fn replacement(self) -> Option<T> {
        match self {
            RuleResult::Replace(node) => Some(node),
            RuleResult::NoChange => None,
        }
    }
}

/// A node enclosing the one under examination
#[derive(Debug, Clone, Copy)]
pub enum Ancestor<'a> {
    Class(&'a ClassDecl),
    Field(&'a FieldDecl),
    Method(&'a MethodDecl),
    Statement(&'a Statement),
    Expr(&'a Expr),
}

/// Enclosing nodes, outermost first.
#[derive(Debug, Clone, Default)]
pub struct AncestorChain<'a> {
    nodes: Vec<Ancestor<'a>>,
}

impl<'a> AncestorChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ancestor: Ancestor<'a>) {
        self.nodes.push(ancestor);
    }

    pub fn push_class(&mut self, class: &'a ClassDecl) {
        self.push(Ancestor::Class(class));
    }

    pub fn push_method(&mut self, method: &'a MethodDecl) {
        self.push(Ancestor::Method(method));
    }

    pub fn push_statement(&mut self, stmt: &'a Statement) {
        self.push(Ancestor::Statement(stmt));
    }

    pub fn push_expr(&mut self, expr: &'a Expr) {
        self.push(Ancestor::Expr(expr));
    }

    pub fn pop(&mut self) -> Option<Ancestor<'a>> {
        self.nodes.pop()
    }

    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    /// Ancestors from the innermost outwards
    pub fn innermost_first(&self) -> impl Iterator<Item = &Ancestor<'a>> {
        self.nodes.iter().rev()
    }

    pub fn nearest_class(&self) -> Option<&'a ClassDecl> {
        self.innermost_first().find_map(|ancestor| match *ancestor {
            Ancestor::Class(class) => Some(class),
            _ => None,
        })
    }

    pub fn nearest_method(&self) -> Option<&'a MethodDecl> {
        self.innermost_first().find_map(|ancestor| match *ancestor {
            Ancestor::Method(method) => Some(method),
            _ => None,
        })
    }

    /// Condition of the nearest enclosing `if` statement.
    pub fn nearest_if_condition(&self) -> Option<&'a Expr> {
        self.innermost_first().find_map(|ancestor| match *ancestor {
            Ancestor::Statement(stmt) => match &stmt.kind {
                StatementKind::If { condition, .. } => Some(condition),
                _ => None,
            },
            _ => None,
        })
    }

    /// `Class.method` of the innermost declarations, for diagnostics
    pub fn location(&self) -> String {
        match (self.nearest_class(), self.nearest_method()) {
            (Some(class), Some(method)) => format!("{}.{}", class.name, method.name),
            (Some(class), None) => class.name.clone(),
            (None, Some(method)) => method.name.clone(),
            (None, None) => "<root>".to_string(),
        }
    }
}

/// Everything a rule may consult besides the node itself
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub types: &'a dyn TypeResolver,
    pub ancestors: &'a AncestorChain<'a>,
    pub conventions: &'a LoggerConventions,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        types: &'a dyn TypeResolver,
        ancestors: &'a AncestorChain<'a>,
        conventions: &'a LoggerConventions,
    ) -> Self {
        Self {
            types,
            ancestors,
            conventions,
        }
    }
}
