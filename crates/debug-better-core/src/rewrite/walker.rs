/*!
# RulePass - Post-Order Rewrite Walker

Applies one rule to a tree. Every call expression and every statement is offered to
the rule exactly once, after all of its children have been rewritten, so nested
logging calls are handled deepest first. The node's ancestors travel with it as an
explicit [`AncestorChain`].

A pass holds no per-node state. Statistics accumulate per run and are merged behind a
lock at the end, so one pass can serve several compilation units from several threads.
*/

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ast::{
    Block, ClassDecl, ClassMember, Clause, CompilationUnit, Expr, ExprKind, FieldDecl, Lambda,
    LambdaBody, MethodCall, MethodDecl, Statement, StatementKind, ToSource,
};
use crate::types::TypeResolver;
use crate::{RewriteConfig, RewriteError, Result};

use super::rules::{RewriteRule, RuleStats};
use super::{Ancestor, AncestorChain, RuleContext, RuleResult};

/// Single-rule post-order rewrite pass
pub struct RulePass<R> {
    rule: R,
    config: RewriteConfig,
    stats: Mutex<RuleStats>,
}

impl<R: RewriteRule> RulePass<R> {
    pub fn new(rule: R) -> Self {
        let stats = Mutex::new(RuleStats::new(rule.name().to_string()));
        Self {
            rule,
            config: RewriteConfig::default(),
            stats,
        }
    }

    pub fn with_config(mut self, config: RewriteConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Rewrite a whole compilation unit
    pub fn run(
        &self,
        unit: &CompilationUnit,
        types: &dyn TypeResolver,
    ) -> PassOutput<CompilationUnit> {
        let mut walk = Walk::new(self, types, unit.source_path.as_deref());
        let classes = unit.classes.iter().map(|class| walk.class(class)).collect();
        let summary = walk.finish();

        info!(
            rule = self.rule.name(),
            title = self.rule.display_name(),
            source = unit.source_path.as_deref().unwrap_or("<memory>"),
            rewrites = summary.rewrites,
            diagnostics = summary.diagnostics.len(),
            "rule pass complete"
        );

        PassOutput {
            node: CompilationUnit {
                source_path: unit.source_path.clone(),
                classes,
            },
            summary,
        }
    }

    /// Rewrite a detached statement; it has no enclosing class or conditional
    pub fn run_statement(
        &self,
        stmt: &Statement,
        types: &dyn TypeResolver,
    ) -> PassOutput<Statement> {
        let mut walk = Walk::new(self, types, None);
        let node = walk.statement(stmt);
        PassOutput {
            node,
            summary: walk.finish(),
        }
    }

    /// Rewrite a detached expression
    pub fn run_expr(&self, expr: &Expr, types: &dyn TypeResolver) -> PassOutput<Expr> {
        let mut walk = Walk::new(self, types, None);
        let node = walk.expr(expr);
        PassOutput {
            node,
            summary: walk.finish(),
        }
    }

    /// Statistics accumulated over every run of this pass
    pub fn stats(&self) -> RuleStats {
        self.stats.lock().clone()
    }

    /// Manual effort stood in for by every rewrite this pass has made so far
    pub fn estimated_time_saved(&self) -> Duration {
        let rewrites = u32::try_from(self.stats.lock().rewrites).unwrap_or(u32::MAX);
        self.rule.estimated_effort_per_occurrence().saturating_mul(rewrites)
    }

    pub fn clear_stats(&mut self) {
        let name = self.rule.name().to_string();
        *self.stats.get_mut() = RuleStats::new(name);
    }
}

/// Rewritten tree plus what happened while producing it
#[derive(Debug, Clone)]
pub struct PassOutput<T> {
    pub node: T,
    pub summary: RewriteSummary,
}

/// A call site the pass could not rewrite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub rule: String,
    pub source: Option<String>,
    /// `Class.method` enclosing the site
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(
                f,
                "{}: {} [{}]: {}",
                source, self.location, self.rule, self.message
            ),
            None => write!(f, "{} [{}]: {}", self.location, self.rule, self.message),
        }
    }
}

/// Summary of rewrite results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RewriteSummary {
    pub rewrites: u64,
    pub diagnostics: Vec<Diagnostic>,
}

impl RewriteSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: RewriteSummary) {
        self.rewrites += other.rewrites;
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn success(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

struct Walk<'a, R> {
    pass: &'a RulePass<R>,
    types: &'a dyn TypeResolver,
    source: Option<&'a str>,
    chain: AncestorChain<'a>,
    stats: RuleStats,
    summary: RewriteSummary,
}

impl<'a, R: RewriteRule> Walk<'a, R> {
    fn new(pass: &'a RulePass<R>, types: &'a dyn TypeResolver, source: Option<&'a str>) -> Self {
        Self {
            pass,
            types,
            source,
            chain: AncestorChain::new(),
            stats: RuleStats::new(pass.rule.name().to_string()),
            summary: RewriteSummary::new(),
        }
    }

    fn finish(self) -> RewriteSummary {
        self.pass.stats.lock().merge(&self.stats);
        self.summary
    }

    fn class(&mut self, class: &'a ClassDecl) -> ClassDecl {
        self.chain.push_class(class);
        let members = class
            .members
            .iter()
            .map(|member| match member {
                ClassMember::Field(field) => ClassMember::Field(self.field(field)),
                ClassMember::Method(method) => ClassMember::Method(self.method(method)),
                ClassMember::Class(nested) => ClassMember::Class(self.class(nested)),
            })
            .collect();
        self.chain.pop();

        ClassDecl {
            name: class.name.clone(),
            annotations: class.annotations.clone(),
            members,
        }
    }

    fn field(&mut self, field: &'a FieldDecl) -> FieldDecl {
        self.chain.push(Ancestor::Field(field));
        let initializer = field.initializer.as_ref().map(|init| self.expr(init));
        self.chain.pop();

        FieldDecl {
            type_name: field.type_name.clone(),
            name: field.name.clone(),
            initializer,
        }
    }

    fn method(&mut self, method: &'a MethodDecl) -> MethodDecl {
        self.chain.push_method(method);
        let body = method.body.as_ref().map(|body| self.block(body));
        self.chain.pop();

        MethodDecl {
            name: method.name.clone(),
            body,
        }
    }

    fn block(&mut self, block: &'a Block) -> Block {
        Block {
            statements: block.statements.iter().map(|stmt| self.statement(stmt)).collect(),
            end: block.end.clone(),
        }
    }

    fn statement(&mut self, stmt: &'a Statement) -> Statement {
        if self.too_deep() {
            return stmt.clone();
        }

        self.chain.push_statement(stmt);
        let kind = match &stmt.kind {
            StatementKind::Expression(expr) => StatementKind::Expression(self.expr(expr)),
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => StatementKind::If {
                condition: self.expr(condition),
                then_branch: Box::new(self.statement(then_branch)),
                else_branch: else_branch
                    .as_deref()
                    .map(|else_stmt| Box::new(self.statement(else_stmt))),
            },
            StatementKind::Block(block) => StatementKind::Block(self.block(block)),
            StatementKind::LocalVariable {
                type_name,
                name,
                initializer,
            } => StatementKind::LocalVariable {
                type_name: type_name.clone(),
                name: name.clone(),
                initializer: initializer.as_ref().map(|init| self.expr(init)),
            },
            StatementKind::Return(value) => {
                StatementKind::Return(value.as_ref().map(|value| self.expr(value)))
            }
            StatementKind::Compound(clauses) => StatementKind::Compound(
                clauses.iter().map(|clause| self.clause(clause)).collect(),
            ),
            StatementKind::Other(text) => StatementKind::Other(text.clone()),
        };
        self.chain.pop();

        let rebuilt = Statement {
            prefix: stmt.prefix.clone(),
            kind,
        };
        let started = Instant::now();
        let outcome = {
            let cx = RuleContext::new(self.types, &self.chain, &self.pass.config.conventions);
            self.pass.rule.rewrite_statement(&rebuilt, &cx)
        };
        self.settle(rebuilt, outcome, started)
    }

    fn clause(&mut self, clause: &'a Clause) -> Clause {
        Clause {
            prefix: clause.prefix.clone(),
            keyword: clause.keyword.clone(),
            header: clause.header.as_deref().map(|parts| self.exprs(parts)),
            separator: clause.separator.clone(),
            body: clause.body.as_deref().map(|body| Box::new(self.statement(body))),
        }
    }

    fn expr(&mut self, expr: &'a Expr) -> Expr {
        if self.too_deep() {
            return expr.clone();
        }

        self.chain.push_expr(expr);
        let kind = match &expr.kind {
            ExprKind::Identifier(_) | ExprKind::Literal(_) | ExprKind::Other(_) => {
                expr.kind.clone()
            }
            ExprKind::FieldAccess { target, name } => ExprKind::FieldAccess {
                target: Box::new(self.expr(target)),
                name: name.clone(),
            },
            ExprKind::MethodCall(call) => ExprKind::MethodCall(MethodCall {
                select: call.select.as_deref().map(|select| Box::new(self.expr(select))),
                name: call.name.clone(),
                args: self.exprs(&call.args),
                method_type: call.method_type.clone(),
            }),
            ExprKind::New { type_name, args } => ExprKind::New {
                type_name: type_name.clone(),
                args: self.exprs(args),
            },
            ExprKind::Cast { type_name, expr: inner } => ExprKind::Cast {
                type_name: type_name.clone(),
                expr: Box::new(self.expr(inner)),
            },
            ExprKind::Binary { op, left, right } => ExprKind::Binary {
                op: *op,
                left: Box::new(self.expr(left)),
                right: Box::new(self.expr(right)),
            },
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => ExprKind::Ternary {
                condition: Box::new(self.expr(condition)),
                then_expr: Box::new(self.expr(then_expr)),
                else_expr: Box::new(self.expr(else_expr)),
            },
            ExprKind::Lambda(lambda) => ExprKind::Lambda(Lambda {
                params: lambda.params.clone(),
                body: match &lambda.body {
                    LambdaBody::Expr(body) => LambdaBody::Expr(Box::new(self.expr(body))),
                    LambdaBody::Block(block) => LambdaBody::Block(self.block(block)),
                },
            }),
            ExprKind::MemberReference { target, method } => ExprKind::MemberReference {
                target: Box::new(self.expr(target)),
                method: method.clone(),
            },
        };
        self.chain.pop();

        let rebuilt = Expr {
            id: expr.id,
            prefix: expr.prefix.clone(),
            kind,
        };
        if rebuilt.as_method_call().is_none() {
            return rebuilt;
        }

        let started = Instant::now();
        let outcome = {
            let cx = RuleContext::new(self.types, &self.chain, &self.pass.config.conventions);
            self.pass.rule.rewrite_expr(&rebuilt, &cx)
        };
        self.settle(rebuilt, outcome, started)
    }

    fn exprs(&mut self, exprs: &'a [Expr]) -> Vec<Expr> {
        exprs.iter().map(|expr| self.expr(expr)).collect()
    }

    fn settle<T: ToSource>(
        &mut self,
        original: T,
        outcome: Result<RuleResult<T>>,
        started: Instant,
    ) -> T {
        self.stats.visits += 1;
        self.stats.total_time_us += started.elapsed().as_micros() as u64;

        match outcome {
            Ok(RuleResult::NoChange) => original,
            Ok(RuleResult::Replace(replacement)) => {
                self.stats.rewrites += 1;
                self.summary.rewrites += 1;
                debug!(
                    rule = self.pass.rule.name(),
                    location = %self.chain.location(),
                    before = %original.to_source().trim(),
                    after = %replacement.to_source().trim(),
                    "rewrote logging site"
                );
                replacement
            }
            Err(err) => {
                self.stats.errors += 1;
                self.report(err);
                original
            }
        }
    }

    fn too_deep(&mut self) -> bool {
        let limit = self.pass.config.max_depth;
        if self.chain.depth() < limit {
            return false;
        }
        self.report(RewriteError::DepthExceeded { limit });
        true
    }

    fn report(&mut self, err: RewriteError) {
        let diagnostic = Diagnostic {
            rule: self.pass.rule.name().to_string(),
            source: self.source.map(str::to_string),
            location: self.chain.location(),
            message: err.to_string(),
        };
        warn!(
            rule = %diagnostic.rule,
            location = %diagnostic.location,
            "{}",
            diagnostic.message
        );
        self.summary.diagnostics.push(diagnostic);
    }
}
