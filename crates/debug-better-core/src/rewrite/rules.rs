/*!
# Rewrite Rules

Core trait and statistics for rules applied by a [`RulePass`](super::RulePass).
*/

use std::time::Duration;

use serde::Serialize;

use crate::ast::{Expr, Statement};
use crate::Result;

use super::{RuleContext, RuleResult};

/// Core trait for rewrite rules
///
/// A rule is a stateless decision over one node. The walker offers it every call
/// expression through `rewrite_expr` and every statement through `rewrite_statement`,
/// children first. An inapplicable node answers `NoChange`; `Err` is reserved for a
/// replacement that could not be built and is reported without stopping the pass.
pub trait RewriteRule: Send + Sync {
    /// Human-readable name for this rule
    fn name(&self) -> &'static str;

    /// Detailed description of what this rule does
    fn description(&self) -> &'static str;

    /// Title shown when rules are listed for a user to pick from
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Manual effort one rewrite stands in for
    fn estimated_effort_per_occurrence(&self) -> Duration {
        Duration::from_secs(60)
    }

    /// Offered each method call expression
    fn rewrite_expr(&self, expr: &Expr, cx: &RuleContext<'_>) -> Result<RuleResult<Expr>> {
        let _ = (expr, cx);
        Ok(RuleResult::NoChange)
    }

    /// Offered each statement
    fn rewrite_statement(
        &self,
        stmt: &Statement,
        cx: &RuleContext<'_>,
    ) -> Result<RuleResult<Statement>> {
        let _ = (stmt, cx);
        Ok(RuleResult::NoChange)
    }
}

impl<R: RewriteRule + ?Sized> RewriteRule for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn description(&self) -> &'static str {
        (**self).description()
    }

    fn display_name(&self) -> &'static str {
        (**self).display_name()
    }

    fn estimated_effort_per_occurrence(&self) -> Duration {
        (**self).estimated_effort_per_occurrence()
    }

    fn rewrite_expr(&self, expr: &Expr, cx: &RuleContext<'_>) -> Result<RuleResult<Expr>> {
        (**self).rewrite_expr(expr, cx)
    }

    fn rewrite_statement(
        &self,
        stmt: &Statement,
        cx: &RuleContext<'_>,
    ) -> Result<RuleResult<Statement>> {
        (**self).rewrite_statement(stmt, cx)
    }
}

/// Rule execution statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleStats {
    pub rule_name: String,
    /// Nodes offered to the rule
    pub visits: u64,
    pub rewrites: u64,
    pub errors: u64,
    pub total_time_us: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: &RuleStats) {
        self.visits += other.visits;
        self.rewrites += other.rewrites;
        self.errors += other.errors;
        self.total_time_us += other.total_time_us;
    }

    pub fn rewrite_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            (self.rewrites as f64) / (self.visits as f64)
        }
    }

    pub fn average_time_us(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            (self.total_time_us as f64) / (self.visits as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_rates() {
        let mut stats = RuleStats::new("LazyWrap".to_string());
        assert_eq!(stats.rewrite_rate(), 0.0);
        assert_eq!(stats.average_time_us(), 0.0);

        stats.merge(&RuleStats {
            rule_name: "LazyWrap".to_string(),
            visits: 4,
            rewrites: 1,
            errors: 0,
            total_time_us: 20,
        });
        assert_eq!(stats.rewrite_rate(), 0.25);
        assert_eq!(stats.average_time_us(), 5.0);
    }
}
