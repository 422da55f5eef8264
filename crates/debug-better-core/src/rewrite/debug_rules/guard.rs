/*!
# Guard-Insertion Rule

Wraps a bare `logger.debug(...)` statement in `if (logger.isDebugEnabled()) { ... }`.

Only statements are guarded: a call used as a value cannot be skipped. The receiver
must be side-effect free because it is evaluated again by the guard condition. A
statement whose nearest enclosing `if` already tests `isDebugEnabled` is left alone;
conditions further out are not consulted.
*/

use crate::ast::Statement;
use crate::fragments::debug_guard;
use crate::logger::{detect_debug_site, is_safe_select, DEBUG_METHOD, GUARD_METHOD};
use crate::rewrite::patterns::{ExprWalker, PatternMatcher};
use crate::rewrite::rules::RewriteRule;
use crate::rewrite::{RuleContext, RuleResult};
use crate::Result;

/// Guards debug logging statements with an enable check
#[derive(Debug, Clone, Default)]
pub struct GuardInsertionRule;

impl GuardInsertionRule {
    pub fn new() -> Self {
        Self
    }
}

impl RewriteRule for GuardInsertionRule {
    fn name(&self) -> &'static str {
        "GuardInsertion"
    }

    fn description(&self) -> &'static str {
        "Wraps debug() calls with if (logger.isDebugEnabled()) guards"
    }

    fn display_name(&self) -> &'static str {
        "Guard debug logs with isDebugEnabled"
    }

    fn rewrite_statement(
        &self,
        stmt: &Statement,
        cx: &RuleContext<'_>,
    ) -> Result<RuleResult<Statement>> {
        let Some(call) = stmt.as_call_statement() else {
            return Ok(RuleResult::NoChange);
        };
        if call.name != DEBUG_METHOD || call.args.len() < 2 {
            return Ok(RuleResult::NoChange);
        }

        let Some(select) = call.select.as_deref() else {
            return Ok(RuleResult::NoChange);
        };
        if !is_safe_select(select) {
            return Ok(RuleResult::NoChange);
        }

        let well_known = detect_debug_site(call, cx).is_some_and(|site| site.is_well_known());
        if !well_known || is_already_guarded(cx) {
            return Ok(RuleResult::NoChange);
        }

        Ok(RuleResult::Replace(debug_guard(stmt, select)?))
    }
}

/// Whether the nearest enclosing `if` condition calls `isDebugEnabled` anywhere.
fn is_already_guarded(cx: &RuleContext<'_>) -> bool {
    let guard_call = PatternMatcher::call_named(GUARD_METHOD);
    cx.ancestors
        .nearest_if_condition()
        .is_some_and(|condition| ExprWalker::contains(condition, &guard_call))
}
