/*!
# Fluent-API Rule

Moves `debug(message, args...)` on the well-known facade onto its fluent builder:
`atDebug().setMessage(message).addArgument(a)...log()`.
*/

use std::time::Duration;

use crate::ast::Expr;
use crate::fragments::fluent_chain;
use crate::logger::{declares_method, detect_debug_site, DEBUG_METHOD, FLUENT_ENTRY_METHOD};
use crate::rewrite::rules::RewriteRule;
use crate::rewrite::{RuleContext, RuleResult};
use crate::types::TypeInfo;
use crate::Result;

/// Converts debug calls to the fluent logging API
///
/// A resolved call must be declared on a type assignable to the well-known facade that
/// also exposes `atDebug`. An unresolved call is accepted on the naming convention
/// alone. A first argument known to be something other than a string means a
/// different overload and is declined.
#[derive(Debug, Clone, Default)]
pub struct FluentApiRule;

impl FluentApiRule {
    pub fn new() -> Self {
        Self
    }
}

impl RewriteRule for FluentApiRule {
    fn name(&self) -> &'static str {
        "FluentApi"
    }

    fn description(&self) -> &'static str {
        "Rewrites debug() calls to the fluent API when atDebug() is available"
    }

    fn display_name(&self) -> &'static str {
        "Convert debug logs to fluent API"
    }

    fn estimated_effort_per_occurrence(&self) -> Duration {
        Duration::from_secs(2 * 60)
    }

    fn rewrite_expr(&self, expr: &Expr, cx: &RuleContext<'_>) -> Result<RuleResult<Expr>> {
        let Some(call) = expr.as_method_call() else {
            return Ok(RuleResult::NoChange);
        };
        if call.name != DEBUG_METHOD || call.select.is_none() {
            return Ok(RuleResult::NoChange);
        }
        let Some(message) = call.args.first() else {
            return Ok(RuleResult::NoChange);
        };

        let Some(site) = detect_debug_site(call, cx) else {
            return Ok(RuleResult::NoChange);
        };
        if !site.is_well_known() {
            return Ok(RuleResult::NoChange);
        }

        if site.resolved {
            let declaring = call
                .method_type
                .as_ref()
                .and_then(|signature| signature.declaring_type.as_deref());
            let has_entry = declaring.is_some_and(|declaring| {
                declares_method(cx.types, declaring, FLUENT_ENTRY_METHOD)
            });
            if !has_entry {
                return Ok(RuleResult::NoChange);
            }
        }

        if !is_message_type(&cx.types.resolve_type(message)) {
            return Ok(RuleResult::NoChange);
        }

        Ok(RuleResult::Replace(fluent_chain(expr)?))
    }
}

/// Unknown is given the benefit of the doubt.
fn is_message_type(ty: &TypeInfo) -> bool {
    ty.is_unknown() || ty.is_string()
}
