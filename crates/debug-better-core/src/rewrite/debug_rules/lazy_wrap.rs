/*!
# Lazy-Wrap Rule

Wraps expensive trailing arguments of a `debug` call in `() -> expr` so they are only
evaluated when the logger actually emits the message.

Two modes:
- **Verified**: the call resolves to a custom facade (not the well-known one, which
  guard insertion serves better) whose declaring type has one `debug` overload that
  accepts the rewritten call as a whole: a supplier at every wrapped or already
  deferred position and a plain parameter everywhere else. Triviality is judged by
  resolved type.
- **Aggressive**: any `debug` call with a message and at least one value, no type
  information consulted. Triviality is judged by shape.
*/

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, ExprKind, MethodCall};
use crate::classify::{classify, is_already_deferred, Classification, ClassifierMode};
use crate::fragments::supplier_lambda;
use crate::logger::{
    detect_debug_site, supports_supplier_arguments, FacadeKind, DEBUG_METHOD,
};
use crate::rewrite::rules::RewriteRule;
use crate::rewrite::{RuleContext, RuleResult};
use crate::{Result, RewriteConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LazyWrapMode {
    /// Only on resolved custom facades with supplier overloads
    #[default]
    Verified,
    /// On every `debug` call, from syntax alone
    Aggressive,
}

impl LazyWrapMode {
    pub fn classifier_mode(&self) -> ClassifierMode {
        match self {
            LazyWrapMode::Verified => ClassifierMode::Semantic,
            LazyWrapMode::Aggressive => ClassifierMode::Structural,
        }
    }
}

/// Defers non-trivial `debug` arguments behind zero-argument lambdas
#[derive(Debug, Clone, Default)]
pub struct LazyWrapRule {
    mode: LazyWrapMode,
}

impl LazyWrapRule {
    pub fn new(mode: LazyWrapMode) -> Self {
        Self { mode }
    }

    pub fn aggressive() -> Self {
        Self::new(LazyWrapMode::Aggressive)
    }

    pub fn verified() -> Self {
        Self::new(LazyWrapMode::Verified)
    }

    pub fn from_config(config: &RewriteConfig) -> Self {
        Self::new(config.lazy_wrap)
    }

    pub fn mode(&self) -> LazyWrapMode {
        self.mode
    }

    /// Indices of trailing arguments that need deferring. The message is never a
    /// candidate.
    fn positions_to_wrap(&self, call: &MethodCall, cx: &RuleContext<'_>) -> Vec<usize> {
        let mode = self.mode.classifier_mode();
        call.args
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, arg)| classify(arg, mode, cx.types) == Classification::NonTrivial)
            .map(|(index, _)| index)
            .collect()
    }

    fn accepts_suppliers(
        &self,
        call: &MethodCall,
        positions: &[usize],
        cx: &RuleContext<'_>,
    ) -> bool {
        match self.mode {
            LazyWrapMode::Aggressive => true,
            LazyWrapMode::Verified => {
                let custom = detect_debug_site(call, cx)
                    .is_some_and(|site| site.kind == FacadeKind::Custom);
                let Some(signature) = call.method_type.as_ref().filter(|_| custom) else {
                    return false;
                };

                let mut supplier_positions = positions.to_vec();
                supplier_positions.extend(
                    call.args
                        .iter()
                        .enumerate()
                        .skip(1)
                        .filter(|(_, arg)| is_already_deferred(arg))
                        .map(|(index, _)| index),
                );
                supports_supplier_arguments(
                    signature,
                    call.args.len(),
                    &supplier_positions,
                    cx.types,
                    cx.conventions,
                )
            }
        }
    }
}

impl RewriteRule for LazyWrapRule {
    fn name(&self) -> &'static str {
        "LazyWrap"
    }

    fn description(&self) -> &'static str {
        match self.mode {
            LazyWrapMode::Verified => {
                "Wraps non-trivial debug() arguments in suppliers for loggers with \
                 supplier overloads"
            }
            LazyWrapMode::Aggressive => {
                "Wraps non-trivial debug() arguments in () -> expr to avoid eager evaluation"
            }
        }
    }

    fn display_name(&self) -> &'static str {
        "Lazify debug log arguments with Supplier"
    }

    fn estimated_effort_per_occurrence(&self) -> Duration {
        Duration::from_secs(2 * 60)
    }

    fn rewrite_expr(&self, expr: &Expr, cx: &RuleContext<'_>) -> Result<RuleResult<Expr>> {
        let Some(call) = expr.as_method_call() else {
            return Ok(RuleResult::NoChange);
        };
        if call.name != DEBUG_METHOD || call.args.len() < 2 {
            return Ok(RuleResult::NoChange);
        }

        let positions = self.positions_to_wrap(call, cx);
        if positions.is_empty() || !self.accepts_suppliers(call, &positions, cx) {
            return Ok(RuleResult::NoChange);
        }

        let args = call
            .args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                if positions.contains(&index) {
                    supplier_lambda(arg)
                } else {
                    Ok(arg.clone())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rewritten = call.clone();
        rewritten.args = args;
        Ok(RuleResult::Replace(Expr {
            id: expr.id,
            prefix: expr.prefix.clone(),
            kind: ExprKind::MethodCall(rewritten),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, ToSource};
    use crate::logger::LoggerConventions;
    use crate::rewrite::debug_rules::fixtures::{LOG4J, LOG4J_SUPPLIER, SLF4J};
    use crate::rewrite::AncestorChain;
    use crate::types::{
        MethodSignature, PrimitiveKind, TypeInfo, TypeResolver, TypeTable, Unresolved,
    };
    use pretty_assertions::assert_eq;

    fn apply(rule: &LazyWrapRule, expr: &Expr, types: &dyn TypeResolver) -> RuleResult<Expr> {
        let conventions = LoggerConventions::default();
        let chain = AncestorChain::new();
        let cx = RuleContext::new(types, &chain, &conventions);
        rule.rewrite_expr(expr, &cx).unwrap()
    }

    fn rendered(result: RuleResult<Expr>) -> String {
        result.replacement().expect("expected a rewrite").to_source()
    }

    fn debug_signature(declaring: &str) -> MethodSignature {
        MethodSignature::new(
            "debug",
            Some(declaring),
            vec![TypeInfo::String, TypeInfo::array_of(TypeInfo::named("java.lang.Object"))],
        )
    }

    /// Log4j-style facade with `debug(String, Supplier...)`.
    fn log4j_table() -> TypeTable {
        TypeTable::new()
            .with_method(debug_signature(LOG4J))
            .with_method(MethodSignature::new(
                "debug",
                Some(LOG4J),
                vec![TypeInfo::String, TypeInfo::array_of(TypeInfo::named(LOG4J_SUPPLIER))],
            ))
    }

    #[test]
    fn test_aggressive_wraps_method_call_argument() {
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![Expr::string("x={}"), Expr::method(Expr::identifier("foo"), "getBar", vec![])],
        );
        let result = apply(&LazyWrapRule::aggressive(), &call, &Unresolved);
        assert_eq!(rendered(result), "logger.debug(\"x={}\", () -> foo.getBar())");
    }

    #[test]
    fn test_literals_are_left_alone_in_both_modes() {
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![Expr::string("val={}"), Expr::integer(42)],
        )
        .with_method_type(debug_signature(LOG4J));

        assert_eq!(apply(&LazyWrapRule::aggressive(), &call, &Unresolved), RuleResult::NoChange);
        assert_eq!(apply(&LazyWrapRule::verified(), &call, &log4j_table()), RuleResult::NoChange);
    }

    #[test]
    fn test_aggressive_treats_field_access_as_trivial() {
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![Expr::string("id={}"), Expr::field(Expr::identifier("user"), "id")],
        );
        assert_eq!(apply(&LazyWrapRule::aggressive(), &call, &Unresolved), RuleResult::NoChange);
    }

    #[test]
    fn test_aggressive_wraps_only_what_is_needed() {
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![
                Expr::call(None, "buildMessage", vec![]),
                Expr::identifier("id"),
                Expr::binary(BinaryOp::Add, Expr::string("n="), Expr::identifier("n")),
                Expr::lambda(vec![], Expr::call(None, "expensive", vec![])),
            ],
        );
        let result = apply(&LazyWrapRule::aggressive(), &call, &Unresolved);
        assert_eq!(
            rendered(result),
            "logger.debug(buildMessage(), id, () -> \"n=\" + n, () -> expensive())"
        );
    }

    #[test]
    fn test_too_few_arguments_or_other_methods() {
        let rule = LazyWrapRule::aggressive();
        let message_only = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![Expr::call(None, "msg", vec![])],
        );
        assert_eq!(apply(&rule, &message_only, &Unresolved), RuleResult::NoChange);

        let info = Expr::method(
            Expr::identifier("logger"),
            "info",
            vec![Expr::string("x={}"), Expr::call(None, "compute", vec![])],
        );
        assert_eq!(apply(&rule, &info, &Unresolved), RuleResult::NoChange);
    }

    #[test]
    fn test_verified_wraps_by_resolved_type() {
        let types = log4j_table()
            .with_type(1, TypeInfo::named("com.acme.Order"))
            .with_type(2, TypeInfo::named("com.acme.Cart"));
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![
                Expr::string("order={} cart={} who={}"),
                Expr::identifier("order").with_id(1),
                Expr::identifier("cart").with_id(2),
                Expr::identifier("who"),
            ],
        )
        .with_method_type(debug_signature(LOG4J));

        let result = apply(&LazyWrapRule::verified(), &call, &types);
        assert_eq!(
            rendered(result),
            "logger.debug(\"order={} cart={} who={}\", () -> order, () -> cart, () -> who)"
        );
    }

    #[test]
    fn test_verified_declines_when_values_would_share_a_supplier_slot() {
        let types = log4j_table()
            .with_type(1, TypeInfo::Primitive(PrimitiveKind::Int))
            .with_type(2, TypeInfo::named("java.lang.Long"));
        let mixed = |value: Expr| {
            Expr::method(
                Expr::identifier("logger"),
                "debug",
                vec![Expr::string("{} {}"), Expr::call(None, "compute", vec![]), value],
            )
            .with_method_type(debug_signature(LOG4J))
        };

        let rule = LazyWrapRule::verified();
        assert_eq!(apply(&rule, &mixed(Expr::integer(42)), &types), RuleResult::NoChange);
        let count = Expr::identifier("count").with_id(1);
        assert_eq!(apply(&rule, &mixed(count), &types), RuleResult::NoChange);
        let total = Expr::identifier("total").with_id(2);
        assert_eq!(apply(&rule, &mixed(total), &types), RuleResult::NoChange);

        // Aggressive mode does not consult overloads at all.
        let result = apply(&LazyWrapRule::aggressive(), &mixed(Expr::integer(42)), &types);
        assert_eq!(rendered(result), "logger.debug(\"{} {}\", () -> compute(), 42)");
    }

    #[test]
    fn test_verified_matches_positional_overload() {
        let audit = "com.acme.AuditLog";
        let value_then_supplier = MethodSignature::new(
            "debug",
            Some(audit),
            vec![
                TypeInfo::String,
                TypeInfo::named("java.lang.Object"),
                TypeInfo::named("java.util.function.Supplier"),
            ],
        );
        let types = TypeTable::new().with_method(value_then_supplier.clone());

        let call = Expr::method(
            Expr::identifier("audit"),
            "debug",
            vec![Expr::string("{} {}"), Expr::integer(7), Expr::call(None, "compute", vec![])],
        )
        .with_method_type(value_then_supplier.clone());
        let result = apply(&LazyWrapRule::verified(), &call, &types);
        assert_eq!(rendered(result), "audit.debug(\"{} {}\", 7, () -> compute())");

        let swapped = Expr::method(
            Expr::identifier("audit"),
            "debug",
            vec![Expr::string("{} {}"), Expr::call(None, "compute", vec![]), Expr::integer(7)],
        )
        .with_method_type(value_then_supplier);
        assert_eq!(apply(&LazyWrapRule::verified(), &swapped, &types), RuleResult::NoChange);
    }

    #[test]
    fn test_verified_counts_existing_lambdas_as_suppliers() {
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![
                Expr::string("{} {}"),
                Expr::lambda(vec![], Expr::call(None, "cached", vec![])),
                Expr::call(None, "compute", vec![]),
            ],
        )
        .with_method_type(debug_signature(LOG4J));

        let result = apply(&LazyWrapRule::verified(), &call, &log4j_table());
        assert_eq!(rendered(result), "logger.debug(\"{} {}\", () -> cached(), () -> compute())");
    }

    #[test]
    fn test_verified_declines_well_known_facade() {
        let types = TypeTable::new()
            .with_method(debug_signature(SLF4J))
            .with_method(MethodSignature::new(
                "debug",
                Some(SLF4J),
                vec![TypeInfo::String, TypeInfo::named("java.util.function.Supplier")],
            ));
        let call = Expr::method(
            Expr::identifier("log"),
            "debug",
            vec![Expr::string("x={}"), Expr::call(None, "compute", vec![])],
        )
        .with_method_type(debug_signature(SLF4J));

        assert_eq!(apply(&LazyWrapRule::verified(), &call, &types), RuleResult::NoChange);
    }

    #[test]
    fn test_verified_needs_signature_and_supplier_overload() {
        let args = vec![Expr::string("x={}"), Expr::call(None, "compute", vec![])];
        let unresolved = Expr::method(Expr::identifier("logger"), "debug", args.clone());
        let rule = LazyWrapRule::verified();
        assert_eq!(apply(&rule, &unresolved, &log4j_table()), RuleResult::NoChange);

        let plain = TypeTable::new().with_method(debug_signature("com.acme.Logger"));
        let call = Expr::method(Expr::identifier("logger"), "debug", args)
            .with_method_type(debug_signature("com.acme.Logger"));
        assert_eq!(apply(&rule, &call, &plain), RuleResult::NoChange);
    }

    #[test]
    fn test_rewriting_twice_is_a_no_op() {
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![
                Expr::string("a={} b={}"),
                Expr::call(None, "a", vec![]),
                Expr::new_object("StringBuilder", vec![]),
            ],
        );
        let rule = LazyWrapRule::aggressive();
        let once = apply(&rule, &call, &Unresolved).replacement().unwrap();
        assert_eq!(apply(&rule, &once, &Unresolved), RuleResult::NoChange);

        let types = log4j_table();
        let call = call.with_method_type(debug_signature(LOG4J));
        let rule = LazyWrapRule::verified();
        let once = apply(&rule, &call, &types).replacement().unwrap();
        assert_eq!(apply(&rule, &once, &types), RuleResult::NoChange);
    }

    #[test]
    fn test_rewrite_keeps_node_identity_and_prefix() {
        let call = Expr::method(
            Expr::identifier("logger"),
            "debug",
            vec![
                Expr::string("x={}"),
                Expr::call(None, "compute", vec![]).with_prefix("\n            "),
            ],
        )
        .with_prefix(" ")
        .with_id(40);

        let rewritten = apply(&LazyWrapRule::aggressive(), &call, &Unresolved)
            .replacement()
            .unwrap();
        assert_eq!(rewritten.id, call.id);
        assert_eq!(rewritten.to_source(), " logger.debug(\"x={}\",\n            () -> compute())");
    }

    #[test]
    fn test_from_config() {
        let config = RewriteConfig::default().with_lazy_wrap(LazyWrapMode::Aggressive);
        assert_eq!(LazyWrapRule::from_config(&config).mode(), LazyWrapMode::Aggressive);
        assert_eq!(LazyWrapRule::default().mode(), LazyWrapMode::Verified);
    }
}
