/*!
# Logger Site Detection

Decides whether a call is a debug-level logging call on a recognized logger.

With a resolved method signature the declaring type decides: assignable to the
well-known facade, or a custom facade exposing its own `debug`. Without one, the only
evidence is lexical: the enclosing class carries a logger-generating marker annotation
and the receiver is the conventional logger field. That fallback can only ever vouch
for the well-known facade.
*/

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, ExprKind, MethodCall};
use crate::rewrite::RuleContext;
use crate::types::{MethodSignature, TypeInfo, TypeResolver};

pub const DEBUG_METHOD: &str = "debug";
pub const FLUENT_ENTRY_METHOD: &str = "atDebug";
pub const GUARD_METHOD: &str = "isDebugEnabled";

/// Names that identify loggers and deferred-value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConventions {
    /// Qualified name of the well-known logging facade interface
    pub facade_type: String,
    /// Class annotations that generate a logger field
    pub logger_annotations: Vec<String>,
    /// Name of the generated logger field
    pub logger_field: String,
    /// Qualified names of zero-argument callable types accepted by supplier overloads
    pub supplier_types: Vec<String>,
}

impl Default for LoggerConventions {
    fn default() -> Self {
        Self {
            facade_type: "org.slf4j.Logger".to_string(),
            logger_annotations: vec!["Slf4j".to_string()],
            logger_field: "log".to_string(),
            supplier_types: vec![
                "java.util.function.Supplier".to_string(),
                "org.apache.logging.log4j.util.Supplier".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacadeKind {
    /// The well-known logging facade, or something assignable to it
    WellKnown,
    /// Some other type that exposes its own `debug` method
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerSite {
    pub kind: FacadeKind,
    /// Whether the decision came from a resolved signature rather than convention
    pub resolved: bool,
}

impl LoggerSite {
    pub fn is_well_known(&self) -> bool {
        self.kind == FacadeKind::WellKnown
    }
}

/// Recognize a debug-level logging call, by resolved type when available and by
/// naming convention otherwise.
pub fn detect_debug_site(call: &MethodCall, cx: &RuleContext<'_>) -> Option<LoggerSite> {
    if call.name != DEBUG_METHOD {
        return None;
    }

    match &call.method_type {
        Some(signature) => resolved_site(signature, cx),
        None => {
            let select = call.select.as_deref()?;
            let lexical = has_logger_annotation(cx)
                && is_conventional_logger_select(select, cx.conventions);
            lexical.then_some(LoggerSite {
                kind: FacadeKind::WellKnown,
                resolved: false,
            })
        }
    }
}

fn resolved_site(signature: &MethodSignature, cx: &RuleContext<'_>) -> Option<LoggerSite> {
    if signature.name != DEBUG_METHOD {
        return None;
    }
    let declaring = signature.declaring_type.as_deref()?;

    let kind = if is_well_known_facade(signature, cx.types, cx.conventions) {
        FacadeKind::WellKnown
    } else if declares_method(cx.types, declaring, DEBUG_METHOD) {
        FacadeKind::Custom
    } else {
        return None;
    };

    Some(LoggerSite { kind, resolved: true })
}

/// Whether the signature's declaring type is assignable to the well-known facade.
pub fn is_well_known_facade(
    signature: &MethodSignature,
    types: &dyn TypeResolver,
    conventions: &LoggerConventions,
) -> bool {
    signature
        .declaring_type
        .as_deref()
        .is_some_and(|declaring| types.is_assignable(declaring, &conventions.facade_type))
}

pub fn declares_method(types: &dyn TypeResolver, type_name: &str, method: &str) -> bool {
    !types.overloads_of(type_name, method).is_empty()
}

/// Whether the declaring type has a `debug` overload callable with `arg_count`
/// arguments that takes a supplier at exactly `supplier_positions` among the trailing
/// arguments. Every other trailing position must be a parameter that is not
/// supplier-typed, so a value left in place still binds to the same overload.
pub fn supports_supplier_arguments(
    signature: &MethodSignature,
    arg_count: usize,
    supplier_positions: &[usize],
    types: &dyn TypeResolver,
    conventions: &LoggerConventions,
) -> bool {
    let Some(declaring) = signature.declaring_type.as_deref() else {
        return false;
    };

    types
        .overloads_of(declaring, DEBUG_METHOD)
        .iter()
        .filter(|overload| overload.accepts_arity(arg_count))
        .any(|overload| {
            (1..arg_count).all(|index| {
                let wants_supplier = supplier_positions.contains(&index);
                overload
                    .parameter_at(index)
                    .is_some_and(|param| is_supplier_type(param, conventions) == wants_supplier)
            })
        })
}

/// Supplier types, and arrays of them (varargs).
pub fn is_supplier_type(ty: &TypeInfo, conventions: &LoggerConventions) -> bool {
    if let Some(elem) = ty.array_element() {
        return is_supplier_type(elem, conventions);
    }
    ty.qualified_name()
        .is_some_and(|name| conventions.supplier_types.iter().any(|supplier| supplier == name))
}

/// A receiver that can be evaluated twice without side effects: an identifier, or a
/// field access whose target is itself safe.
pub fn is_safe_select(select: &Expr) -> bool {
    match &select.kind {
        ExprKind::Identifier(_) => true,
        ExprKind::FieldAccess { target, .. } => is_safe_select(target),
        _ => false,
    }
}

/// Whether the nearest enclosing class carries a logger-generating annotation.
pub fn has_logger_annotation(cx: &RuleContext<'_>) -> bool {
    let Some(class) = cx.ancestors.nearest_class() else {
        return false;
    };

    cx.types.annotations_of(class).iter().any(|annotation| {
        let simple = annotation
            .trim_start_matches('@')
            .rsplit('.')
            .next()
            .unwrap_or_default();
        cx.conventions
            .logger_annotations
            .iter()
            .any(|marker| marker == simple)
    })
}

pub fn is_conventional_logger_select(select: &Expr, conventions: &LoggerConventions) -> bool {
    select
        .simple_name()
        .is_some_and(|name| name == conventions.logger_field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassDecl, Statement};
    use crate::rewrite::AncestorChain;
    use crate::types::{TypeTable, Unresolved};

    const SLF4J: &str = "org.slf4j.Logger";
    const LOG4J: &str = "org.apache.logging.log4j.Logger";

    fn debug_call(select: Expr, signature: Option<MethodSignature>) -> MethodCall {
        let args = vec![Expr::string("x={}"), Expr::identifier("x")];
        let mut expr = Expr::method(select, "debug", args);
        if let Some(signature) = signature {
            expr = expr.with_method_type(signature);
        }
        match expr.kind {
            ExprKind::MethodCall(call) => call,
            _ => unreachable!(),
        }
    }

    fn debug_signature(declaring: &str) -> MethodSignature {
        MethodSignature::new(
            "debug",
            Some(declaring),
            vec![TypeInfo::String, TypeInfo::named("java.lang.Object")],
        )
    }

    #[test]
    fn test_resolved_well_known_facade() {
        let types = TypeTable::new().with_supertype("ch.qos.logback.classic.Logger", SLF4J);
        let conventions = LoggerConventions::default();
        let chain = AncestorChain::new();
        let cx = RuleContext::new(&types, &chain, &conventions);

        let logback = debug_signature("ch.qos.logback.classic.Logger");
        let call = debug_call(Expr::identifier("logger"), Some(logback));
        let site = detect_debug_site(&call, &cx).unwrap();
        assert_eq!(site.kind, FacadeKind::WellKnown);
        assert!(site.resolved);
    }

    #[test]
    fn test_resolved_custom_facade() {
        let types = TypeTable::new().with_method(debug_signature(LOG4J));
        let conventions = LoggerConventions::default();
        let chain = AncestorChain::new();
        let cx = RuleContext::new(&types, &chain, &conventions);

        let call = debug_call(Expr::identifier("logger"), Some(debug_signature(LOG4J)));
        assert_eq!(
            detect_debug_site(&call, &cx).map(|site| site.kind),
            Some(FacadeKind::Custom)
        );
    }

    #[test]
    fn test_resolved_unrelated_type_is_not_a_logger() {
        let conventions = LoggerConventions::default();
        let chain = AncestorChain::new();
        let cx = RuleContext::new(&Unresolved, &chain, &conventions);

        let printer = debug_signature("com.acme.Printer");
        let call = debug_call(Expr::identifier("printer"), Some(printer));
        assert_eq!(detect_debug_site(&call, &cx), None);

        let partial = MethodSignature::new("debug", None, vec![]);
        let call = debug_call(Expr::identifier("logger"), Some(partial));
        assert_eq!(detect_debug_site(&call, &cx), None);
    }

    #[test]
    fn test_lexical_fallback_requires_annotation_and_field_name() {
        let conventions = LoggerConventions::default();
        let annotated = ClassDecl::new("Service").annotated("lombok.extern.slf4j.Slf4j");
        let plain = ClassDecl::new("Service");

        let mut chain = AncestorChain::new();
        chain.push_class(&annotated);
        let cx = RuleContext::new(&Unresolved, &chain, &conventions);

        let site = detect_debug_site(&debug_call(Expr::identifier("log"), None), &cx).unwrap();
        assert_eq!(site, LoggerSite { kind: FacadeKind::WellKnown, resolved: false });
        let this_log = Expr::field(Expr::identifier("this"), "log");
        assert!(detect_debug_site(&debug_call(this_log, None), &cx).is_some());
        assert!(detect_debug_site(&debug_call(Expr::identifier("logger"), None), &cx).is_none());

        let mut chain = AncestorChain::new();
        chain.push_class(&plain);
        let cx = RuleContext::new(&Unresolved, &chain, &conventions);
        assert!(detect_debug_site(&debug_call(Expr::identifier("log"), None), &cx).is_none());
    }

    #[test]
    fn test_non_debug_calls_are_ignored() {
        let conventions = LoggerConventions::default();
        let annotated = ClassDecl::new("Service").annotated("Slf4j");
        let mut chain = AncestorChain::new();
        chain.push_class(&annotated);
        let cx = RuleContext::new(&Unresolved, &chain, &conventions);

        let info = Expr::method(Expr::identifier("log"), "info", vec![Expr::string("x")]);
        let info = match info.kind {
            ExprKind::MethodCall(call) => call,
            _ => unreachable!(),
        };
        assert!(detect_debug_site(&info, &cx).is_none());
    }

    #[test]
    fn test_supplier_overloads() {
        let conventions = LoggerConventions::default();
        let supplier = TypeInfo::named("org.apache.logging.log4j.util.Supplier");
        let types = TypeTable::new()
            .with_method(debug_signature(LOG4J))
            .with_method(MethodSignature::new(
                "debug",
                Some(LOG4J),
                vec![TypeInfo::String, TypeInfo::array_of(supplier)],
            ));
        let signature = debug_signature(LOG4J);

        assert!(supports_supplier_arguments(&signature, 2, &[1], &types, &conventions));
        assert!(supports_supplier_arguments(&signature, 4, &[1, 2, 3], &types, &conventions));

        let plain = TypeTable::new().with_method(debug_signature("com.acme.Logger"));
        let signature = debug_signature("com.acme.Logger");
        assert!(!supports_supplier_arguments(&signature, 2, &[1], &plain, &conventions));
    }

    #[test]
    fn test_unwrapped_values_must_fit_the_same_overload() {
        let conventions = LoggerConventions::default();
        let object_varargs = MethodSignature::new(
            "debug",
            Some(LOG4J),
            vec![TypeInfo::String, TypeInfo::array_of(TypeInfo::named("java.lang.Object"))],
        );
        let supplier_varargs = MethodSignature::new(
            "debug",
            Some(LOG4J),
            vec![
                TypeInfo::String,
                TypeInfo::array_of(TypeInfo::named("org.apache.logging.log4j.util.Supplier")),
            ],
        );
        let types = TypeTable::new()
            .with_method(object_varargs.clone())
            .with_method(supplier_varargs);

        // debug("{} {}", compute(), 42): wrapping only the call leaves 42 in a Supplier slot
        assert!(!supports_supplier_arguments(&object_varargs, 3, &[1], &types, &conventions));
        assert!(supports_supplier_arguments(&object_varargs, 3, &[1, 2], &types, &conventions));

        // A fixed overload taking a plain value first and a supplier second.
        let mixed = MethodSignature::new(
            "debug",
            Some("com.acme.AuditLog"),
            vec![
                TypeInfo::String,
                TypeInfo::named("java.lang.Object"),
                TypeInfo::named("java.util.function.Supplier"),
            ],
        );
        let types = TypeTable::new().with_method(mixed.clone());
        assert!(supports_supplier_arguments(&mixed, 3, &[2], &types, &conventions));
        assert!(!supports_supplier_arguments(&mixed, 3, &[1], &types, &conventions));
        assert!(!supports_supplier_arguments(&mixed, 3, &[1, 2], &types, &conventions));
    }

    #[test]
    fn test_well_known_facade_by_declaring_type() {
        let conventions = LoggerConventions::default();
        let logback = "ch.qos.logback.classic.Logger";
        let types = TypeTable::new().with_supertype(logback, SLF4J);

        assert!(is_well_known_facade(&debug_signature(SLF4J), &types, &conventions));
        assert!(is_well_known_facade(&debug_signature(logback), &types, &conventions));
        assert!(!is_well_known_facade(&debug_signature(LOG4J), &types, &conventions));

        let undeclared = MethodSignature::new("debug", None, vec![]);
        assert!(!is_well_known_facade(&undeclared, &types, &conventions));

        let renamed = LoggerConventions {
            facade_type: LOG4J.to_string(),
            ..LoggerConventions::default()
        };
        assert!(is_well_known_facade(&debug_signature(LOG4J), &types, &renamed));
        assert!(!is_well_known_facade(&debug_signature(SLF4J), &types, &renamed));
    }

    #[test]
    fn test_supplier_type_recognition() {
        let conventions = LoggerConventions::default();
        assert!(is_supplier_type(&TypeInfo::named("java.util.function.Supplier"), &conventions));
        assert!(is_supplier_type(
            &TypeInfo::array_of(TypeInfo::named("java.util.function.Supplier")),
            &conventions
        ));
        assert!(!is_supplier_type(&TypeInfo::named("java.lang.Object"), &conventions));
        assert!(!is_supplier_type(&TypeInfo::Unknown, &conventions));
    }

    #[test]
    fn test_safe_select() {
        assert!(is_safe_select(&Expr::identifier("log")));
        assert!(is_safe_select(&Expr::field(Expr::identifier("this"), "log")));
        assert!(!is_safe_select(&Expr::method(Expr::identifier("factory"), "getLogger", vec![])));
        let via_call = Expr::field(Expr::method(Expr::identifier("a"), "b", vec![]), "log");
        assert!(!is_safe_select(&via_call));
    }

    #[test]
    fn test_annotation_lookup_uses_nearest_class() {
        let conventions = LoggerConventions::default();
        let outer = ClassDecl::new("Outer").annotated("Slf4j");
        let inner = ClassDecl::new("Inner");
        let stmt = Statement::expression(Expr::identifier("x"));

        let mut chain = AncestorChain::new();
        chain.push_class(&outer);
        chain.push_class(&inner);
        chain.push_statement(&stmt);
        let cx = RuleContext::new(&Unresolved, &chain, &conventions);
        assert!(!has_logger_annotation(&cx));
    }
}
