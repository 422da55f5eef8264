/*!
# Expression Classifier

Decides whether a logging argument is cheap enough to evaluate eagerly, or is already
deferred. Two modes exist because the rules differ in how much semantic information
they hold; a rule picks the mode matching what it actually has.
*/

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, ExprKind};
use crate::types::TypeResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierMode {
    /// Syntax shape only
    Structural,
    /// Resolved type of the argument
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Already a lambda or method reference; never wrapped again
    Deferred,
    Trivial,
    NonTrivial,
}

/// Lambdas and bound method references are left alone by every wrapping rule.
pub fn is_already_deferred(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Lambda(_) | ExprKind::MemberReference { .. }
    )
}

/// Identifiers, field accesses and literals are trivial; every other shape
/// (calls, construction, concatenation, casts, ternaries) is not.
pub fn is_trivial_structural(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Identifier(_) | ExprKind::FieldAccess { .. } | ExprKind::Literal(_) => true,
        ExprKind::MethodCall(_)
        | ExprKind::New { .. }
        | ExprKind::Cast { .. }
        | ExprKind::Binary { .. }
        | ExprKind::Ternary { .. }
        | ExprKind::Lambda(_)
        | ExprKind::MemberReference { .. }
        | ExprKind::Other(_) => false,
    }
}

/// Literals, and anything resolved to a primitive, boxed primitive or string.
/// Shape is ignored: an identifier of unknown or computed type is not trivial.
pub fn is_trivial_semantic(expr: &Expr, types: &dyn TypeResolver) -> bool {
    if matches!(expr.kind, ExprKind::Literal(_)) {
        return true;
    }

    let ty = types.resolve_type(expr);
    if ty.is_unknown() {
        return false;
    }
    ty.is_primitive() || ty.is_string() || ty.is_boxed_primitive()
}

pub fn is_trivial(expr: &Expr, mode: ClassifierMode, types: &dyn TypeResolver) -> bool {
    match mode {
        ClassifierMode::Structural => is_trivial_structural(expr),
        ClassifierMode::Semantic => is_trivial_semantic(expr, types),
    }
}

pub fn classify(expr: &Expr, mode: ClassifierMode, types: &dyn TypeResolver) -> Classification {
    if is_already_deferred(expr) {
        Classification::Deferred
    } else if is_trivial(expr, mode, types) {
        Classification::Trivial
    } else {
        Classification::NonTrivial
    }
}
