/*!
# Code Fragment Builder

Typed constructors for the replacement nodes the rules emit. Each builder takes the
node being replaced and returns a new node carrying that node's leading whitespace, so
the host can substitute it in place.
*/

use crate::ast::{Block, Expr, Space, Statement};
use crate::classify::is_already_deferred;
use crate::logger::{FLUENT_ENTRY_METHOD, GUARD_METHOD};
use crate::{RewriteError, Result};

const SET_MESSAGE_METHOD: &str = "setMessage";
const ADD_ARGUMENT_METHOD: &str = "addArgument";
const LOG_METHOD: &str = "log";

/// One level of statement indentation inside a generated guard.
const INDENT: &str = "    ";

/// `() -> arg`, taking over the argument's prefix.
pub fn supplier_lambda(arg: &Expr) -> Result<Expr> {
    if is_already_deferred(arg) {
        return Err(RewriteError::fragment(
            "supplier lambda",
            "argument is already deferred",
        ));
    }

    let body = arg.clone().with_prefix(Space::single());
    Ok(Expr::lambda(Vec::new(), body).with_prefix(arg.prefix.clone()))
}

/// `select.debug(message, a1, ..., aN)` becomes
/// `select.atDebug().setMessage(message).addArgument(a1)...addArgument(aN).log()`.
pub fn fluent_chain(debug_call: &Expr) -> Result<Expr> {
    let call = debug_call
        .as_method_call()
        .ok_or_else(|| RewriteError::fragment("fluent chain", "node is not a method call"))?;
    let select = call
        .select
        .as_deref()
        .ok_or_else(|| RewriteError::fragment("fluent chain", "call has no receiver"))?;
    let (message, arguments) = call
        .args
        .split_first()
        .ok_or_else(|| RewriteError::fragment("fluent chain", "call has no message argument"))?;

    let entry = Expr::method(select.clone(), FLUENT_ENTRY_METHOD, Vec::new());
    let mut chain = Expr::method(entry, SET_MESSAGE_METHOD, vec![unprefixed(message)]);
    for argument in arguments {
        chain = Expr::method(chain, ADD_ARGUMENT_METHOD, vec![unprefixed(argument)]);
    }

    Ok(Expr::method(chain, LOG_METHOD, Vec::new()).with_prefix(debug_call.prefix.clone()))
}

/// `if (select.isDebugEnabled()) { stmt }`, with the statement moved one level in.
pub fn debug_guard(stmt: &Statement, select: &Expr) -> Result<Statement> {
    if stmt.as_call_statement().is_none() {
        return Err(RewriteError::fragment(
            "debug guard",
            "only a bare call statement can be guarded",
        ));
    }

    let indent = stmt.prefix.line_indent();
    let guarded = stmt.clone().with_prefix(format!("\n{indent}{INDENT}"));
    let body = Block::new(vec![guarded]).with_end(format!("\n{indent}"));
    let condition = Expr::method(unprefixed(select), GUARD_METHOD, Vec::new());

    Ok(Statement::if_then(condition, Statement::block(body).with_prefix(Space::single()))
        .with_prefix(stmt.prefix.clone()))
}

fn unprefixed(expr: &Expr) -> Expr {
    expr.clone().with_prefix(Space::EMPTY)
}
