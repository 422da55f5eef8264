// Source rendering of syntax tree nodes.
// Reproduces exactly the prefixes recorded on the nodes, so a rewritten node reads the
// way the host will print it. Used for diagnostics and assertions, not for formatting.

use super::*;

/// Trait for types that can render their source code representation
pub trait ToSource {
    fn to_source(&self) -> String;
}

impl ToSource for Literal {
    fn to_source(&self) -> String {
        match self {
            Literal::Integer(n) => n.to_string(),
            Literal::Float(f) => format!("{f:?}"),
            Literal::Char(c) => format!("'{}'", c.escape_default()),
            Literal::String(s) => format!("\"{}\"", escape_string(s)),
            Literal::Boolean(b) => b.to_string(),
            Literal::Null => "null".to_string(),
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn join_args(args: &[Expr]) -> String {
    args.iter()
        .map(|arg| arg.to_source())
        .collect::<Vec<_>>()
        .join(",")
}

impl ToSource for Expr {
    fn to_source(&self) -> String {
        format!("{}{}", self.prefix.as_str(), self.kind.to_source())
    }
}

impl ToSource for ExprKind {
    fn to_source(&self) -> String {
        match self {
            ExprKind::Identifier(name) => name.clone(),
            ExprKind::FieldAccess { target, name } => format!("{}.{}", target.to_source(), name),
            ExprKind::Literal(value) => value.to_source(),
            ExprKind::MethodCall(call) => call.to_source(),
            ExprKind::New { type_name, args } => format!("new {}({})", type_name, join_args(args)),
            ExprKind::Cast { type_name, expr } => format!("({}){}", type_name, expr.to_source()),
            ExprKind::Binary { op, left, right } => {
                format!("{} {}{}", left.to_source(), op.symbol(), right.to_source())
            }
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => format!(
                "{} ?{} :{}",
                condition.to_source(),
                then_expr.to_source(),
                else_expr.to_source()
            ),
            ExprKind::Lambda(lambda) => lambda.to_source(),
            ExprKind::MemberReference { target, method } => {
                format!("{}::{}", target.to_source(), method)
            }
            ExprKind::Other(text) => text.clone(),
        }
    }
}

impl ToSource for MethodCall {
    fn to_source(&self) -> String {
        let mut result = String::new();
        if let Some(select) = &self.select {
            result.push_str(&select.to_source());
            result.push('.');
        }
        result.push_str(&self.name);
        result.push('(');
        result.push_str(&join_args(&self.args));
        result.push(')');
        result
    }
}

impl ToSource for Lambda {
    fn to_source(&self) -> String {
        let params = match self.params.as_slice() {
            [single] => single.clone(),
            params => format!("({})", params.join(", ")),
        };
        let body = match &self.body {
            LambdaBody::Expr(expr) => expr.to_source(),
            LambdaBody::Block(block) => format!(" {}", block.to_source()),
        };
        format!("{params} ->{body}")
    }
}

impl ToSource for Block {
    fn to_source(&self) -> String {
        let mut result = String::from("{");
        for stmt in &self.statements {
            result.push_str(&stmt.to_source());
        }
        result.push_str(self.end.as_str());
        result.push('}');
        result
    }
}

impl ToSource for Statement {
    fn to_source(&self) -> String {
        let body = match &self.kind {
            StatementKind::Expression(expr) => format!("{};", expr.to_source()),
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut result =
                    format!("if ({}){}", condition.to_source(), then_branch.to_source());
                if let Some(else_stmt) = else_branch {
                    result.push_str(" else");
                    result.push_str(&else_stmt.to_source());
                }
                result
            }
            StatementKind::Block(block) => block.to_source(),
            StatementKind::LocalVariable {
                type_name,
                name,
                initializer,
            } => match initializer {
                Some(init) => format!("{} {} ={};", type_name, name, init.to_source()),
                None => format!("{type_name} {name};"),
            },
            StatementKind::Return(value) => match value {
                Some(v) => format!("return{};", v.to_source()),
                None => "return;".to_string(),
            },
            StatementKind::Compound(clauses) => {
                clauses.iter().map(|clause| clause.to_source()).collect()
            }
            StatementKind::Other(text) => text.clone(),
        };
        format!("{}{}", self.prefix.as_str(), body)
    }
}

impl ToSource for Clause {
    fn to_source(&self) -> String {
        let mut result = format!("{}{}", self.prefix.as_str(), self.keyword);
        if let Some(parts) = &self.header {
            let parts = parts
                .iter()
                .map(|part| part.to_source())
                .collect::<Vec<_>>()
                .join(&self.separator);
            result.push_str(&format!(" ({parts})"));
        }
        match &self.body {
            Some(body) => result.push_str(&body.to_source()),
            None => result.push(';'),
        }
        result
    }
}

impl ToSource for ClassDecl {
    fn to_source(&self) -> String {
        let mut result = String::new();
        for annotation in &self.annotations {
            result.push_str(&format!("@{annotation}\n"));
        }
        result.push_str(&format!("class {} {{\n", self.name));
        for member in &self.members {
            match member {
                ClassMember::Field(field) => {
                    match &field.initializer {
                        Some(init) => result.push_str(&format!(
                            "    {} {} ={};\n",
                            field.type_name,
                            field.name,
                            init.to_source()
                        )),
                        None => {
                            result.push_str(&format!("    {} {};\n", field.type_name, field.name))
                        }
                    }
                }
                ClassMember::Method(method) => match &method.body {
                    Some(body) => result.push_str(&format!(
                        "    void {}() {}\n",
                        method.name,
                        body.to_source()
                    )),
                    None => result.push_str(&format!("    void {}();\n", method.name)),
                },
                ClassMember::Class(nested) => {
                    for line in nested.to_source().lines() {
                        result.push_str("    ");
                        result.push_str(line);
                        result.push('\n');
                    }
                }
            }
        }
        result.push_str("}\n");
        result
    }
}

impl ToSource for CompilationUnit {
    fn to_source(&self) -> String {
        self.classes
            .iter()
            .map(|class| class.to_source())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
