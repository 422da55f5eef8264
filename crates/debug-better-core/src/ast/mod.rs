// Syntax tree consumed and produced by the debug-logging rewrite rules.
// Hosts lower their own parser output into this tree; rules never mutate a node in
// place, a rewrite always builds a new node and hands it back to the walker.

pub mod source_gen;
pub use source_gen::ToSource;

use serde::{Deserialize, Serialize};

use crate::types::MethodSignature;

/// Identity of a node the host has attributed with type information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Whitespace (and comments) preceding a node in the original source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Space(pub String);

impl Space {
    pub const EMPTY: Space = Space(String::new());

    pub fn new(text: impl Into<String>) -> Self {
        Space(text.into())
    }

    pub fn single() -> Self {
        Space(" ".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indentation of the line this prefix ends on.
    pub fn line_indent(&self) -> &str {
        match self.0.rfind('\n') {
            Some(pos) => &self.0[pos + 1..],
            None => "",
        }
    }
}

impl From<&str> for Space {
    fn from(text: &str) -> Self {
        Space(text.to_string())
    }
}

impl From<String> for Space {
    fn from(text: String) -> Self {
        Space(text)
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Char(char),
    String(String),
    Boolean(bool),
    Null,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A method invocation: `select.name(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Receiver expression, absent for unqualified calls
    pub select: Option<Box<Expr>>,
    pub name: String,
    pub args: Vec<Expr>,
    /// Resolved target method, absent when semantic analysis failed
    pub method_type: Option<MethodSignature>,
}

/// Anonymous callable: `(params) -> body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub params: Vec<String>,
    pub body: LambdaBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    // Values
    Identifier(String),
    FieldAccess {
        target: Box<Expr>,
        name: String,
    },
    Literal(Literal),

    // Computations
    MethodCall(MethodCall),
    New {
        type_name: String,
        args: Vec<Expr>,
    },
    Cast {
        type_name: String,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    // Deferred values
    Lambda(Lambda),
    /// Bound method reference: `target::method`
    MemberReference {
        target: Box<Expr>,
        method: String,
    },

    /// Anything the host does not model, kept as opaque source text
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub id: Option<NodeId>,
    pub prefix: Space,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            id: None,
            prefix: Space::EMPTY,
            kind,
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Identifier(name.into()))
    }

    pub fn field(target: Expr, name: impl Into<String>) -> Self {
        Self::new(ExprKind::FieldAccess {
            target: Box::new(target),
            name: name.into(),
        })
    }

    pub fn literal(value: Literal) -> Self {
        Self::new(ExprKind::Literal(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::literal(Literal::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::literal(Literal::Integer(value))
    }

    pub fn null() -> Self {
        Self::literal(Literal::Null)
    }

    /// Build a call. Arguments after the first that carry no prefix get a single space,
    /// which is how a host lowering `a, b` would have recorded them.
    pub fn call(select: Option<Expr>, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::MethodCall(MethodCall {
            select: select.map(Box::new),
            name: name.into(),
            args: space_trailing(args),
            method_type: None,
        }))
    }

    /// `select.name(args)`
    pub fn method(select: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::call(Some(select), name, args)
    }

    pub fn new_object(type_name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::New {
            type_name: type_name.into(),
            args: space_trailing(args),
        })
    }

    pub fn cast(type_name: impl Into<String>, expr: Expr) -> Self {
        Self::new(ExprKind::Cast {
            type_name: type_name.into(),
            expr: Box::new(expr),
        })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right.or_prefix(" ")),
        })
    }

    pub fn ternary(condition: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Self::new(ExprKind::Ternary {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr.or_prefix(" ")),
            else_expr: Box::new(else_expr.or_prefix(" ")),
        })
    }

    pub fn lambda(params: Vec<String>, body: Expr) -> Self {
        Self::new(ExprKind::Lambda(Lambda {
            params,
            body: LambdaBody::Expr(Box::new(body.or_prefix(" "))),
        }))
    }

    pub fn lambda_block(params: Vec<String>, body: Block) -> Self {
        Self::new(ExprKind::Lambda(Lambda {
            params,
            body: LambdaBody::Block(body),
        }))
    }

    pub fn member_reference(target: Expr, method: impl Into<String>) -> Self {
        Self::new(ExprKind::MemberReference {
            target: Box::new(target),
            method: method.into(),
        })
    }

    pub fn other(text: impl Into<String>) -> Self {
        Self::new(ExprKind::Other(text.into()))
    }

    pub fn with_prefix(mut self, prefix: impl Into<Space>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(NodeId(id));
        self
    }

    /// Attach a resolved signature. No effect on anything but a method call.
    pub fn with_method_type(mut self, signature: MethodSignature) -> Self {
        if let ExprKind::MethodCall(call) = &mut self.kind {
            call.method_type = Some(signature);
        }
        self
    }

    fn or_prefix(self, prefix: &str) -> Self {
        if self.prefix.is_empty() {
            self.with_prefix(prefix)
        } else {
            self
        }
    }

    pub fn as_method_call(&self) -> Option<&MethodCall> {
        match &self.kind {
            ExprKind::MethodCall(call) => Some(call),
            _ => None,
        }
    }

    /// Name of a bare identifier or the last segment of a field access.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            ExprKind::FieldAccess { name, .. } => Some(name),
            _ => None,
        }
    }
}

fn space_trailing(args: Vec<Expr>) -> Vec<Expr> {
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| if i == 0 { arg } else { arg.or_prefix(" ") })
        .collect()
}

/// `{ statements }` with the prefix of its closing brace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub end: Space,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            end: Space::new("\n"),
        }
    }

    pub fn with_end(mut self, end: impl Into<Space>) -> Self {
        self.end = end.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatementKind {
    /// A bare expression used for its effect: `expr;`
    Expression(Expr),
    If {
        condition: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    Block(Block),
    LocalVariable {
        type_name: String,
        name: String,
        initializer: Option<Expr>,
    },
    Return(Option<Expr>),
    /// Loops, `try`, `switch`, `synchronized` and the like: a run of keyword clauses
    Compound(Vec<Clause>),
    Other(String),
}

/// One keyword section of a compound statement
///
/// `while (cond) body`, `catch (IOException e) body` and `finally body` are clauses, as
/// is the body-less `while (cond);` that closes a `do` loop. Header parts the host cannot
/// express as expressions, such as a catch parameter, go in as `ExprKind::Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub prefix: Space,
    pub keyword: String,
    /// Parenthesized header parts, `None` when the keyword takes no parentheses
    #[serde(default)]
    pub header: Option<Vec<Expr>>,
    /// Written between header parts: `;` for a counted `for`, ` :` for an enhanced one
    #[serde(default)]
    pub separator: String,
    /// Renders as a bare `;` when absent
    #[serde(default)]
    pub body: Option<Box<Statement>>,
}

impl Clause {
    pub fn new(keyword: impl Into<String>, body: Statement) -> Self {
        Self {
            prefix: Space::EMPTY,
            keyword: keyword.into(),
            header: None,
            separator: ";".to_string(),
            body: Some(Box::new(body.or_prefix(" "))),
        }
    }

    /// A clause with a parenthesized header, e.g. `while (cond) body`
    pub fn headed(keyword: impl Into<String>, header: Vec<Expr>, body: Statement) -> Self {
        Self {
            header: Some(space_trailing(header)),
            ..Self::new(keyword, body)
        }
    }

    /// A header with no body, e.g. the `while (cond);` closing a `do` loop
    pub fn tail(keyword: impl Into<String>, header: Vec<Expr>) -> Self {
        Self {
            prefix: Space::single(),
            keyword: keyword.into(),
            header: Some(space_trailing(header)),
            separator: ";".to_string(),
            body: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<Space>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub prefix: Space,
    pub kind: StatementKind,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            prefix: Space::EMPTY,
            kind,
        }
    }

    pub fn expression(expr: Expr) -> Self {
        Self::new(StatementKind::Expression(expr))
    }

    pub fn if_then(condition: Expr, then_branch: Statement) -> Self {
        Self::new(StatementKind::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: None,
        })
    }

    pub fn if_else(condition: Expr, then_branch: Statement, else_branch: Statement) -> Self {
        Self::new(StatementKind::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        })
    }

    pub fn block(block: Block) -> Self {
        Self::new(StatementKind::Block(block))
    }

    /// Clauses after the first are separated from the previous one by a space unless
    /// they carry a prefix of their own.
    pub fn compound(clauses: Vec<Clause>) -> Self {
        let clauses = clauses
            .into_iter()
            .enumerate()
            .map(|(i, clause)| {
                if i > 0 && clause.prefix.is_empty() {
                    clause.with_prefix(" ")
                } else {
                    clause
                }
            })
            .collect();
        Self::new(StatementKind::Compound(clauses))
    }

    pub fn while_loop(condition: Expr, body: Statement) -> Self {
        Self::compound(vec![Clause::headed("while", vec![condition], body)])
    }

    pub fn local(
        type_name: impl Into<String>,
        name: impl Into<String>,
        initializer: Option<Expr>,
    ) -> Self {
        Self::new(StatementKind::LocalVariable {
            type_name: type_name.into(),
            name: name.into(),
            initializer: initializer.map(|init| init.or_prefix(" ")),
        })
    }

    pub fn return_value(value: Option<Expr>) -> Self {
        Self::new(StatementKind::Return(value.map(|v| v.or_prefix(" "))))
    }

    pub fn with_prefix(mut self, prefix: impl Into<Space>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn or_prefix(self, prefix: &str) -> Self {
        if self.prefix.is_empty() {
            self.with_prefix(prefix)
        } else {
            self
        }
    }

    /// The call of a bare `call(...);` statement.
    pub fn as_call_statement(&self) -> Option<&MethodCall> {
        match &self.kind {
            StatementKind::Expression(expr) => expr.as_method_call(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub type_name: String,
    pub name: String,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub body: Option<Block>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, body: Block) -> Self {
        Self {
            name: name.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClassMember {
    Field(FieldDecl),
    Method(MethodDecl),
    Class(ClassDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    /// Annotation names as written, e.g. `Slf4j` or `lombok.extern.slf4j.Slf4j`
    pub annotations: Vec<String>,
    pub members: Vec<ClassMember>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.members.push(ClassMember::Method(method));
        self
    }

    pub fn with_member(mut self, member: ClassMember) -> Self {
        self.members.push(member);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub source_path: Option<String>,
    pub classes: Vec<ClassDecl>,
}

impl CompilationUnit {
    pub fn new(classes: Vec<ClassDecl>) -> Self {
        Self {
            source_path: None,
            classes,
        }
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }
}
