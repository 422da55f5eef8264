/*!
# Semantic Type Model

Resolved-type information the rewrite rules consume. The host owns type resolution;
the rules only ask the four questions of [`TypeResolver`]. An answer of
[`TypeInfo::Unknown`] never matches any specific category.
*/

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::ast::{ClassDecl, Expr, ExprKind, Literal, NodeId};

pub const STRING_TYPE: &str = "java.lang.String";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    Void,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Char,
        PrimitiveKind::Void,
    ];

    /// Qualified name of the wrapper class
    pub fn boxed_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Void => "java.lang.Void",
        }
    }

    pub fn from_boxed_name(name: &str) -> Option<PrimitiveKind> {
        Self::ALL.into_iter().find(|kind| kind.boxed_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeInfo {
    Primitive(PrimitiveKind),
    Boxed(PrimitiveKind),
    String,
    Array(Box<TypeInfo>),
    /// Any other class or interface, by qualified name
    Named(String),
    Unknown,
}

impl TypeInfo {
    pub fn named(name: impl Into<String>) -> Self {
        TypeInfo::Named(name.into())
    }

    pub fn array_of(elem: TypeInfo) -> Self {
        TypeInfo::Array(Box::new(elem))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeInfo::Unknown)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeInfo::Primitive(_))
    }

    pub fn is_boxed_primitive(&self) -> bool {
        match self {
            TypeInfo::Boxed(_) => true,
            TypeInfo::Named(name) => PrimitiveKind::from_boxed_name(name).is_some(),
            _ => false,
        }
    }

    pub fn is_string(&self) -> bool {
        match self {
            TypeInfo::String => true,
            TypeInfo::Named(name) => name == STRING_TYPE,
            _ => false,
        }
    }

    pub fn array_element(&self) -> Option<&TypeInfo> {
        match self {
            TypeInfo::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// Qualified class name, for types that have one
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            TypeInfo::Boxed(kind) => Some(kind.boxed_name()),
            TypeInfo::String => Some(STRING_TYPE),
            TypeInfo::Named(name) => Some(name),
            TypeInfo::Primitive(_) | TypeInfo::Array(_) | TypeInfo::Unknown => None,
        }
    }
}

/// Resolved target of a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    /// Qualified name of the declaring type; absent when only partially resolved
    pub declaring_type: Option<String>,
    pub parameter_types: Vec<TypeInfo>,
}

impl MethodSignature {
    pub fn new(
        name: impl Into<String>,
        declaring_type: Option<&str>,
        parameter_types: Vec<TypeInfo>,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type: declaring_type.map(str::to_string),
            parameter_types,
        }
    }

    /// Parameter type at `index`, expanding a trailing array parameter as varargs.
    pub fn parameter_at(&self, index: usize) -> Option<&TypeInfo> {
        match self.parameter_types.get(index) {
            Some(param) => Some(param),
            None => self
                .parameter_types
                .last()
                .and_then(|last| last.array_element()),
        }
    }

    /// Whether a call with `arg_count` arguments can bind to this signature.
    pub fn accepts_arity(&self, arg_count: usize) -> bool {
        let declared = self.parameter_types.len();
        if arg_count == declared {
            return true;
        }
        let varargs = matches!(self.parameter_types.last(), Some(TypeInfo::Array(_)));
        varargs && arg_count + 1 >= declared
    }
}

/// Semantic queries a host answers for the rules
pub trait TypeResolver {
    /// Resolved type of an expression, `Unknown` when resolution failed
    fn resolve_type(&self, expr: &Expr) -> TypeInfo;

    /// Whether `from` is assignable to `to` (both qualified names)
    fn is_assignable(&self, from: &str, to: &str) -> bool;

    /// Methods named `method` exposed by `type_name`
    fn overloads_of(&self, type_name: &str, method: &str) -> Vec<MethodSignature>;

    /// Annotation names carried by a class declaration
    fn annotations_of(&self, class: &ClassDecl) -> Vec<String> {
        class.annotations.clone()
    }
}

/// Resolver for hosts with no semantic model at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl TypeResolver for Unresolved {
    fn resolve_type(&self, _expr: &Expr) -> TypeInfo {
        TypeInfo::Unknown
    }

    fn is_assignable(&self, from: &str, to: &str) -> bool {
        from == to
    }

    fn overloads_of(&self, _type_name: &str, _method: &str) -> Vec<MethodSignature> {
        Vec::new()
    }
}

/// In-memory resolver backed by tables the host fills in.
///
/// Types are looked up by [`NodeId`]; literals without an entry get their intrinsic
/// type. Supertypes are searched transitively, so a type exposes the methods of
/// everything it extends.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: HashMap<NodeId, TypeInfo>,
    supertypes: HashMap<String, Vec<String>>,
    methods: HashMap<String, Vec<MethodSignature>>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, id: u32, ty: TypeInfo) -> Self {
        self.types.insert(NodeId(id), ty);
        self
    }

    pub fn with_supertype(mut self, type_name: &str, supertype: &str) -> Self {
        self.supertypes
            .entry(type_name.to_string())
            .or_default()
            .push(supertype.to_string());
        self
    }

    /// Declare a method on the signature's declaring type. Signatures without a
    /// declaring type cannot be attached anywhere and are dropped.
    pub fn with_method(mut self, signature: MethodSignature) -> Self {
        if let Some(owner) = signature.declaring_type.clone() {
            self.methods.entry(owner).or_default().push(signature);
        }
        self
    }

    pub fn insert_type(&mut self, id: NodeId, ty: TypeInfo) {
        self.types.insert(id, ty);
    }

    /// `type_name` followed by all of its supertypes, breadth first, each once.
    fn lineage(&self, type_name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([type_name.to_string()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(&current) {
                queue.extend(parents.iter().cloned());
            }
            order.push(current);
        }
        order
    }
}

fn literal_type(value: &Literal) -> TypeInfo {
    match value {
        Literal::Integer(_) => TypeInfo::Primitive(PrimitiveKind::Int),
        Literal::Float(_) => TypeInfo::Primitive(PrimitiveKind::Double),
        Literal::Char(_) => TypeInfo::Primitive(PrimitiveKind::Char),
        Literal::Boolean(_) => TypeInfo::Primitive(PrimitiveKind::Boolean),
        Literal::String(_) => TypeInfo::String,
        Literal::Null => TypeInfo::Unknown,
    }
}

impl TypeResolver for TypeTable {
    fn resolve_type(&self, expr: &Expr) -> TypeInfo {
        if let Some(ty) = expr.id.and_then(|id| self.types.get(&id)) {
            return ty.clone();
        }
        match &expr.kind {
            ExprKind::Literal(value) => literal_type(value),
            _ => TypeInfo::Unknown,
        }
    }

    fn is_assignable(&self, from: &str, to: &str) -> bool {
        self.lineage(from).iter().any(|name| name == to)
    }

    fn overloads_of(&self, type_name: &str, method: &str) -> Vec<MethodSignature> {
        self.lineage(type_name)
            .iter()
            .filter_map(|name| self.methods.get(name))
            .flatten()
            .filter(|signature| signature.name == method)
            .cloned()
            .collect()
    }
}
