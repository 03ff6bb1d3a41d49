use std::collections::BTreeMap;

use crate::validator::CustomValidator;
use crate::value::{TypeTag, Value};

/// A declared type as the host's reflection reports it.
///
/// Deliberately looser than the engine's canonical expression model:
/// shapes the engine cannot categorize are representable here and are
/// rejected with `UnsupportedShape` at decoration time.
#[derive(Clone, Debug)]
pub enum Annotation {
    /// A bare name: primitive (`int`, `str`, ...), class, or type parameter.
    Name(String),
    /// A parameterized head: `list[T]`, `tuple[A, B]`, `dict[K, V]`.
    /// Unknown heads exist here and fail classification.
    Apply(String, Vec<Annotation>),
    Union(Vec<Annotation>),
    /// Named required fields (TypedDict analogue).
    Record(BTreeMap<String, Annotation>),
    Literal(Vec<Value>),
    Callable(Vec<Annotation>, Box<Annotation>),
    Validator(CustomValidator),
    Any,
}

impl Annotation {
    pub fn name(s: &str) -> Self {
        Annotation::Name(s.to_string())
    }

    pub fn apply(head: &str, args: Vec<Annotation>) -> Self {
        Annotation::Apply(head.to_string(), args)
    }

    pub fn union(members: Vec<Annotation>) -> Self {
        Annotation::Union(members)
    }

    pub fn record(fields: Vec<(&str, Annotation)>) -> Self {
        Annotation::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub fn callable(params: Vec<Annotation>, ret: Annotation) -> Self {
        Annotation::Callable(params, Box::new(ret))
    }
}

/// The declared signature of a callable value (`FuncValue::sig`).
#[derive(Clone, Debug)]
pub struct FuncSig {
    pub params: Vec<Annotation>,
    pub ret: Annotation,
}

impl FuncSig {
    pub fn new(params: Vec<Annotation>, ret: Annotation) -> Self {
        Self { params, ret }
    }
}

/// One reflected parameter of a callable being wrapped.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub name: String,
    pub annotation: Option<Annotation>,
    pub default: Option<Value>,
}

/// One declared type parameter with its (possibly empty) constraint set.
#[derive(Clone, Debug)]
pub struct TypeParamDecl {
    pub name: String,
    pub constraints: Vec<TypeTag>,
}

impl TypeParamDecl {
    pub fn unconstrained(name: &str) -> Self {
        Self {
            name: name.to_string(),
            constraints: Vec::new(),
        }
    }

    pub fn constrained(name: &str, constraints: Vec<TypeTag>) -> Self {
        Self {
            name: name.to_string(),
            constraints,
        }
    }
}

/// Everything the host's reflection hands over for one callable, once.
#[derive(Clone, Debug, Default)]
pub struct Signature {
    pub params: Vec<ParamDecl>,
    pub ret: Option<Annotation>,
    pub type_params: Vec<TypeParamDecl>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: &str, annotation: Annotation) -> Self {
        self.params.push(ParamDecl {
            name: name.to_string(),
            annotation: Some(annotation),
            default: None,
        });
        self
    }

    pub fn param_with_default(mut self, name: &str, annotation: Annotation, default: Value) -> Self {
        self.params.push(ParamDecl {
            name: name.to_string(),
            annotation: Some(annotation),
            default: Some(default),
        });
        self
    }

    pub fn bare_param(mut self, name: &str) -> Self {
        self.params.push(ParamDecl {
            name: name.to_string(),
            annotation: None,
            default: None,
        });
        self
    }

    pub fn returns(mut self, annotation: Annotation) -> Self {
        self.ret = Some(annotation);
        self
    }

    pub fn type_param(mut self, decl: TypeParamDecl) -> Self {
        self.type_params.push(decl);
        self
    }
}
