use std::collections::BTreeMap;
use std::fmt;

use bindguard_types::{CustomValidator, TypeTag, Value};

/// Canonical representation of a declared type constraint.
///
/// A closed variant set with an exhaustive matcher, replacing the open
/// runtime dispatch of ad-hoc annotation objects. Extensibility is the
/// explicit `Validator` escape hatch.
#[derive(Clone, Debug)]
pub enum TypeExpr {
    Concrete(TypeTag),
    Param(TypeParam),
    /// Non-empty, order significant: first syntactic match wins.
    Union(Vec<TypeExpr>),
    Seq(SeqShape),
    /// `None` is an untyped mapping: passes unconditionally.
    Map(Option<MapShape>),
    /// Named required fields.
    Record(BTreeMap<String, TypeExpr>),
    /// Allowed value set, matched by equality.
    Literals(Vec<Value>),
    /// `None` requires only an invocable value.
    Callable(Option<CallShape>),
    Validator(CustomValidator),
    Any,
    Unannotated,
}

/// A type parameter occurrence with its declared constraint set
/// (empty = unconstrained).
#[derive(Clone, Debug)]
pub struct TypeParam {
    pub name: String,
    pub constraints: Vec<TypeTag>,
}

#[derive(Clone, Debug)]
pub enum SeqShape {
    /// Every element matches one expression; empty sequences pass vacuously.
    Homogeneous(Box<TypeExpr>),
    /// Exact length, per-position expressions.
    Fixed(Vec<TypeExpr>),
}

#[derive(Clone, Debug)]
pub struct MapShape {
    pub key: Box<TypeExpr>,
    pub value: Box<TypeExpr>,
}

#[derive(Clone, Debug)]
pub struct CallShape {
    pub params: Vec<TypeExpr>,
    pub ret: Box<TypeExpr>,
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypeExpr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Concrete(tag) => write!(f, "{tag}"),
            TypeExpr::Param(p) => write!(f, "{}", p.name),
            TypeExpr::Union(members) => write_joined(f, members, " | "),
            TypeExpr::Seq(SeqShape::Homogeneous(elem)) => write!(f, "list[{elem}]"),
            TypeExpr::Seq(SeqShape::Fixed(elems)) => {
                write!(f, "tuple[")?;
                write_joined(f, elems, ", ")?;
                write!(f, "]")
            }
            TypeExpr::Map(None) => write!(f, "dict"),
            TypeExpr::Map(Some(shape)) => write!(f, "dict[{}, {}]", shape.key, shape.value),
            TypeExpr::Record(fields) => {
                write!(f, "{{")?;
                for (i, (name, expr)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {expr}")?;
                }
                write!(f, "}}")
            }
            TypeExpr::Literals(values) => {
                write!(f, "literal[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            TypeExpr::Callable(None) => write!(f, "func"),
            TypeExpr::Callable(Some(shape)) => {
                write!(f, "func[(")?;
                write_joined(f, &shape.params, ", ")?;
                write!(f, ") -> {}]", shape.ret)
            }
            TypeExpr::Validator(v) => write!(f, "<{}>", v.label()),
            TypeExpr::Any => write!(f, "any"),
            TypeExpr::Unannotated => write!(f, "_"),
        }
    }
}
