use std::fmt;
use std::sync::Arc;

use crate::annotation::FuncSig;

/// Closed runtime value model checked by the engine.
///
/// Hosts convert their own values into this shape before validation.
/// `Map` is an insertion-ordered entry list: keys may be any `Value`
/// (including floats), so a hashed or ordered container is not an option.
#[derive(Clone, Debug)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Func(FuncValue),
    Instance(Arc<ClassDef>),
}

/// Runtime type of a value, used for concrete checks and binding commits.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    Unit,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    Tuple,
    Map,
    Func,
    Class(String),
}

/// A host class with its base-class chain.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<Arc<ClassDef>>,
}

impl ClassDef {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            bases: Vec::new(),
        })
    }

    pub fn with_bases(name: &str, bases: Vec<Arc<ClassDef>>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            bases,
        })
    }

    /// True if this class is `name` or transitively derives from it.
    pub fn is_subclass_of(&self, name: &str) -> bool {
        self.name == name || self.bases.iter().any(|b| b.is_subclass_of(name))
    }
}

/// A callable as a value: its name (None for anonymous callables) and its
/// own declared signature, if any. The engine never invokes it; `Callable`
/// shapes are matched against the declared annotations only.
#[derive(Clone, Debug)]
pub struct FuncValue {
    pub name: Option<String>,
    pub sig: Option<FuncSig>,
}

impl FuncValue {
    pub fn named(name: &str, sig: Option<FuncSig>) -> Self {
        Self {
            name: Some(name.to_string()),
            sig,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            name: None,
            sig: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(s.to_string())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(items)
    }

    pub fn map(entries: Vec<(Value, Value)>) -> Self {
        Value::Map(entries)
    }

    /// The runtime type of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Unit => TypeTag::Unit,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::Str,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::List(_) => TypeTag::List,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::Map(_) => TypeTag::Map,
            Value::Func(_) => TypeTag::Func,
            Value::Instance(class) => TypeTag::Class(class.name.clone()),
        }
    }

    /// Mapping entries, if this value is mapping-like.
    pub fn entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a string-keyed entry in a mapping value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.entries()?.iter().find_map(|(k, v)| match k {
            Value::Str(s) if s == name => Some(v),
            _ => None,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Functions compare by name; bodies are opaque to this model.
            (Value::Func(a), Value::Func(b)) => a.name == b.name,
            (Value::Instance(a), Value::Instance(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Unit => write!(f, "none"),
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Str => write!(f, "str"),
            TypeTag::Bytes => write!(f, "bytes"),
            TypeTag::List => write!(f, "list"),
            TypeTag::Tuple => write!(f, "tuple"),
            TypeTag::Map => write!(f, "dict"),
            TypeTag::Func => write!(f, "func"),
            TypeTag::Class(name) => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "bytes({})", b.len()),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Func(func) => match &func.name {
                Some(name) => write!(f, "<func {name}>"),
                None => write!(f, "<anonymous func>"),
            },
            Value::Instance(class) => write!(f, "<{} instance>", class.name),
        }
    }
}
