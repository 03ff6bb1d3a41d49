//! Stable data model shared across the bindguard workspace.
//!
//! This crate is intentionally boring:
//! - the runtime `Value` model and its `TypeTag`s
//! - the host-facing `Annotation` surface produced by signature reflection
//! - `CustomValidator` predicates and their combinators
//! - the `ValidationError` taxonomy

#![forbid(unsafe_code)]

pub mod annotation;
pub mod errors;
pub mod validator;
pub mod value;

pub use annotation::{Annotation, FuncSig, ParamDecl, Signature, TypeParamDecl};
pub use errors::ValidationError;
pub use validator::{CustomValidator, ValidatorKind, validator};
pub use value::{ClassDef, FuncValue, TypeTag, Value};
