//! Callable wrapping: decoration-time classification, per-call checking.
//!
//! `validate` turns a host callable plus its reflected `Signature` into a
//! `Validated` wrapper with an identical call surface. Classification runs
//! once here; every call then gets a fresh binding table and a full
//! argument/return check before the result is handed back.

#![forbid(unsafe_code)]

mod spec;
mod wrapper;

pub use spec::{InvocationSpec, ParamSpec};
pub use wrapper::{HostFn, Validated, validate, validate_with};

// The predicate-combinator entry point, re-exported so hosts depend on one
// crate for the whole decoration surface.
pub use bindguard_types::validator;
