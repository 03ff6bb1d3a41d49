//! Pure type-expression matching (no IO).
//!
//! Input: a canonical `TypeExpr` (classified once at decoration time),
//! a runtime `Value`, and a per-call `BindingTable`.
//! Output: success, or a `ValidationError` naming the failure.

#![forbid(unsafe_code)]

pub mod bindings;
pub mod classify;
pub mod model;
pub mod policy;

mod matcher;

pub use bindings::{BindingTable, GenericBinding};
pub use classify::classify;
pub use matcher::Matcher;
pub use model::{CallShape, MapShape, SeqShape, TypeExpr, TypeParam};
pub use policy::MatchConfig;

#[cfg(test)]
mod proptest;
#[cfg(test)]
pub(crate) mod test_support;
