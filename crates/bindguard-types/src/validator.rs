use std::fmt;
use std::sync::Arc;

use crate::value::{TypeTag, Value};

pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A user predicate usable as a type-expression leaf.
///
/// Combinators are pure: `and`/`or` return new validators and never touch
/// their operands. Evaluation (including the failure boundary around the
/// predicate) lives in the engine.
#[derive(Clone)]
pub struct CustomValidator {
    pub name: Option<String>,
    /// When the predicate fails and the value is not an instance of this
    /// base, the failure is reported as the stronger type mismatch.
    pub base: Option<TypeTag>,
    pub message: Option<String>,
    pub kind: ValidatorKind,
}

#[derive(Clone)]
pub enum ValidatorKind {
    Predicate(PredicateFn),
    /// Both must pass, short-circuit left-to-right.
    AllOf(Box<CustomValidator>, Box<CustomValidator>),
    /// Either may pass, short-circuit.
    AnyOf(Box<CustomValidator>, Box<CustomValidator>),
}

/// Build a custom validator from a predicate, with an optional base type
/// and failure message.
pub fn validator<F>(predicate: F, base: Option<TypeTag>, message: Option<&str>) -> CustomValidator
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    CustomValidator {
        name: None,
        base,
        message: message.map(|m| m.to_string()),
        kind: ValidatorKind::Predicate(Arc::new(predicate)),
    }
}

impl CustomValidator {
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn and(self, other: CustomValidator) -> CustomValidator {
        CustomValidator {
            name: None,
            base: None,
            message: None,
            kind: ValidatorKind::AllOf(Box::new(self), Box::new(other)),
        }
    }

    pub fn or(self, other: CustomValidator) -> CustomValidator {
        CustomValidator {
            name: None,
            base: None,
            message: None,
            kind: ValidatorKind::AnyOf(Box::new(self), Box::new(other)),
        }
    }

    /// Short label for error messages.
    pub fn label(&self) -> &str {
        match (&self.name, &self.kind) {
            (Some(name), _) => name,
            (None, ValidatorKind::Predicate(_)) => "predicate",
            (None, ValidatorKind::AllOf(..)) => "and",
            (None, ValidatorKind::AnyOf(..)) => "or",
        }
    }
}

impl fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValidator")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("message", &self.message)
            .field("kind", &self.label())
            .finish()
    }
}
