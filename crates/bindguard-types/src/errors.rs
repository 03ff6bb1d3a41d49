use thiserror::Error;

/// The validation failure taxonomy.
///
/// `UnsupportedShape` surfaces at decoration time, before any call. All
/// other variants are per-call failures and abort only the current call.
/// The `at` field is a context trail naming the offending parameter and
/// the structural path (index, key, field) to the failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("value {actual} does not satisfy `{expected}`{at}")]
    InvalidType {
        expected: String,
        actual: String,
        at: String,
    },

    #[error("type parameter `{param}` bound to {bound}, cannot rebind to {actual}{at}")]
    Binding {
        param: String,
        bound: String,
        actual: String,
        at: String,
    },

    #[error("unsupported annotation shape: {detail}")]
    UnsupportedShape { detail: String },

    #[error("explicit type required in strict mode{at}")]
    StrictMode { at: String },

    #[error("{detail}{at}")]
    Failed { detail: String, at: String },

    #[error("call to `{func}` left type parameters unsatisfied: {params:?}")]
    UnsatisfiedBindings { func: String, params: Vec<String> },
}

impl ValidationError {
    pub fn invalid_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ValidationError::InvalidType {
            expected: expected.into(),
            actual: actual.into(),
            at: String::new(),
        }
    }

    pub fn unsupported(detail: impl Into<String>) -> Self {
        ValidationError::UnsupportedShape {
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        ValidationError::Failed {
            detail: detail.into(),
            at: String::new(),
        }
    }

    /// Prepend an enclosing context segment as the failure propagates up.
    /// Inner segments come first: `at index 1, in argument `b``.
    pub fn push_context(mut self, segment: &str) -> Self {
        if let Some(at) = self.context_mut() {
            if at.is_empty() {
                *at = format!(" at {segment}");
            } else {
                at.push_str(&format!(", in {segment}"));
            }
        }
        self
    }

    fn context_mut(&mut self) -> Option<&mut String> {
        match self {
            ValidationError::InvalidType { at, .. }
            | ValidationError::Binding { at, .. }
            | ValidationError::StrictMode { at }
            | ValidationError::Failed { at, .. } => Some(at),
            ValidationError::UnsupportedShape { .. }
            | ValidationError::UnsatisfiedBindings { .. } => None,
        }
    }
}
