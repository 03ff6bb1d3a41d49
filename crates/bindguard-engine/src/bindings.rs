use std::collections::BTreeMap;

use bindguard_types::{TypeTag, ValidationError, Value};

/// Binding state for one type parameter within one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenericBinding {
    /// Committed concrete type; `None` until the first bind.
    pub ty: Option<TypeTag>,
    /// Instances bound so far, in binding order.
    pub instances: Vec<Value>,
}

impl GenericBinding {
    pub fn is_committed(&self) -> bool {
        self.ty.is_some()
    }

    /// Committed, or never referenced: either way the parameter is
    /// consistent at the end of argument checking.
    pub fn is_satisfied(&self) -> bool {
        self.ty.is_some() || self.instances.is_empty()
    }
}

/// Per-call table mapping type-parameter name to its binding state.
///
/// Created fresh for every invocation and discarded at call end; the
/// table is the only mutable state the matcher touches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingTable {
    slots: BTreeMap<String, GenericBinding>,
}

/// Opaque copy of the table state for transactional rollback.
#[derive(Clone, Debug)]
pub struct Snapshot {
    slots: BTreeMap<String, GenericBinding>,
}

impl BindingTable {
    pub fn new<I>(params: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            slots: params
                .into_iter()
                .map(|name| (name, GenericBinding::default()))
                .collect(),
        }
    }

    /// Bind `value` to `param`: commit the runtime type on first bind,
    /// thereafter require an exact match with the committed type.
    /// No implicit widening, ever.
    pub fn bind(&mut self, param: &str, value: &Value) -> Result<(), ValidationError> {
        let tag = value.tag();
        let slot = self.slots.entry(param.to_string()).or_default();
        match &slot.ty {
            Some(bound) if *bound != tag => Err(ValidationError::Binding {
                param: param.to_string(),
                bound: bound.to_string(),
                actual: tag.to_string(),
                at: String::new(),
            }),
            _ => {
                slot.ty = Some(tag);
                slot.instances.push(value.clone());
                Ok(())
            }
        }
    }

    pub fn committed(&self, param: &str) -> Option<&TypeTag> {
        self.slots.get(param).and_then(|b| b.ty.as_ref())
    }

    pub fn get(&self, param: &str) -> Option<&GenericBinding> {
        self.slots.get(param)
    }

    /// Parameters whose binding state is inconsistent (instances recorded
    /// without a committed type).
    pub fn unsatisfied(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|(_, b)| !b.is_satisfied())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.slots.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.slots = snapshot.slots;
    }
}
