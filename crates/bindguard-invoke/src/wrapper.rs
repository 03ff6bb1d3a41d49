use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use bindguard_engine::{BindingTable, MatchConfig, Matcher};
use bindguard_types::{Signature, ValidationError, Value};

use crate::spec::InvocationSpec;

/// The wrapped callable, as the host hands it over.
pub type HostFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// A callable paired with its invocation spec.
///
/// Explicit composition, not mutation: the wrapper owns a reference to the
/// original callable and never touches it. All per-call state is
/// stack-scoped, so a shared `Validated` is freely usable from multiple
/// threads.
pub struct Validated {
    spec: Arc<InvocationSpec>,
    func: HostFn,
    enabled: AtomicBool,
}

impl std::fmt::Debug for Validated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validated")
            .field("spec", &self.spec)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Wrap `func` with validation against its reflected signature, using the
/// default configuration.
pub fn validate(name: &str, sig: &Signature, func: HostFn) -> Result<Validated, ValidationError> {
    validate_with(name, sig, func, MatchConfig::default())
}

/// Wrap `func` with validation under an explicit configuration snapshot.
pub fn validate_with(
    name: &str,
    sig: &Signature,
    func: HostFn,
    config: MatchConfig,
) -> Result<Validated, ValidationError> {
    let spec = InvocationSpec::build(name, sig, config)?;
    Ok(Validated {
        spec: Arc::new(spec),
        func,
        enabled: AtomicBool::new(true),
    })
}

impl Validated {
    pub fn spec(&self) -> &InvocationSpec {
        &self.spec
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Hot-path escape: disable all checking without re-wrapping.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Validate arguments, invoke, validate the result.
    ///
    /// Arguments are checked in declaration order against a fresh binding
    /// table; the wrapped function is only invoked once every argument has
    /// bound, and the return check reuses the same table so return types
    /// may be constrained by argument-bound generics.
    pub fn call(&self, args: &[Value]) -> Result<Value, ValidationError> {
        if !self.is_enabled() {
            return Ok((self.func)(args));
        }

        let spec = &self.spec;
        if args.len() > spec.params.len() {
            return Err(ValidationError::failed(format!(
                "`{}` takes {} arguments, got {}",
                spec.func_name,
                spec.params.len(),
                args.len()
            )));
        }

        let matcher = Matcher::new(spec.config);
        let mut binds = BindingTable::new(spec.type_params.iter().cloned());

        for (i, param) in spec.params.iter().enumerate() {
            let value = match args.get(i) {
                Some(value) => value,
                None => match &param.default {
                    Some(default) => default,
                    None => {
                        return Err(ValidationError::failed(format!(
                            "missing argument `{}` in call to `{}`",
                            param.name, spec.func_name
                        )));
                    }
                },
            };
            if let Some(expr) = &param.expr {
                matcher
                    .check(expr, value, &mut binds)
                    .map_err(|e| e.push_context(&format!("argument `{}`", param.name)))?;
            }
        }

        let unsatisfied = binds.unsatisfied();
        if !unsatisfied.is_empty() {
            return Err(ValidationError::UnsatisfiedBindings {
                func: spec.func_name.clone(),
                params: unsatisfied,
            });
        }

        let result = (self.func)(args);

        if let Some(ret) = &spec.ret {
            debug!(func = %spec.func_name, result = %result, "checking return value");
            matcher
                .check(ret, &result, &mut binds)
                .map_err(|e| e.push_context("return value"))?;
        }

        Ok(result)
    }
}
