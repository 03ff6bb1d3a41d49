//! Config parsing and profile/preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves
//! configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::BindguardConfigV1;
pub use resolve::{Overrides, ResolvedConfig};

/// Parse `bindguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<BindguardConfigV1> {
    let cfg: BindguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (profile + overrides).
pub fn resolve_config(
    cfg: BindguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

/// JSON schema of the user-facing config model, for editor tooling.
pub fn config_schema() -> schemars::Schema {
    schemars::schema_for!(BindguardConfigV1)
}
