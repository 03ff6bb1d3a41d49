use bindguard_engine::MatchConfig;

use crate::model::BindguardConfigV1;
use crate::presets;

const SCHEMA_CONFIG_V1: &str = "bindguard.config.v1";

/// Host-supplied overrides (e.g. from CLI flags). Highest precedence.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub strict: Option<bool>,
    pub implied_lambdas: Option<bool>,
    pub performance: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: MatchConfig,
}

/// Precedence: overrides > file settings > profile preset.
pub fn resolve_config(
    cfg: BindguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    if let Some(schema) = cfg.schema.as_deref() {
        anyhow::ensure!(
            schema == SCHEMA_CONFIG_V1,
            "unknown config schema: {schema} (expected {SCHEMA_CONFIG_V1})"
        );
    }

    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile);

    if let Some(strict) = overrides.strict.or(cfg.strict) {
        effective.strict = strict;
    }
    if let Some(implied_lambdas) = overrides.implied_lambdas.or(cfg.implied_lambdas) {
        effective.implied_lambdas = implied_lambdas;
    }
    if let Some(performance) = overrides.performance.or(cfg.performance) {
        effective.performance = performance;
    }

    Ok(ResolvedConfig { effective })
}
