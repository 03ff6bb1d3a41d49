use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `bindguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so
/// forward-compat is easy. Resolution into an engine config happens in
/// `resolve`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BindguardConfigV1 {
    /// Optional schema string for tooling (`bindguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Preset profile: `strict` (default), `lenient`, or `fast`.
    /// Unknown names fall back to `strict`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Reject `Any`/unconstrained annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Allow anonymous callables to satisfy `Callable`-shaped parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implied_lambdas: Option<bool>,

    /// Skip deep structural checks on container/record element types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<bool>,
}
