/// Strictness and performance toggles, snapshotted per wrapped callable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Reject `Any`/unconstrained annotations.
    pub strict: bool,
    /// Allow anonymous callables without declared annotations to satisfy
    /// `Callable`-shaped parameters.
    pub implied_lambdas: bool,
    /// Skip deep element/field checks after confirming the outer shape.
    /// Trades correctness for speed; never enabled silently.
    pub performance: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            strict: true,
            implied_lambdas: false,
            performance: false,
        }
    }
}
