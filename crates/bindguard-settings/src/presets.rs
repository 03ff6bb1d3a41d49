use bindguard_engine::MatchConfig;

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything beyond a toggle flip belongs in
/// repo config.
pub fn preset(profile: &str) -> MatchConfig {
    match profile {
        "lenient" => lenient_profile(),
        "fast" => fast_profile(),
        // default
        _ => strict_profile(),
    }
}

fn strict_profile() -> MatchConfig {
    MatchConfig::default()
}

fn lenient_profile() -> MatchConfig {
    MatchConfig {
        strict: false,
        implied_lambdas: false,
        performance: false,
    }
}

/// Performance mode weakens structural guarantees; it is only ever reached
/// through this explicit profile or an explicit override.
fn fast_profile() -> MatchConfig {
    MatchConfig {
        strict: true,
        implied_lambdas: false,
        performance: true,
    }
}
