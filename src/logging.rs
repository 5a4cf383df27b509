//! Tracing setup.
//!
//! Library code only emits `tracing` events. The CLI installs a subscriber
//! that writes to stderr so stdout stays clean for command output.

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV_VAR: &str = "LYNK_LOG";

/// Filter used when neither the environment nor the config sets one.
pub const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive: environment first, then config, then `warn`.
///
/// Blank values are ignored.
#[must_use]
pub fn filter_directive(env: Option<&str>, configured: Option<&str>) -> String {
    [env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

/// Install the global stderr subscriber.
///
/// Later calls are no-ops. An unparseable directive falls back to `warn`.
#[cfg(feature = "cli")]
pub fn init(configured: Option<&str>) {
    use tracing_subscriber::EnvFilter;

    let env = std::env::var(LOG_ENV_VAR).ok();
    let directive = filter_directive(env.as_deref(), configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_to_warn() {
        assert_eq!(filter_directive(None, None), "warn");
        assert_eq!(filter_directive(Some("  "), Some("")), "warn");
    }

    #[test]
    fn test_env_wins_over_config() {
        assert_eq!(filter_directive(Some("lynk=debug"), Some("info")), "lynk=debug");
    }

    #[test]
    fn test_config_used_without_env() {
        assert_eq!(filter_directive(None, Some(" info ")), "info");
        assert_eq!(filter_directive(Some(""), Some("error")), "error");
    }
}
