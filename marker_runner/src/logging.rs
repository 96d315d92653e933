//! Tracing subscriber setup for replay runs.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Directive used by `--verbose`: per-frame detection detail from the library,
/// per-cycle detail from the runner, everything else at info.
const VERBOSE_DIRECTIVE: &str = "info,marker_vision=debug,marker_runner=debug";

/// Picks the filter directive. `RUST_LOG` wins, then `--verbose`, then the config.
fn directive(config: &LoggingConfig, verbose: bool) -> String {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => from_env,
        _ if verbose => VERBOSE_DIRECTIVE.to_string(),
        _ => config.level.clone(),
    }
}

/// Installs the global subscriber. Fails on a malformed level directive.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let directive = directive(config, verbose);
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter {:?}", directive))?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_target(verbose).compact().finish())
    };
    // A subscriber installed earlier (e.g. by a test harness) stays in place.
    installed.ok();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_the_configured_level() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        let config = LoggingConfig::default();
        assert_eq!(directive(&config, false), "info");
        assert_eq!(directive(&config, true), VERBOSE_DIRECTIVE);
    }

    #[test]
    fn malformed_levels_are_rejected() {
        let config = LoggingConfig {
            level: "marker_vision=loud".to_string(),
            json: false,
        };
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        assert!(init_logging(&config, false).is_err());
    }
}
