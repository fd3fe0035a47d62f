//! Diagnostic logging setup.
//!
//! Library code only emits `tracing` events; binaries call [`init_logging`]
//! once at startup. Output goes to stderr so it never interleaves with the
//! transcript on stdout.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::EnvConfig;

/// Filter applied when neither `WEATHER_CHAT_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs the global stderr subscriber.
///
/// Returns `false` when a subscriber was already installed, which makes
/// repeated calls harmless.
pub fn init_logging(config: &EnvConfig) -> bool {
    let filter = build_filter(config.log_filter.as_deref());
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::{build_filter, init_logging};
    use crate::config::EnvConfig;

    #[test]
    fn invalid_directives_fall_back_to_default() {
        assert_eq!(build_filter(Some("weather_chat=loudest")).to_string(), "warn");
        assert_eq!(build_filter(None).to_string(), "warn");
        assert_eq!(
            build_filter(Some("weather_chat=debug")).to_string(),
            "weather_chat=debug"
        );
    }

    #[test]
    fn second_init_is_a_no_op() {
        let config = EnvConfig::default();
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
