//! Global `tracing` subscriber driven by `--loglevel`.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LEVEL: &str = "warn";
pub const LEVELS: &[&str] = &["debug", "info", "ok", "warn", "error"];

/// Maps a CLI log level onto a `tracing` filter directive.
pub fn directive(level: &str) -> Option<&'static str> {
    match level.to_lowercase().as_str() {
        "debug" => Some("debug"),
        "info" | "ok" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

/// Installs the subscriber. Later calls keep the first subscriber.
pub fn init(level: &str) {
    let (directive, unknown) = match directive(level) {
        Some(d) => (d, false),
        None => (DEFAULT_LEVEL, true),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if unknown {
        tracing::warn!(
            level,
            "unknown log level, expected one of: {}",
            LEVELS.join(", ")
        );
    }
    if installed {
        tracing::debug!(level = directive, "logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive() {
        assert_eq!(directive("ok"), Some("info"));
        assert_eq!(directive("DEBUG"), Some("debug"));
        assert_eq!(directive("warn"), Some("warn"));
        assert_eq!(directive("loud"), None);
    }

    #[test]
    fn test_init_is_idempotent() {
        init("debug");
        init("nonsense");
    }
}
