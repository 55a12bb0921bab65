//! Log output setup
//!
//! Logs go to stderr so stdout stays free for command output. `RUST_LOG`
//! takes precedence over `--log-level` and the configuration file.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};

const CRATES: &[&str] = &["fluxit", "fluxit_core", "fluxit_engine"];

/// Parse a level name such as `info` or `DEBUG`
pub fn parse_level(level: &str) -> Result<Level> {
    level.trim().parse::<Level>().map_err(|_| {
        CliError::validation_with_help(
            format!("unknown log level '{}'", level),
            "Use one of: error, warn, info, debug, trace",
        )
    })
}

fn directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber
pub fn init(level: &str, color: bool) -> Result<()> {
    let level = parse_level(level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(true)
        .with_line_number(true)
        .without_time()
        .try_init()
        .map_err(|e| CliError::Other {
            message: format!("failed to initialise logging: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn test_directives() {
        assert_eq!(
            directives(Level::WARN),
            "fluxit=warn,fluxit_core=warn,fluxit_engine=warn"
        );
    }
}
