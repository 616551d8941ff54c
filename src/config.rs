//! Command-line configuration

use std::path::PathBuf;

use clap::{Args, Parser};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Rebate command-line configuration
#[derive(Debug, Parser)]
#[command(name = "rebate", about = "Resolve fixture carts against discount rules", long_about = None)]
pub struct CliConfig {
    /// Fixture set name
    #[arg(short, long, env = "REBATE_FIXTURE", default_value = "demo")]
    pub fixture: String,

    /// Directory containing `channels/`, `rules/` and `carts/`
    #[arg(short = 'd', long, env = "REBATE_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Resolve only this cart (defaults to every cart in the set)
    #[arg(short, long)]
    pub cart: Option<String>,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_defaults_and_overrides() -> TestResult {
        let config = CliConfig::try_parse_from(["rebate", "--cart", "vip", "--log-format", "json"])?;

        assert_eq!(config.cart.as_deref(), Some("vip"));
        assert_eq!(config.logging.log_format, LogFormat::Json);

        Ok(())
    }

    #[test]
    fn rejects_unknown_log_format() {
        let result = CliConfig::try_parse_from(["rebate", "--log-format", "xml"]);

        assert!(result.is_err());
    }
}
