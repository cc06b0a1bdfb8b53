//! Configuration for the suitelog command
//!
//! This module provides the command-line options: which product the log
//! belongs to, where to read it from, how to chunk the reads, and how to
//! print the result.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use suitelog_parser::Product;

/// Suitelog - structured results from raw k3s/rke2 test-run logs
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "suitelog")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Product the test run targeted (k3s or rke2)
    ///
    /// Only records tagged for this product are treated as test events.
    #[arg(short, long, env = "SUITELOG_PRODUCT", default_value = "k3s")]
    pub product: Product,

    /// Path to the raw log file
    ///
    /// Reads from stdin when not given.
    #[arg(short, long, env = "SUITELOG_INPUT")]
    pub input: Option<PathBuf>,

    /// Read the log in chunks of this many bytes (0 reads it in one go)
    #[arg(long, default_value_t = 0)]
    pub chunk_size: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so stdout only carries the result.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// How the parsed result is printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Chat-style human summary
    Text,
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input path is specified but doesn't exist or isn't a file
    /// - Both `--verbose` and `--quiet` are set
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.verbose && self.quiet {
            return Err(ConfigError::ConflictingVerbosity);
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.clone()));
            }
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input log not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input log is not a file: {0}")]
    InputNotFile(PathBuf),

    /// Both verbose and quiet were requested
    #[error("--verbose and --quiet cannot be used together")]
    ConflictingVerbosity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.product, Product::K3s);
        assert!(config.input.is_none());
        assert_eq!(config.chunk_size, 0);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_parse_product() {
        let config = Config::try_parse_from(["suitelog", "--product", "rke2"])
            .expect("parse should succeed");
        assert_eq!(config.product, Product::Rke2);
    }

    #[test]
    fn test_parse_unknown_product() {
        let result = Config::try_parse_from(["suitelog", "--product", "microk8s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_format_and_chunks() {
        let config = Config::try_parse_from([
            "suitelog",
            "--format",
            "text",
            "--chunk-size",
            "4096",
            "-i",
            "/tmp/run.log",
        ])
        .expect("parse should succeed");
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.input, Some(PathBuf::from("/tmp/run.log")));
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_input() {
        let config = Config {
            input: Some(PathBuf::from("/nonexistent/path/12345.log")),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFound(_))));
    }

    #[test]
    fn test_validate_directory_input() {
        let config = Config {
            input: Some(std::env::temp_dir()),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFile(_))));
    }

    #[test]
    fn test_validate_conflicting_verbosity() {
        let config = Config {
            verbose: true,
            quiet: true,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ConflictingVerbosity)
        ));
    }

    #[test]
    fn test_validate_stdin() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
