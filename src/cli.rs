//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// tsxcheck - client for a remote Next.js/TSX code analyzer
///
/// Submits a snippet to the analyzer service and shows its verdict: the
/// token list and optimization metrics, or the lexical, syntactic,
/// semantic or connection error that stopped the analysis.
///
/// Examples:
///   tsxcheck --file pages/index.tsx
///   tsxcheck --example syntax-error --format json
///   cat page.tsx | tsxcheck --file -
///   tsxcheck --interactive --endpoint http://localhost:8080
///   tsxcheck --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// File containing the code to analyze (`-` reads stdin)
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["code", "example"])]
    pub file: Option<PathBuf>,

    /// Code to analyze, passed inline
    #[arg(long, value_name = "CODE", conflicts_with = "example")]
    pub code: Option<String>,

    /// Built-in example to analyze (see --list-examples)
    #[arg(short, long, value_name = "NAME")]
    pub example: Option<String>,

    /// Base URL of the analyzer service
    ///
    /// Requests are posted to `<URL>/analyze`. Default: from config or
    /// http://localhost:8080.
    #[arg(long, value_name = "URL", env = "TSXCHECK_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    ///
    /// By default no timeout is applied and a hung request stays pending.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (text, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tsxcheck.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Start an interactive prompt to edit, load and analyze code
    #[arg(short, long)]
    pub interactive: bool,

    /// List the built-in examples and exit
    #[arg(long)]
    pub list_examples: bool,

    /// Generate a default .tsxcheck.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal text (default)
    #[default]
    Text,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

/// Where the code to analyze comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSource {
    File(PathBuf),
    Stdin,
    Inline(String),
    Example(String),
    /// Nothing given: keep the default example.
    Default,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config || self.list_examples {
            return Ok(());
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("Endpoint URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref file) = self.file {
            if file.as_os_str() == "-" && self.interactive {
                return Err("Cannot read code from stdin in --interactive mode".to_string());
            }
            if file.as_os_str() != "-" && !file.is_file() {
                return Err(format!("File does not exist: {}", file.display()));
            }
        }

        Ok(())
    }

    /// The code source selected on the command line.
    pub fn code_source(&self) -> CodeSource {
        if let Some(ref file) = self.file {
            if file.as_os_str() == "-" {
                return CodeSource::Stdin;
            }
            return CodeSource::File(file.clone());
        }
        if let Some(ref code) = self.code {
            return CodeSource::Inline(code.clone());
        }
        if let Some(ref name) = self.example {
            return CodeSource::Example(name.clone());
        }
        CodeSource::Default
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
