//! tsxcheck - client for a remote Next.js/TSX code analyzer
//!
//! Stages a snippet, submits it to the analyzer service and renders the
//! verdict: a token list and optimization metrics, or a lexical,
//! syntactic, semantic or connection error.
//!
//! Exit codes:
//!   0 - The analyzer accepted the code
//!   1 - Runtime error (connection, config, unreadable input, etc.)
//!   2 - The analyzer reported a lexical, syntactic or semantic error

mod cli;
mod client;
mod config;
mod interactive;
mod models;
mod report;
mod session;
mod workflow;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, CodeSource, OutputFormat};
use client::HttpTransport;
use config::{Config, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use models::AnalysisOutcome;
use report::{RenderOptions, Report, ReportMetadata};
use session::{Session, DEFAULT_EXAMPLE};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config and --list-examples early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }
    if args.list_examples {
        println!("Built-in examples:\n{}", interactive::examples_listing());
        return Ok(());
    }

    // Initialize logging
    init_logging(&args);

    info!("tsxcheck v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .tsxcheck.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the analyzer endpoint, timeout and output format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run one analysis (or the interactive prompt). Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let transport = HttpTransport::new(&config.service.endpoint, config.service.timeout())
        .context("Failed to set up the analyzer client")?;
    let endpoint = transport.url().to_string();
    info!("Analyzer: {}", endpoint);

    let mut session = Session::new(transport);
    let source = stage_code(&mut session, &args).await?;
    let render_options = RenderOptions::from(&config.output);

    if args.interactive {
        interactive::run(&mut session, &render_options).await?;
        return Ok(0);
    }

    if !session.can_analyze() {
        bail!("Nothing to analyze: the code is empty");
    }

    let code_bytes = session.code().len();
    let start_time = Instant::now();
    session.analyze();

    let spinner = analysis_spinner(args.quiet);
    let outcome = session.resolve().await.cloned();
    spinner.finish_and_clear();

    let Some(outcome) = outcome else {
        bail!("Analysis ended without a result");
    };

    let report = Report::new(
        ReportMetadata {
            endpoint,
            source,
            code_bytes,
            analyzed_at: Utc::now(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        outcome,
    );

    let output = match config.output.format {
        OutputFormat::Text => report::render_text(&report.outcome, &render_options),
        OutputFormat::Markdown => report::generate_markdown_report(&report, &render_options),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(exit_code(&report.outcome))
}

/// Map an outcome to the process exit code.
fn exit_code(outcome: &AnalysisOutcome) -> i32 {
    if outcome.is_success() {
        return 0;
    }
    match outcome.kind() {
        Some(kind) if kind.is_code_error() => 2,
        _ => 1,
    }
}

/// Put the requested code into the session. Returns a label for the source.
async fn stage_code<T: client::AnalyzerTransport>(
    session: &mut Session<T>,
    args: &Args,
) -> Result<String> {
    match args.code_source() {
        CodeSource::File(path) => {
            let code = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            session.set_code(code);
            Ok(path.display().to_string())
        }
        CodeSource::Stdin => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("Failed to read code from stdin")?;
            session.set_code(code);
            Ok("stdin".to_string())
        }
        CodeSource::Inline(code) => {
            session.set_code(code);
            Ok("inline".to_string())
        }
        CodeSource::Example(name) => {
            if !session.load_example(&name) {
                bail!(
                    "Unknown example: {}. Use --list-examples to see the available ones",
                    name
                );
            }
            Ok(format!("example:{}", name))
        }
        CodeSource::Default => Ok(format!("example:{}", DEFAULT_EXAMPLE)),
    }
}

/// Spinner shown while the request is pending.
fn analysis_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} {elapsed}") {
        spinner.set_style(style);
    }
    spinner.set_message("Analyzing code...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
