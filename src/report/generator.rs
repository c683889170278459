//! Report generation.
//!
//! This module renders a resolved analysis outcome for the terminal, as a
//! Markdown document, or as JSON.

use crate::config::OutputConfig;
use crate::models::{AnalysisOutcome, ErrorKind, OptimizationMetrics, Token};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One of the three code-error panels.
///
/// Failures always render all three panels so the layout stays stable; only
/// the one matching the failure kind is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorPanel {
    pub kind: ErrorKind,
    pub active: bool,
}

/// Panels for a failure, in LEXICAL, SYNTACTIC, SEMANTIC order.
///
/// `None` for a success. A connection failure yields three inactive panels.
pub fn error_panels(outcome: &AnalysisOutcome) -> Option<[ErrorPanel; 3]> {
    let kind = outcome.kind()?;
    Some(ErrorKind::CODE_KINDS.map(|panel| ErrorPanel {
        kind: panel,
        active: panel == kind,
    }))
}

/// What to include when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_tokens: bool,
    pub show_optimized_code: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_tokens: true,
            show_optimized_code: true,
        }
    }
}

impl From<&OutputConfig> for RenderOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            show_tokens: config.show_tokens,
            show_optimized_code: config.show_optimized_code,
        }
    }
}

/// Context of a single analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Analyzer URL the request was posted to.
    pub endpoint: String,
    /// Where the code came from (file path, example name, ...).
    pub source: String,
    /// Size of the submitted code in bytes.
    pub code_bytes: usize,
    pub analyzed_at: DateTime<Utc>,
    pub duration_seconds: f64,
}

/// A resolved outcome with its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub outcome: AnalysisOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panels: Option<[ErrorPanel; 3]>,
}

impl Report {
    pub fn new(metadata: ReportMetadata, outcome: AnalysisOutcome) -> Self {
        let panels = error_panels(&outcome);
        Self {
            metadata,
            outcome,
            panels,
        }
    }
}

/// Render an outcome for the terminal.
pub fn render_text(outcome: &AnalysisOutcome, options: &RenderOptions) -> String {
    let mut output = String::new();

    match outcome {
        AnalysisOutcome::Success {
            message,
            tokens,
            optimization,
            server_memory_usage,
        } => {
            output.push_str(&format!("✅ {}\n", or_default(message, "Analysis complete")));

            if let Some(tokens) = tokens {
                output.push_str(&format!("   {} tokens found\n", tokens.len()));
                if options.show_tokens && !tokens.is_empty() {
                    output.push('\n');
                    output.push_str(&token_table_text(tokens));
                }
            }

            if let Some(metrics) = optimization {
                output.push('\n');
                output.push_str(&optimization_text(metrics, options));
            }

            if let Some(memory) = server_memory_usage {
                output.push_str(&format!("   Server memory: {}\n", memory));
            }
        }
        AnalysisOutcome::Failure {
            message,
            error_detail,
            kind,
        } => {
            output.push_str(&format!("❌ {}\n", or_default(message, "Analysis failed")));

            if *kind == ErrorKind::Connection {
                output.push_str(&format!("   🔌 {}\n", kind.title()));
            }

            if let Some(panels) = error_panels(outcome) {
                let row: Vec<String> = panels
                    .iter()
                    .map(|panel| {
                        let marker = if panel.active { "●" } else { "○" };
                        format!("{} {}", marker, panel.kind.title())
                    })
                    .collect();
                output.push_str(&format!("   {}\n", row.join("   ")));
            }

            if !error_detail.is_empty() {
                output.push_str(&format!("   Detail: {}\n", error_detail));
            }
        }
    }

    output
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn token_table_text(tokens: &[Token]) -> String {
    let line_width = tokens
        .iter()
        .map(|t| t.line.to_string().len())
        .max()
        .unwrap_or(0)
        .max("Line".len());
    let kind_width = tokens
        .iter()
        .map(|t| t.kind.chars().count())
        .max()
        .unwrap_or(0)
        .max("Type".len());

    let mut table = String::new();
    table.push_str(&format!(
        "   {:>lw$}  {:<kw$}  Value\n",
        "Line",
        "Type",
        lw = line_width,
        kw = kind_width
    ));
    for token in tokens {
        table.push_str(&format!(
            "   {:>lw$}  {:<kw$}  {}\n",
            token.line,
            token.kind,
            token.value,
            lw = line_width,
            kw = kind_width
        ));
    }
    table
}

fn optimization_text(metrics: &OptimizationMetrics, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("   Optimization:\n");
    section.push_str(&format!(
        "     Original size:  {} bytes\n",
        metrics.original_size
    ));
    section.push_str(&format!(
        "     Optimized size: {} bytes\n",
        metrics.optimized_size
    ));
    section.push_str(&format!(
        "     Reduction:      {:.2}% ({} bytes)\n",
        metrics.reduction_percentage,
        metrics.bytes_saved()
    ));

    if options.show_optimized_code {
        if let Some(ref code) = metrics.optimized_code {
            section.push_str("\n   Optimized code:\n");
            for line in code.lines() {
                section.push_str(&format!("     {}\n", line));
            }
        }
    }

    section
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &RenderOptions) -> String {
    let mut output = String::new();

    output.push_str("# tsxcheck Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_result_section(&report.outcome, options));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Analyzer:** {}\n", metadata.endpoint));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!("- **Code Size:** {} bytes\n", metadata.code_bytes));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the result section.
fn generate_result_section(outcome: &AnalysisOutcome, options: &RenderOptions) -> String {
    let mut section = String::new();

    section.push_str("## Result\n\n");

    match outcome {
        AnalysisOutcome::Success {
            message,
            tokens,
            optimization,
            server_memory_usage,
        } => {
            section.push_str(&format!(
                "✅ **{}**\n\n",
                or_default(message, "Analysis complete")
            ));

            if let Some(tokens) = tokens {
                section.push_str(&format!("{} tokens found.\n\n", tokens.len()));
                if options.show_tokens && !tokens.is_empty() {
                    section.push_str("### Tokens\n\n");
                    section.push_str("| Line | Token Type | Value |\n");
                    section.push_str("|:---:|:---|:---|\n");
                    for token in tokens {
                        section.push_str(&format!(
                            "| {} | {} | `{}` |\n",
                            token.line,
                            token.kind,
                            escape_cell(&token.value)
                        ));
                    }
                    section.push('\n');
                }
            }

            if let Some(metrics) = optimization {
                section.push_str("### Optimization\n\n");
                section.push_str("| Original | Optimized | Reduction |\n");
                section.push_str("|:---:|:---:|:---:|\n");
                section.push_str(&format!(
                    "| {} bytes | {} bytes | {:.2}% |\n\n",
                    metrics.original_size, metrics.optimized_size, metrics.reduction_percentage
                ));

                if options.show_optimized_code {
                    if let Some(ref code) = metrics.optimized_code {
                        section.push_str("<details>\n<summary>Optimized Code</summary>\n\n```tsx\n");
                        section.push_str(code);
                        section.push_str("\n```\n</details>\n\n");
                    }
                }
            }

            if let Some(memory) = server_memory_usage {
                section.push_str(&format!("*Server memory usage: {}*\n\n", memory));
            }
        }
        AnalysisOutcome::Failure {
            message,
            error_detail,
            kind,
        } => {
            section.push_str(&format!("❌ **{}**\n\n", or_default(message, "Analysis failed")));

            if *kind == ErrorKind::Connection {
                section.push_str(&format!("> 🔌 **{}**\n\n", kind.title()));
            }

            if let Some(panels) = error_panels(outcome) {
                section.push_str("| Panel | Status |\n");
                section.push_str("|:---|:---:|\n");
                for panel in panels {
                    let status = if panel.active { "**active**" } else { "inactive" };
                    section.push_str(&format!("| {} | {} |\n", panel.kind.title(), status));
                }
                section.push('\n');
            }

            if !error_detail.is_empty() {
                section.push_str(&format!("**Error detail:** {}\n\n", error_detail));
            }
        }
    }

    section
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('`', "'")
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by tsxcheck*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success_outcome() -> AnalysisOutcome {
        AnalysisOutcome::Success {
            message: "OK".to_string(),
            tokens: Some(vec![
                Token {
                    line: 1,
                    kind: "KEYWORD".to_string(),
                    value: "const".to_string(),
                },
                Token {
                    line: 12,
                    kind: "IDENTIFIER".to_string(),
                    value: "x".to_string(),
                },
            ]),
            optimization: Some(OptimizationMetrics {
                original_size: 100,
                optimized_size: 80,
                reduction_percentage: 20.0,
                optimized_code: Some("const x = 1;".to_string()),
            }),
            server_memory_usage: Some("0.42 MB".to_string()),
        }
    }

    fn syntax_failure() -> AnalysisOutcome {
        AnalysisOutcome::Failure {
            message: "Syntax error".to_string(),
            error_detail: "Unexpected end of input".to_string(),
            kind: ErrorKind::Syntactic,
        }
    }

    fn create_test_report(outcome: AnalysisOutcome) -> Report {
        Report::new(
            ReportMetadata {
                endpoint: "http://localhost:8080/analyze".to_string(),
                source: "example:home-page".to_string(),
                code_bytes: 12,
                analyzed_at: Utc::now(),
                duration_seconds: 0.25,
            },
            outcome,
        )
    }

    #[test]
    fn test_syntactic_failure_activates_only_its_panel() {
        let panels = error_panels(&syntax_failure()).unwrap();

        let active: Vec<ErrorKind> = panels.iter().filter(|p| p.active).map(|p| p.kind).collect();
        assert_eq!(active, vec![ErrorKind::Syntactic]);
        assert_eq!(
            panels.map(|p| p.kind),
            [ErrorKind::Lexical, ErrorKind::Syntactic, ErrorKind::Semantic]
        );
    }

    #[test]
    fn test_connection_failure_has_no_active_panel() {
        let panels = error_panels(&AnalysisOutcome::connection_failure("refused")).unwrap();
        assert!(panels.iter().all(|p| !p.active));
    }

    #[test]
    fn test_success_has_no_panels() {
        assert!(error_panels(&success_outcome()).is_none());
    }

    #[test]
    fn test_render_text_success() {
        let text = render_text(&success_outcome(), &RenderOptions::default());

        assert!(text.starts_with("✅ OK"));
        assert!(text.contains("2 tokens found"));
        assert!(text.contains("KEYWORD"));
        assert!(text.contains("IDENTIFIER"));
        assert!(text.contains("20.00%"));
        assert!(text.contains("const x = 1;"));
        assert!(text.contains("0.42 MB"));
    }

    #[test]
    fn test_render_text_respects_options() {
        let options = RenderOptions {
            show_tokens: false,
            show_optimized_code: false,
        };
        let text = render_text(&success_outcome(), &options);

        assert!(text.contains("2 tokens found"));
        assert!(!text.contains("IDENTIFIER"));
        assert!(!text.contains("Optimized code:"));
    }

    #[test]
    fn test_render_text_failure() {
        let text = render_text(&syntax_failure(), &RenderOptions::default());

        assert!(text.contains("❌ Syntax error"));
        assert!(text.contains("● Syntax error"));
        assert!(text.contains("○ Lexical error"));
        assert!(text.contains("○ Semantic error"));
        assert!(text.contains("Unexpected end of input"));
    }

    #[test]
    fn test_render_text_connection_failure() {
        let text = render_text(
            &AnalysisOutcome::connection_failure("connection refused"),
            &RenderOptions::default(),
        );

        assert!(text.contains("Error de Conexión"));
        assert!(text.contains("Connection error"));
        assert!(!text.contains("●"));
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown =
            generate_markdown_report(&create_test_report(success_outcome()), &RenderOptions::default());

        assert!(markdown.contains("# tsxcheck Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("example:home-page"));
        assert!(markdown.contains("| 1 | KEYWORD | `const` |"));
        assert!(markdown.contains("### Optimization"));
    }

    #[test]
    fn test_markdown_failure_panels() {
        let markdown =
            generate_markdown_report(&create_test_report(syntax_failure()), &RenderOptions::default());

        assert!(markdown.contains("| Syntax error | **active** |"));
        assert!(markdown.contains("| Lexical error | inactive |"));
        assert!(markdown.contains("**Error detail:** Unexpected end of input"));
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("`x`"), "'x'");
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report(syntax_failure())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["outcome"]["status"], "failure");
        assert_eq!(value["outcome"]["kind"], "SYNTACTIC");
        assert_eq!(value["panels"][1]["active"], true);
        assert_eq!(value["panels"][0]["active"], false);
        assert_eq!(value["metadata"]["source"], "example:home-page");
    }
}
