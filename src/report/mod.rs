//! Rendering of analysis outcomes.

pub mod generator;

pub use generator::{
    generate_json_report, generate_markdown_report, render_text, RenderOptions, Report,
    ReportMetadata,
};
