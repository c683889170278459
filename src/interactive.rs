//! Interactive prompt.
//!
//! Reads commands from stdin while replies are awaited concurrently, so a
//! new analysis can be triggered (or the code edited) while a previous
//! request is still pending. Each resolved outcome is printed as soon as it
//! arrives.

use crate::client::AnalyzerTransport;
use crate::report::{render_text, RenderOptions};
use crate::session::{Session, EXAMPLES};
use crate::workflow::WorkflowState;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "Commands:
  :analyze          analyze the staged code (again)
  :example <name>   stage a built-in example
  :examples         list the built-in examples
  :load <path>      stage the contents of a file
  :code <text>      stage inline code (\\n for new lines)
  :show             print the staged code
  :state            print the workflow state and last result
  :help             show this help
  :quit             exit";

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Analyze,
    Example(String),
    Examples,
    Load(PathBuf),
    Code(String),
    Show,
    State,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        ":analyze" | ":a" => Command::Analyze,
        ":example" | ":e" if !rest.is_empty() => Command::Example(rest.to_string()),
        ":examples" => Command::Examples,
        ":load" | ":l" if !rest.is_empty() => Command::Load(PathBuf::from(rest)),
        ":code" | ":c" => Command::Code(unescape(rest)),
        ":show" | ":s" => Command::Show,
        ":state" => Command::State,
        ":help" | ":h" | "?" => Command::Help,
        ":quit" | ":q" | ":exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}

/// Human-readable list of the built-in examples.
pub fn examples_listing() -> String {
    let width = EXAMPLES.iter().map(|s| s.name.len()).max().unwrap_or(0);
    EXAMPLES
        .iter()
        .map(|s| format!("  {:<width$}  {}", s.name, s.description, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run the prompt until `:quit` or end of input.
pub async fn run<T: AnalyzerTransport>(
    session: &mut Session<T>,
    options: &RenderOptions,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("tsxcheck interactive mode. Type :help for commands.");
    println!(
        "Staged {} bytes of code.",
        session.code().len()
    );

    let flow = loop {
        tokio::select! {
            resolved = session.poll_reply(), if session.is_pending() => {
                if resolved {
                    print_outcome(session, options);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    debug!("stdin closed");
                    break Flow::EndOfInput;
                };
                if handle_command(session, parse_command(&line), options).await == Flow::Quit {
                    break Flow::Quit;
                }
            }
        }
    };

    finish(session, options, flow).await;
    Ok(())
}

/// Wrap up after the prompt loop ends.
///
/// Piped input that ends with a request in flight still gets its result.
/// An explicit `:quit` leaves a pending request behind.
async fn finish<T: AnalyzerTransport>(
    session: &mut Session<T>,
    options: &RenderOptions,
    flow: Flow,
) {
    if !session.is_pending() {
        return;
    }
    match flow {
        Flow::EndOfInput => {
            if session.resolve().await.is_some() {
                print_outcome(session, options);
            }
        }
        Flow::Quit | Flow::Continue => {
            if let WorkflowState::Pending { generation } = session.state() {
                debug!("Leaving with request {} still pending", generation);
            }
        }
    }
}

fn print_outcome<T: AnalyzerTransport>(session: &Session<T>, options: &RenderOptions) {
    if let Some(outcome) = session.outcome() {
        println!("\n{}", render_text(outcome, options));
    }
}

/// Whether the prompt keeps going, and why it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
    EndOfInput,
}

/// Apply one command.
async fn handle_command<T: AnalyzerTransport>(
    session: &mut Session<T>,
    command: Command,
    options: &RenderOptions,
) -> Flow {
    match command {
        Command::Analyze => {
            if session.analyze() {
                println!("⏳ Analyzing code...");
            } else {
                println!("Nothing to analyze: the staged code is empty.");
            }
        }
        Command::Example(name) => {
            if session.load_example(&name) {
                println!("Staged example {} ({} bytes).", name, session.code().len());
            } else {
                println!("Unknown example: {}. Type :examples to list them.", name);
            }
        }
        Command::Examples => println!("{}", examples_listing()),
        Command::Load(path) => match tokio::fs::read_to_string(&path).await {
            Ok(code) => {
                session.set_code(code);
                println!("Staged {} ({} bytes).", path.display(), session.code().len());
            }
            Err(e) => println!("Failed to read {}: {}", path.display(), e),
        },
        Command::Code(code) => {
            session.set_code(code);
            println!("Staged {} bytes of code.", session.code().len());
        }
        Command::Show => {
            for (i, line) in session.code().lines().enumerate() {
                println!("{:>4} | {}", i + 1, line);
            }
        }
        Command::State => match session.state() {
            WorkflowState::Idle => println!("idle"),
            WorkflowState::Pending { generation } => {
                println!("pending (request {})", generation)
            }
            WorkflowState::Resolved {
                generation,
                outcome,
            } => {
                println!("resolved (request {})", generation);
                println!("\n{}", render_text(outcome, options));
            }
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => return Flow::Quit,
        Command::Empty => {}
        Command::Unknown(line) => println!("Unknown command: {}. Type :help for commands.", line),
    }
    Flow::Continue
}
