//! REPL - conversational loop over one agent.
//!
//! Lines starting with a known command word are commands, everything else is
//! a question for the agent.

use anyhow::Result;
use insight_common::interaction_log::RECENT_WINDOW;
use insight_common::Agent;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

use crate::{memory_store, output};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Exit,
    Help,
    Memory,
    Search(String),
    Clear,
    Export(PathBuf),
    Import(PathBuf),
    Overview,
    Ask(String),
    Empty,
}

/// Parse one input line. Commands need their argument; a bare `search`
/// or `export` falls through as a question.
pub fn parse(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word.to_lowercase().as_str(), rest.is_empty()) {
        ("exit" | "quit" | "sair", true) => ReplCommand::Exit,
        ("help" | "ajuda", true) => ReplCommand::Help,
        ("memory" | "memoria" | "memória", true) => ReplCommand::Memory,
        ("clear", true) => ReplCommand::Clear,
        ("overview", true) => ReplCommand::Overview,
        ("search", false) => ReplCommand::Search(rest.to_string()),
        ("export", false) => ReplCommand::Export(PathBuf::from(rest)),
        ("import", false) => ReplCommand::Import(PathBuf::from(rest)),
        _ => ReplCommand::Ask(line.to_string()),
    }
}

fn print_prompt() {
    print!("insight> ");
    let _ = io::stdout().flush();
}

/// Run until `exit` or end of input
pub fn run<R: BufRead>(agent: &mut Agent, input: R) -> Result<()> {
    println!("Insight - ask about the dataset, or type 'help'.");
    let mut lines = input.lines();

    loop {
        print_prompt();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                warn!(error = %e, "failed to read input");
                output::display_error(&format!("Error reading input: {}", e));
                continue;
            }
            None => break,
        };

        match parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => break,
            ReplCommand::Help => output::display_repl_help(),
            ReplCommand::Memory => {
                output::display_summary(&agent.memory_summary());
                output::display_interactions(&agent.recent_memory(RECENT_WINDOW));
                println!();
            }
            ReplCommand::Search(term) => {
                output::display_interactions(&agent.search_memory(&term));
                println!();
            }
            ReplCommand::Clear => {
                agent.clear_memory();
                output::display_success("Interaction log cleared");
            }
            ReplCommand::Export(path) => match memory_store::save_from(agent, &path) {
                Ok(count) => output::display_success(&format!(
                    "{} interaction(s) written to {}",
                    count,
                    path.display()
                )),
                Err(e) => output::display_error(&format!("{:#}", e)),
            },
            ReplCommand::Import(path) => match memory_store::load_into(agent, &path) {
                Ok(count) => output::display_success(&format!(
                    "{} interaction(s) loaded from {}",
                    count,
                    path.display()
                )),
                Err(e) => output::display_error(&format!("{:#}", e)),
            },
            ReplCommand::Overview => match agent.data_overview() {
                Ok(summary) => output::display_overview(&summary),
                Err(e) => output::display_error(&e.to_string()),
            },
            ReplCommand::Ask(question) => {
                let response = agent.process(&question);
                output::display_response(&response);
            }
        }
    }

    println!();
    Ok(())
}
