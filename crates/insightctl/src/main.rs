//! Insight Control - command line front end for the analysis agent.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use insight_common::{Agent, AgentConfig};
use insightctl::{logging, memory_store, output, repl};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "insightctl")]
#[command(about = "Insight - rule-based data analysis agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Interaction log file, loaded at start and saved on exit
    #[arg(long, global = true)]
    memory_file: Option<PathBuf>,

    /// Answer from templates only, no HTTP calls
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// The question, quoted or as separate words
        #[arg(required = true)]
        question: Vec<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session (default)
    Chat,

    /// Show dataset overview
    Overview,

    /// Check that the text-generation backend answers
    Probe,
}

fn build_agent(config: &AgentConfig, offline: bool) -> Result<Agent> {
    let agent = if offline {
        Agent::offline(config)
    } else {
        Agent::new(config)
    };
    agent.context("failed to build agent")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AgentConfig::load(cli.config.as_deref()).context("failed to load config")?;
    logging::init(&config.log.level);

    let mut agent = build_agent(&config, cli.offline)?;
    if let Some(path) = &cli.memory_file {
        memory_store::load_into(&mut agent, path)?;
    }

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Ask { question, json } => {
            let response = agent.process(&question.join(" "));
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                output::display_response(&response);
            }
        }
        Commands::Chat => {
            let stdin = io::stdin();
            repl::run(&mut agent, stdin.lock())?;
        }
        Commands::Overview => {
            let summary = agent.data_overview().context("dataset unavailable")?;
            output::display_overview(&summary);
        }
        Commands::Probe => {
            agent
                .probe_llm()
                .map_err(|e| anyhow::anyhow!("text generation unavailable ({}): {}", e.code(), e))?;
            output::display_success("text generation backend is reachable");
        }
    }

    if let Some(path) = &cli.memory_file {
        let count = memory_store::save_from(&agent, path)?;
        info!(path = %path.display(), count, "interaction log saved");
    }

    Ok(())
}
