//! Terminal output - plain ASCII markers, color for emphasis only.

use insight_common::data_service::DatasetSummary;
use insight_common::{AgentResponse, Interaction, LogSummary};
use owo_colors::OwoColorize;

const SEPARATOR: &str = "----------------------------------------";

/// Confidence rendered with the color of its band
fn confidence_label(confidence: f32) -> String {
    let text = format!("{:.2}", confidence);
    if confidence >= 0.9 {
        text.bright_green().to_string()
    } else if confidence >= 0.7 {
        text.yellow().to_string()
    } else {
        text.bright_red().to_string()
    }
}

pub fn display_response(response: &AgentResponse) {
    println!();
    if response.needs_human_help {
        println!(
            "{} {} {}  confidence: {}",
            "[HUMAN]".bright_red(),
            response.intent.indicator(),
            response.intent,
            confidence_label(response.confidence)
        );
    } else {
        println!(
            "{} {} {}  confidence: {}",
            "[OK]".bright_green(),
            response.intent.indicator(),
            response.intent,
            confidence_label(response.confidence)
        );
    }
    println!();
    println!("{}", response.response);

    if !response.data_used.is_empty() {
        println!();
        println!("[DATA]");
        for item in &response.data_used {
            println!("  * {}", item.cyan());
        }
    }

    if !response.insights.is_empty() {
        println!();
        println!("[INSIGHTS]");
        for insight in &response.insights {
            println!("  * {}", insight);
        }
    }

    if let Some(reason) = &response.help_reason {
        println!();
        println!("[REASON] {}", reason.yellow());
    }

    println!();
    println!("{}", SEPARATOR.dimmed());
    println!(
        "{}",
        format!(
            "quality {:.2} * insights {} * data {} * actions {}",
            response.quality.overall_score,
            yes_no(response.quality.has_insights),
            yes_no(response.quality.has_data),
            yes_no(response.quality.has_actions)
        )
        .dimmed()
    );
    println!();
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn display_summary(summary: &LogSummary) {
    println!();
    println!("[MEMORY] {} interaction(s)", summary.total.bold());
    if let (Some(avg), Some(min), Some(max)) = (
        summary.average_confidence,
        summary.min_confidence,
        summary.max_confidence,
    ) {
        println!(
            "  confidence: avg {}  min {}  max {}",
            confidence_label(avg),
            confidence_label(min),
            confidence_label(max)
        );
    }
    if let (Some(first), Some(last)) = (summary.first_timestamp, summary.last_timestamp) {
        println!(
            "  span: {} .. {}",
            first.format("%Y-%m-%d %H:%M:%S"),
            last.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
}

pub fn display_interactions(interactions: &[Interaction]) {
    if interactions.is_empty() {
        println!("{}", "  (no matches)".dimmed());
        return;
    }
    for interaction in interactions {
        println!(
            "  {} [{}] {}",
            interaction.timestamp.format("%H:%M:%S").dimmed(),
            confidence_label(interaction.confidence),
            interaction.user_input.bold()
        );
        let preview: String = interaction.agent_response.chars().take(120).collect();
        println!("    {}", preview);
    }
}

pub fn display_overview(summary: &DatasetSummary) {
    println!();
    println!("[DATASET]");
    println!("  records:        {}", summary.total_records);
    println!("  cities:         {}", summary.total_cities);
    println!("  states:         {}", summary.total_states);
    println!("  regions:        {}", summary.total_regions);
    println!("  avg population: {:.0}", summary.avg_population);
    println!("  avg gdp/capita: {:.2}", summary.avg_gdp_per_capita);
    println!("  avg unemployment: {:.2}%", summary.avg_unemployment_rate);
    println!("  avg education:  {:.3}", summary.avg_education_index);
    println!("  total gdp:      {:.0}", summary.total_gdp);
    println!();
}

pub fn display_repl_help() {
    println!();
    println!("Ask a question in plain language, or use a command:");
    println!("  {}            show interaction log summary", "memory".cyan());
    println!("  {}     search past interactions", "search <term>".cyan());
    println!("  {}             clear the interaction log", "clear".cyan());
    println!("  {}     write the log to a JSON file", "export <path>".cyan());
    println!("  {}     replace the log from a JSON file", "import <path>".cyan());
    println!("  {}          show dataset overview", "overview".cyan());
    println!("  {}              show this help", "help".cyan());
    println!("  {}         leave", "exit | sair".cyan());
    println!();
}

pub fn display_error(message: &str) {
    eprintln!();
    eprintln!("[ERROR] {}", message.red());
    eprintln!();
}

pub fn display_success(message: &str) {
    println!("[OK] {}", message.green());
}
