//! facfind search - Ranked faculty search
//!
//! Runs the hybrid engine: name tiers, keyword tiers and embedding
//! similarity, with the store as fallback.

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::core::Candidate;
use crate::error::Result;
use crate::search::{SearchOutcome, SearchPath};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (a name, topic or research area)
    pub query: String,

    /// Number of results; missing or non-positive uses the configured default
    #[arg(short, long, allow_negative_numbers = true)]
    pub k: Option<i64>,
}

#[derive(Serialize)]
struct SearchReport<'a> {
    query: &'a str,
    count: usize,
    path: SearchPath,
    recommendations: &'a [Candidate],
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let outcome = ctx.engine.search_with_outcome(&args.query, args.k);

    if ctx.is_json() {
        return emit_json(&SearchReport {
            query: &args.query,
            count: outcome.results.len(),
            path: outcome.path,
            recommendations: &outcome.results,
        });
    }

    display_human(&args.query, &outcome);
    Ok(())
}

fn display_human(query: &str, outcome: &SearchOutcome) {
    if outcome.results.is_empty() {
        println!("{} No faculty found for '{}'", "!".yellow(), query.cyan());
        if matches!(outcome.path, SearchPath::Fallback(_)) {
            println!();
            println!("Try:");
            println!("  - A shorter query or a single research keyword");
            println!("  - `facfind doctor` to check the search artifacts");
        }
        return;
    }

    println!(
        "{} results for '{}' ({}):",
        outcome.results.len().to_string().bold(),
        query.cyan(),
        outcome.path
    );
    println!();

    for (i, candidate) in outcome.results.iter().enumerate() {
        let rank = format!("{}.", i + 1);
        let record = &candidate.record;
        let name = record.display_name().unwrap_or("(unnamed)");
        let id = record.id.map_or_else(|| "-".to_string(), |id| id.to_string());

        println!(
            "{:>3} {} {} {} {}",
            rank.dimmed(),
            name.bold(),
            format!("#{id}").dimmed(),
            format!("{:.3}", candidate.similarity_score).green(),
            format!("[{}]", candidate.match_type).dimmed()
        );
        if let Some(faculty_type) = record.faculty_type.as_deref() {
            println!("    {} {}", "type:".dimmed(), faculty_type);
        }
        if let Some(research) = record.research.as_deref() {
            println!("    {} {}", "research:".dimmed(), truncate(research, 90));
        }
        if let Some(topics) = record.topics.as_deref() {
            println!("    {} {}", "topics:".dimmed(), truncate(topics, 90));
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééé", 6), "ééé...");
    }
}
