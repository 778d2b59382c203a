use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use learnease_core::journal::{Journal, DEFAULT_WORD_GOAL};
use learnease_core::text::goal_progress;
use learnease_core::{Config, Database, TextStats};
use serde_json::json;

#[derive(Args)]
pub struct TextArgs {
    /// File to analyse; reads stdin when omitted
    file: Option<PathBuf>,
    /// Word goal to measure against (defaults to the saved goal)
    #[arg(long)]
    goal: Option<u32>,
}

pub fn run(args: TextArgs) -> Result<(), Box<dyn std::error::Error>> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let goal = match args.goal {
        Some(goal) => goal,
        None => {
            let fallback = Config::load().map_or(DEFAULT_WORD_GOAL, |c| c.word_goal);
            let db = Database::open()?;
            Journal::new(&db).word_goal(fallback)?
        }
    };

    let stats = TextStats::compute(&text);
    let progress = goal_progress(stats.words, goal);
    let out = json!({
        "stats": stats,
        "goal": goal,
        "goalProgress": progress,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
