use chrono::NaiveDate;
use clap::Subcommand;
use learnease_core::journal::DEFAULT_WORD_GOAL;
use learnease_core::{Config, Database, Journal};

use super::date_or_today;

#[derive(Subcommand)]
pub enum JournalAction {
    /// Save a journal entry
    Add {
        /// Entry text
        text: String,
        /// Entry date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List entries as JSON
    List,
    /// Remove the entry at INDEX (as listed)
    Remove { index: usize },
    /// Delete every entry
    Clear,
    /// Show or set the word goal
    Goal {
        /// New goal in words
        words: Option<u32>,
    },
}

pub fn run(action: JournalAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let journal = Journal::new(&db);

    match action {
        JournalAction::Add { text, date } => {
            let entry = journal.add(&text, date_or_today(date))?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        JournalAction::List => {
            let entries = journal.entries()?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        JournalAction::Remove { index } => {
            let removed = journal.remove(index)?;
            println!("removed entry from {}", removed.date);
        }
        JournalAction::Clear => {
            journal.clear()?;
            println!("journal cleared");
        }
        JournalAction::Goal { words: Some(words) } => {
            let goal = journal.set_word_goal(words)?;
            println!("{goal}");
        }
        JournalAction::Goal { words: None } => {
            let fallback = Config::load().map_or(DEFAULT_WORD_GOAL, |c| c.word_goal);
            println!("{}", journal.word_goal(fallback)?);
        }
    }
    Ok(())
}
