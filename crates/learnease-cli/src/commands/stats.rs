use chrono::NaiveDate;
use clap::Subcommand;
use learnease_core::{Database, StudyStats};

use super::date_or_today;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Weekly summary with streak, badges and insights
    Show {
        /// Day to summarise from (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Record focused minutes done outside the timer
    Focus {
        minutes: u32,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let stats = StudyStats::new(&db);

    match action {
        StatsAction::Show { date } => {
            let summary = stats.summary(date_or_today(date))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Focus { minutes, date } => {
            for badge in stats.record_focus(date_or_today(date), minutes)? {
                println!("badge earned: {badge}");
            }
            println!("recorded {minutes} minutes");
        }
    }
    Ok(())
}
