use clap::Subcommand;
use learnease_core::reading::list_sessions;
use learnease_core::Database;

#[derive(Subcommand)]
pub enum ReadingAction {
    /// List saved reading sessions as JSON
    List,
}

pub fn run(action: ReadingAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ReadingAction::List => {
            let sessions = list_sessions(&db)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
