use clap::Subcommand;
use learnease_core::{Database, StickyNotes};

#[derive(Subcommand)]
pub enum NotesAction {
    /// Add a sticky note
    Add {
        text: String,
        /// Note color (CSS color string)
        #[arg(long)]
        color: Option<String>,
    },
    /// List notes as JSON
    List,
    /// Replace a note's text
    Update { id: String, text: String },
    /// Remove a note
    Remove { id: String },
    /// Remove every note
    Clear,
}

pub fn run(action: NotesAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let notes = StickyNotes::new(&db);

    match action {
        NotesAction::Add { text, color } => {
            let note = notes.add(&text, color.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&note)?);
        }
        NotesAction::List => {
            println!("{}", serde_json::to_string_pretty(&notes.list()?)?);
        }
        NotesAction::Update { id, text } => {
            let note = notes.update(&id, &text)?;
            println!("{}", serde_json::to_string_pretty(&note)?);
        }
        NotesAction::Remove { id } => {
            notes.remove(&id)?;
            println!("note {id} removed");
        }
        NotesAction::Clear => {
            notes.clear()?;
            println!("notes cleared");
        }
    }
    Ok(())
}
