use clap::Subcommand;
use learnease_core::{Database, FocusBlocker};

#[derive(Subcommand)]
pub enum BlockerAction {
    /// Turn the blocker on
    On,
    /// Turn the blocker off
    Off,
    /// Flip the blocker
    Toggle,
    /// Print whether the blocker is on
    Status,
    /// List blocked hosts
    List,
    /// Block a host
    Add { site: String },
    /// Unblock a host
    Remove { site: String },
    /// Check whether a URL would be blocked
    Check { url: String },
}

fn on_off(active: bool) -> &'static str {
    if active {
        "on"
    } else {
        "off"
    }
}

pub fn run(action: BlockerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let blocker = FocusBlocker::new(&db);

    match action {
        BlockerAction::On => {
            blocker.set_active(true)?;
            println!("on");
        }
        BlockerAction::Off => {
            blocker.set_active(false)?;
            println!("off");
        }
        BlockerAction::Toggle => println!("{}", on_off(blocker.toggle()?)),
        BlockerAction::Status => println!("{}", on_off(blocker.is_active()?)),
        BlockerAction::List => {
            for site in blocker.sites()? {
                println!("{site}");
            }
        }
        BlockerAction::Add { site } => {
            if blocker.add_site(&site)? {
                println!("blocked {site}");
            } else {
                println!("{site} is already blocked");
            }
        }
        BlockerAction::Remove { site } => {
            if blocker.remove_site(&site)? {
                println!("unblocked {site}");
            } else {
                println!("{site} was not blocked");
            }
        }
        BlockerAction::Check { url } => {
            let blocked = blocker.is_blocked(&url)?;
            println!("{}", if blocked { "blocked" } else { "allowed" });
        }
    }
    Ok(())
}
