use clap::Subcommand;
use pagetoys_core::door::{DoorSetup, DoorWidget, RecordingSink, RngDice};
use pagetoys_core::storage::Database;
use pagetoys_core::{Config, Event};

#[derive(Subcommand)]
pub enum DoorAction {
    /// Knock on the door
    Knock {
        /// Number of knocks
        #[arg(long, default_value = "1")]
        times: u32,
        /// Play sounds for this run even if disabled in config
        #[arg(long)]
        sound: bool,
    },
    /// Reset the knock counter
    Reset,
    /// Print current count and tier as JSON
    Status,
}

pub fn run(action: DoorAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let setup = DoorSetup::from_config(&config.door);
    let dice = RngDice::from_seed_opt(config.door.seed);

    let (mut door, loaded) =
        DoorWidget::open(&db, dice, RecordingSink::default(), setup, chrono::Utc::now())?;
    print_events(&loaded)?;

    match action {
        DoorAction::Knock { times, sound } => {
            if sound {
                door.settings_mut().enabled = true;
            }
            let mut last = door.status();
            for _ in 0..times {
                last = door.click()?;
                print_events(&last.events)?;
            }
            last.events.clear();
            println!("{}", serde_json::to_string_pretty(&last)?);
        }
        DoorAction::Reset => {
            let outcome = door.reset()?;
            print_events(&outcome.events)?;
            println!("{}", serde_json::to_string_pretty(&door.status())?);
        }
        DoorAction::Status => {
            println!("{}", serde_json::to_string_pretty(&door.status())?);
        }
    }
    Ok(())
}

fn print_events(events: &[Event]) -> Result<(), serde_json::Error> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
