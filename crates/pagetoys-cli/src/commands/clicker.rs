use std::path::Path;

use clap::Subcommand;
use pagetoys_core::clicker::{self, ClickerData, ClickerGame, UPGRADE_TIP};
use pagetoys_core::storage::Database;
use pagetoys_core::{Config, CoreError, Event};

#[derive(Subcommand)]
pub enum ClickerAction {
    /// Gather one unit of a material
    Gather {
        material: String,
    },
    /// Hire a worker by index
    Hire {
        idx: usize,
    },
    /// Upgrade an item by index
    Upgrade {
        idx: usize,
    },
    /// Run production ticks (one per second of game time)
    Produce {
        #[arg(long, default_value = "1")]
        ticks: u32,
    },
    /// Print the game state as JSON
    Status,
    /// Start a new game
    Reset,
}

fn game_data(config: &Config) -> Result<ClickerData, CoreError> {
    match &config.clicker.data_path {
        Some(path) => ClickerData::from_path(Path::new(path)),
        None => Ok(ClickerData::sample()),
    }
}

/// Print a tip for rule violations; other errors propagate.
fn report(
    result: Result<Event, CoreError>,
    success_tip: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(event) => {
            println!("{}", serde_json::to_string(&event)?);
            if let Some(tip) = success_tip {
                println!("{}", serde_json::json!({ "type": "Tip", "message": tip }));
            }
        }
        Err(CoreError::Clicker(e)) => {
            println!("{}", serde_json::json!({ "type": "Tip", "message": e.to_string() }));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub fn run(action: ClickerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();

    let mut game = match action {
        ClickerAction::Reset => ClickerGame::new(game_data(&config)?),
        _ => {
            let data = game_data(&config)?;
            clicker::load_game(&db, || data)?
        }
    };

    match action {
        ClickerAction::Gather { material } => report(game.gather(&material), None)?,
        ClickerAction::Hire { idx } => report(game.hire(idx), None)?,
        ClickerAction::Upgrade { idx } => report(game.upgrade(idx), Some(UPGRADE_TIP))?,
        ClickerAction::Produce { ticks } => {
            for _ in 0..ticks {
                println!("{}", serde_json::to_string(&game.produce())?);
            }
        }
        ClickerAction::Status | ClickerAction::Reset => {
            println!("{}", serde_json::to_string_pretty(&game)?);
        }
    }

    clicker::save_game(&db, &game)?;
    Ok(())
}
