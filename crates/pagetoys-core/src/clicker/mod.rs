mod data;
mod game;

pub use data::{ClickerData, Recipe};
pub use game::{ClickerGame, UPGRADE_TIP};

use crate::error::Result;
use crate::storage::KvStore;

pub const STATE_KEY: &str = "clicker.state";

/// Restore the saved session, or start a new game from `data`.
///
/// A saved session that no longer parses, or whose counters do not line up
/// with its data, is discarded with a warning.
pub fn load_game<S: KvStore>(
    store: &S,
    data: impl FnOnce() -> ClickerData,
) -> Result<ClickerGame> {
    if let Some(json) = store.kv_get(STATE_KEY)? {
        match serde_json::from_str::<ClickerGame>(&json) {
            Ok(game) if game.is_consistent() => return Ok(game),
            Ok(_) => tracing::warn!("discarding clicker session with mismatched counters"),
            Err(e) => tracing::warn!(error = %e, "discarding unreadable clicker session"),
        }
    }
    Ok(ClickerGame::new(data()))
}

pub fn save_game<S: KvStore>(store: &S, game: &ClickerGame) -> Result<()> {
    store.kv_set(STATE_KEY, &serde_json::to_string(game)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn session_survives_save_and_load() {
        let store = MemoryStore::new();
        let mut game = load_game(&store, ClickerData::sample).unwrap();
        game.gather("金子").unwrap();
        save_game(&store, &game).unwrap();

        let restored = load_game(&store, ClickerData::sample).unwrap();
        assert_eq!(restored.material("金子"), 1);
    }

    #[test]
    fn mismatched_session_starts_over() {
        let store = MemoryStore::new();
        let json = serde_json::json!({
            "data": ClickerData::sample(),
            "materials": {"木頭": 100, "石頭": 100, "鐵礦": 100, "金子": 100},
            "workers": [],
            "levels": [],
        });
        store.kv_set(STATE_KEY, &json.to_string()).unwrap();

        let mut game = load_game(&store, ClickerData::sample).unwrap();
        assert!(game.is_consistent());
        assert_eq!(game.material("木頭"), 0);
        assert!(matches!(
            game.hire(0),
            Err(crate::CoreError::Clicker(crate::ClickerError::CannotHire { .. }))
        ));
    }

    #[test]
    fn corrupt_session_starts_over() {
        let store = MemoryStore::new();
        store.kv_set(STATE_KEY, "{\"materials\": 3}").unwrap();
        let game = load_game(&store, ClickerData::sample).unwrap();
        assert_eq!(game.material("木頭"), 0);
    }
}
