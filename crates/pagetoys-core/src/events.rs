use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in a widget produces an Event.
/// The CLI prints them; front-ends render from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Knocked {
        count: u64,
        tier: String,
        /// Pulse generation after the restart.
        pulse: u64,
        at: DateTime<Utc>,
    },
    CounterReset {
        previous: u64,
        at: DateTime<Utc>,
    },
    /// Stored count was older than the idle window and was cleared on load.
    CounterExpired {
        previous: u64,
        idle_secs: i64,
        at: DateTime<Utc>,
    },
    SoundPlayed {
        path: String,
        rare: bool,
        at: DateTime<Utc>,
    },
    TierChanged {
        from: String,
        to: String,
        image: String,
        at: DateTime<Utc>,
    },
    CountdownTick {
        remaining_secs: i64,
        text: String,
        at: DateTime<Utc>,
    },
    CountdownFinished {
        text: String,
        at: DateTime<Utc>,
    },
    MaterialGathered {
        material: String,
        amount: u64,
        at: DateTime<Utc>,
    },
    WorkerHired {
        worker: String,
        count: u64,
        at: DateTime<Utc>,
    },
    ItemUpgraded {
        item: String,
        level: u64,
        at: DateTime<Utc>,
    },
    Produced {
        /// Material name and amount added this tick, in material order.
        gains: Vec<(String, u64)>,
        at: DateTime<Utc>,
    },
}
