mod assets;
mod handler;
mod sound;
mod store;
mod tier;

pub use assets::{load_sounds, load_stages, parse_sounds, parse_stages};
pub use handler::{DoorSetup, DoorWidget, KnockOutcome, Pulse};
pub use sound::{
    select as select_sound, Dice, RecordingSink, RngDice, SoundBuckets, SoundPick,
    SoundSettings, SoundSink, RARE_BUCKET,
};
pub use store::{CounterState, CounterStore, Loaded, COUNT_KEY, LAST_INTERACTION_KEY};
pub use tier::{parse_count, Tier, TierStep, TierTable};
