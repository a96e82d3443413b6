//! # pagetoys Core Library
//!
//! The interactive widgets of a small personal website, as plain state
//! machines. Front-ends (the bundled CLI, or a page) feed in clicks and clock
//! ticks and render the returned events.
//!
//! ## Architecture
//!
//! - **Door knocker**: persisted click counter with idle expiry, threshold
//!   tiers driving image and sound, and a rare-sound easter egg
//! - **Countdown**: remaining-time rendering toward a fixed target, with a
//!   self-stopping ticker
//! - **Includes**: header/footer fragment composition with per-page titles
//! - **Clicker**: material/worker/item upgrade game
//! - **Storage**: SQLite key-value state and TOML configuration
//!
//! ## Key Components
//!
//! - [`DoorWidget`]: click/reset handling over a [`KvStore`]
//! - [`TierTable`]: shared threshold resolver
//! - [`CountdownTicker`]: countdown state machine
//! - [`ClickerGame`]: clicker game state
//! - [`Config`]: widget configuration

pub mod clicker;
pub mod countdown;
pub mod door;
pub mod error;
pub mod events;
pub mod include;
pub mod storage;

pub use clicker::{ClickerData, ClickerGame};
pub use countdown::{Countdown, CountdownTicker, Remaining};
pub use door::{DoorSetup, DoorWidget, KnockOutcome, SoundBuckets, SoundSettings, TierTable};
pub use error::{ClickerError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database, KvStore, MemoryStore};
