//! Click/reset handling for the door widget.
//!
//! ## State Transitions
//!
//! ```text
//! click: count += 1 -> resolve tier -> play sound -> restart pulse
//! reset: count = 0  -> resolve tier
//! ```
//!
//! Each trigger runs to completion before the next one is accepted.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::assets::{load_sounds, load_stages};
use super::sound::{self, Dice, SoundBuckets, SoundPick, SoundSettings, SoundSink};
use super::store::CounterStore;
use super::tier::{Tier, TierTable};
use crate::error::Result;
use crate::events::Event;
use crate::storage::{DoorConfig, KvStore};

/// Visual pulse flag. The flag stays set after the first click; each restart
/// bumps the generation, which is what a renderer watches to replay the pulse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pulse {
    pub active: bool,
    pub generation: u64,
}

impl Pulse {
    pub fn restart(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = true;
    }
}

/// What a trigger produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnockOutcome {
    pub count: u64,
    pub tier: Tier,
    pub tier_changed: bool,
    pub sound: Option<SoundPick>,
    pub pulse: Pulse,
    pub label: String,
    pub events: Vec<Event>,
}

/// Everything the handler needs besides storage and randomness.
#[derive(Debug, Clone)]
pub struct DoorSetup {
    pub tiers: TierTable,
    pub buckets: SoundBuckets,
    pub sound: SoundSettings,
    pub expiry: Duration,
    /// Counter text; `{count}` is replaced.
    pub label: String,
}

impl Default for DoorSetup {
    fn default() -> Self {
        Self {
            tiers: TierTable::canonical(),
            buckets: SoundBuckets::canonical(),
            sound: SoundSettings::default(),
            expiry: Duration::hours(1),
            label: "拍門次數：{count}".into(),
        }
    }
}

impl DoorSetup {
    /// Build from configuration, loading asset manifests when configured.
    pub fn from_config(config: &DoorConfig) -> Self {
        Self {
            tiers: load_stages(config.stages_path.as_deref().map(Path::new)),
            buckets: load_sounds(config.sounds_path.as_deref().map(Path::new)),
            sound: SoundSettings {
                enabled: config.sound_enabled,
                rare_chance: config.rare_chance,
            },
            expiry: i64::try_from(config.expiry_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            label: config.counter_label.clone(),
        }
    }
}

pub struct DoorWidget<S, D, K> {
    counter: CounterStore<S>,
    dice: D,
    sink: K,
    setup: DoorSetup,
    tier_name: String,
    pulse: Pulse,
}

impl<S: KvStore, D: Dice, K: SoundSink> DoorWidget<S, D, K> {
    /// Load the persisted counter and resolve the starting tier.
    ///
    /// Returns the widget and any event raised while loading (expiry).
    pub fn open(
        store: S,
        dice: D,
        sink: K,
        setup: DoorSetup,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<Event>)> {
        let mut counter = CounterStore::new(store, setup.expiry);
        let loaded = counter.load(now)?;

        let mut events = Vec::new();
        if let Some(previous) = loaded.expired_from {
            events.push(Event::CounterExpired {
                previous,
                idle_secs: (now - loaded.state.last_interaction).num_seconds(),
                at: now,
            });
        }

        let tier_name = setup.tiers.resolve(loaded.state.count).name.clone();
        Ok((
            Self {
                counter,
                dice,
                sink,
                setup,
                tier_name,
                pulse: Pulse::default(),
            },
            events,
        ))
    }

    pub fn count(&self) -> u64 {
        self.counter.count()
    }

    pub fn tier(&self) -> &Tier {
        self.setup.tiers.resolve(self.counter.count())
    }

    pub fn pulse(&self) -> Pulse {
        self.pulse
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn settings_mut(&mut self) -> &mut SoundSettings {
        &mut self.setup.sound
    }

    pub fn label(&self) -> String {
        self.setup
            .label
            .replace("{count}", &self.counter.count().to_string())
    }

    /// Current state without mutating anything.
    pub fn status(&self) -> KnockOutcome {
        KnockOutcome {
            count: self.count(),
            tier: self.tier().clone(),
            tier_changed: false,
            sound: None,
            pulse: self.pulse,
            label: self.label(),
            events: Vec::new(),
        }
    }

    pub fn click(&mut self) -> Result<KnockOutcome> {
        self.click_at(Utc::now())
    }

    pub fn click_at(&mut self, now: DateTime<Utc>) -> Result<KnockOutcome> {
        let state = self.counter.increment(now)?;
        let mut events = Vec::new();
        let tier_changed = self.retier(now, &mut events);

        let sound = sound::select(
            state.count,
            &self.setup.tiers,
            &self.setup.buckets,
            &self.setup.sound,
            &mut self.dice,
        );
        if let Some(pick) = &sound {
            match self.sink.play(&pick.path) {
                Ok(()) => events.push(Event::SoundPlayed {
                    path: pick.path.clone(),
                    rare: pick.rare,
                    at: now,
                }),
                Err(e) => tracing::warn!(path = %pick.path, error = %e, "sound playback failed"),
            }
        }

        self.pulse.restart();
        events.insert(
            0,
            Event::Knocked {
                count: state.count,
                tier: self.tier_name.clone(),
                pulse: self.pulse.generation,
                at: now,
            },
        );

        Ok(KnockOutcome {
            count: state.count,
            tier: self.tier().clone(),
            tier_changed,
            sound,
            pulse: self.pulse,
            label: self.label(),
            events,
        })
    }

    pub fn reset(&mut self) -> Result<KnockOutcome> {
        self.reset_at(Utc::now())
    }

    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Result<KnockOutcome> {
        let previous = self.counter.count();
        self.counter.reset(now)?;
        let mut events = vec![Event::CounterReset { previous, at: now }];
        let tier_changed = self.retier(now, &mut events);

        Ok(KnockOutcome {
            count: 0,
            tier: self.tier().clone(),
            tier_changed,
            sound: None,
            pulse: self.pulse,
            label: self.label(),
            events,
        })
    }

    fn retier(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) -> bool {
        let tier = self.setup.tiers.resolve(self.counter.count());
        if tier.name == self.tier_name {
            return false;
        }
        tracing::debug!(from = %self.tier_name, to = %tier.name, "door tier changed");
        events.push(Event::TierChanged {
            from: std::mem::replace(&mut self.tier_name, tier.name.clone()),
            to: tier.name.clone(),
            image: tier.image.clone(),
            at: now,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::sound::tests::ScriptedDice;
    use crate::door::sound::RecordingSink;
    use crate::door::store::{COUNT_KEY, LAST_INTERACTION_KEY};
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn seed(store: &MemoryStore, count: u64) {
        store.kv_set(COUNT_KEY, &count.to_string()).unwrap();
        store
            .kv_set(LAST_INTERACTION_KEY, &at(0).timestamp_millis().to_string())
            .unwrap();
    }

    fn widget<'a>(
        store: &'a MemoryStore,
        rolls: &[f64],
    ) -> DoorWidget<&'a MemoryStore, ScriptedDice, RecordingSink> {
        let (w, events) = DoorWidget::open(
            store,
            ScriptedDice::rolls(rolls),
            RecordingSink::default(),
            DoorSetup::default(),
            at(1),
        )
        .unwrap();
        assert!(events.is_empty());
        w
    }

    #[test]
    fn first_click_plays_light_sound() {
        let store = MemoryStore::new();
        let mut door = widget(&store, &[0.5]);
        let out = door.click_at(at(2)).unwrap();

        assert_eq!(out.count, 1);
        assert_eq!(out.tier.name, "default");
        assert!(!out.tier_changed);
        assert_eq!(door.sink().played, vec!["sounds/knock-wood-1.mp3".to_string()]);
        assert_eq!(out.label, "拍門次數：1");
    }

    #[test]
    fn click_at_999_flips_to_iron() {
        let store = MemoryStore::new();
        seed(&store, 999);
        let mut door = widget(&store, &[0.5]);
        assert_eq!(door.tier().name, "default");

        let out = door.click_at(at(2)).unwrap();
        assert_eq!(out.count, 1_000);
        assert_eq!(out.tier.name, "iron");
        assert!(out.tier_changed);
        assert!(out.events.iter().any(|e| matches!(
            e,
            Event::TierChanged { to, .. } if to == "iron"
        )));
        assert_eq!(door.sink().played, vec!["sounds/knock-iron-1.mp3".to_string()]);
    }

    #[test]
    fn reset_returns_to_default_without_sound() {
        let store = MemoryStore::new();
        seed(&store, 12_000);
        let mut door = widget(&store, &[]);
        assert_eq!(door.tier().name, "vault");

        let out = door.reset_at(at(5)).unwrap();
        assert_eq!(out.count, 0);
        assert_eq!(out.tier.name, "default");
        assert!(out.tier_changed);
        assert!(out.sound.is_none());
        assert!(door.sink().played.is_empty());
        assert_eq!(out.pulse.generation, 0);
    }

    #[test]
    fn every_click_restarts_pulse() {
        let store = MemoryStore::new();
        let mut door = widget(&store, &[0.5, 0.5, 0.5]);
        let generations: Vec<u64> = (0..3)
            .map(|i| door.click_at(at(2 + i)).unwrap().pulse.generation)
            .collect();
        assert_eq!(generations, vec![1, 2, 3]);
        assert!(door.pulse().active);
    }

    #[test]
    fn muted_widget_is_silent() {
        let store = MemoryStore::new();
        let mut door = widget(&store, &[0.01]);
        door.settings_mut().enabled = false;
        let out = door.click_at(at(2)).unwrap();
        assert!(out.sound.is_none());
        assert!(door.sink().played.is_empty());
        assert_eq!(out.count, 1);
    }

    #[test]
    fn failing_sink_does_not_fail_click() {
        struct Broken;
        impl SoundSink for Broken {
            fn play(&mut self, _path: &str) -> Result<(), String> {
                Err("no audio device".into())
            }
        }

        let store = MemoryStore::new();
        let (mut door, _) = DoorWidget::open(
            &store,
            ScriptedDice::rolls(&[0.5]),
            Broken,
            DoorSetup::default(),
            at(0),
        )
        .unwrap();
        let out = door.click_at(at(1)).unwrap();
        assert_eq!(out.count, 1);
        assert!(out.sound.is_some());
        assert!(!out
            .events
            .iter()
            .any(|e| matches!(e, Event::SoundPlayed { .. })));
    }

    #[test]
    fn setup_follows_config() {
        let config = DoorConfig {
            sound_enabled: true,
            rare_chance: 0.2,
            expiry_secs: 60,
            ..DoorConfig::default()
        };
        let setup = DoorSetup::from_config(&config);
        assert!(setup.sound.enabled);
        assert_eq!(setup.sound.rare_chance, 0.2);
        assert_eq!(setup.expiry, Duration::seconds(60));
        assert_eq!(setup.tiers, TierTable::canonical());
    }

    #[test]
    fn huge_expiry_saturates() {
        let config = DoorConfig {
            expiry_secs: 10_000_000_000_000_000,
            ..DoorConfig::default()
        };
        let setup = DoorSetup::from_config(&config);
        assert_eq!(setup.expiry, Duration::MAX);

        let config = DoorConfig {
            expiry_secs: u64::MAX,
            ..DoorConfig::default()
        };
        let store = MemoryStore::new();
        seed(&store, 3);
        let (door, events) = DoorWidget::open(
            &store,
            ScriptedDice::default(),
            RecordingSink::default(),
            DoorSetup::from_config(&config),
            at(10 * 365 * 86_400),
        )
        .unwrap();
        assert_eq!(door.count(), 3);
        assert!(events.is_empty());
    }

    #[test]
    fn stale_counter_expires_on_open() {
        let store = MemoryStore::new();
        seed(&store, 42);
        let (door, events) = DoorWidget::open(
            &store,
            ScriptedDice::default(),
            RecordingSink::default(),
            DoorSetup::default(),
            at(2 * 3_600),
        )
        .unwrap();
        assert_eq!(door.count(), 0);
        assert!(matches!(
            events.as_slice(),
            [Event::CounterExpired { previous: 42, .. }]
        ));
    }
}
