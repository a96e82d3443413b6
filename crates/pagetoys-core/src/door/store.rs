//! Persisted knock counter with idle expiry.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::tier::parse_count;
use crate::error::Result;
use crate::storage::KvStore;

pub const COUNT_KEY: &str = "door.count";
pub const LAST_INTERACTION_KEY: &str = "door.last_interaction";

/// Counter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    pub count: u64,
    pub last_interaction: DateTime<Utc>,
}

/// Result of [`CounterStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loaded {
    pub state: CounterState,
    /// Count that was discarded because the idle window had passed.
    pub expired_from: Option<u64>,
}

/// Knock counter over any [`KvStore`].
///
/// Values live under [`COUNT_KEY`] and [`LAST_INTERACTION_KEY`] (epoch ms).
pub struct CounterStore<S> {
    store: S,
    expiry: Duration,
    state: CounterState,
}

impl<S: KvStore> CounterStore<S> {
    pub fn new(store: S, expiry: Duration) -> Self {
        Self {
            store,
            expiry,
            state: CounterState {
                count: 0,
                last_interaction: DateTime::<Utc>::default(),
            },
        }
    }

    /// One hour idle window.
    pub fn with_default_expiry(store: S) -> Self {
        Self::new(store, Duration::hours(1))
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    pub fn count(&self) -> u64 {
        self.state.count
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the persisted counter. A count idle for longer than the expiry
    /// window comes back as zero and the reset is written through.
    pub fn load(&mut self, now: DateTime<Utc>) -> Result<Loaded> {
        let count = self
            .store
            .kv_get(COUNT_KEY)?
            .map(|raw| parse_count(&raw))
            .unwrap_or(0);
        let last = self
            .store
            .kv_get(LAST_INTERACTION_KEY)?
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        self.state = CounterState {
            count,
            last_interaction: last.unwrap_or(now),
        };

        let mut expired_from = None;
        if let Some(last) = last {
            if count > 0 && now - last > self.expiry {
                tracing::info!(count, idle_secs = (now - last).num_seconds(), "door counter expired");
                expired_from = Some(count);
                self.state.count = 0;
                self.persist()?;
            }
        }

        Ok(Loaded {
            state: self.state,
            expired_from,
        })
    }

    pub fn increment(&mut self, now: DateTime<Utc>) -> Result<CounterState> {
        self.state.count = self.state.count.saturating_add(1);
        self.state.last_interaction = now;
        self.persist()?;
        Ok(self.state)
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> Result<CounterState> {
        self.state.count = 0;
        self.state.last_interaction = now;
        self.persist()?;
        Ok(self.state)
    }

    fn persist(&self) -> Result<()> {
        self.store.kv_set(COUNT_KEY, &self.state.count.to_string())?;
        self.store.kv_set(
            LAST_INTERACTION_KEY,
            &self.state.last_interaction.timestamp_millis().to_string(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn fresh_store_loads_zero() {
        let mut counter = CounterStore::with_default_expiry(MemoryStore::new());
        let loaded = counter.load(at(0)).unwrap();
        assert_eq!(loaded.state.count, 0);
        assert_eq!(loaded.expired_from, None);
    }

    #[test]
    fn increments_persist_across_loads() {
        let store = MemoryStore::new();
        {
            let mut counter = CounterStore::with_default_expiry(&store);
            counter.load(at(0)).unwrap();
            counter.increment(at(1)).unwrap();
            counter.increment(at(2)).unwrap();
        }
        let mut counter = CounterStore::with_default_expiry(&store);
        let loaded = counter.load(at(10)).unwrap();
        assert_eq!(loaded.state.count, 2);
        assert_eq!(loaded.state.last_interaction, at(2));
    }

    #[test]
    fn increments_from_five_reach_seven() {
        let store = MemoryStore::new();
        store.kv_set(COUNT_KEY, "5").unwrap();
        store
            .kv_set(LAST_INTERACTION_KEY, &at(0).timestamp_millis().to_string())
            .unwrap();
        let mut counter = CounterStore::with_default_expiry(&store);
        counter.load(at(1)).unwrap();
        counter.increment(at(2)).unwrap();
        let state = counter.increment(at(3)).unwrap();
        assert_eq!(state.count, 7);
    }

    #[test]
    fn idle_past_window_expires() {
        let store = MemoryStore::new();
        let mut counter = CounterStore::with_default_expiry(&store);
        counter.load(at(0)).unwrap();
        counter.increment(at(0)).unwrap();

        let mut later = CounterStore::with_default_expiry(&store);
        let loaded = later.load(at(3_601)).unwrap();
        assert_eq!(loaded.state.count, 0);
        assert_eq!(loaded.expired_from, Some(1));
        assert_eq!(store.kv_get(COUNT_KEY).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn exactly_one_hour_is_not_expired() {
        let store = MemoryStore::new();
        let mut counter = CounterStore::with_default_expiry(&store);
        counter.load(at(0)).unwrap();
        counter.increment(at(0)).unwrap();

        let mut later = CounterStore::with_default_expiry(&store);
        assert_eq!(later.load(at(3_600)).unwrap().state.count, 1);
    }

    #[test]
    fn reset_clears_and_stamps() {
        let store = MemoryStore::new();
        let mut counter = CounterStore::with_default_expiry(&store);
        counter.load(at(0)).unwrap();
        for i in 0..40 {
            counter.increment(at(i)).unwrap();
        }
        let state = counter.reset(at(100)).unwrap();
        assert_eq!(state.count, 0);
        assert_eq!(state.last_interaction, at(100));
        assert_eq!(store.kv_get(COUNT_KEY).unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn garbage_values_load_as_zero() {
        let store = MemoryStore::new();
        store.kv_set(COUNT_KEY, "NaN").unwrap();
        store.kv_set(LAST_INTERACTION_KEY, "yesterday").unwrap();
        let mut counter = CounterStore::with_default_expiry(&store);
        let loaded = counter.load(at(0)).unwrap();
        assert_eq!(loaded.state.count, 0);
        assert_eq!(loaded.state.last_interaction, at(0));
    }

    proptest! {
        #[test]
        fn increments_are_strictly_monotonic(start in 0u64..1_000_000, n in 1usize..50) {
            let store = MemoryStore::new();
            store.kv_set(COUNT_KEY, &start.to_string()).unwrap();
            store.kv_set(LAST_INTERACTION_KEY, &at(0).timestamp_millis().to_string()).unwrap();
            let mut counter = CounterStore::with_default_expiry(&store);
            counter.load(at(0)).unwrap();

            let mut previous = counter.count();
            for i in 0..n {
                let next = counter.increment(at(i as i64)).unwrap().count;
                prop_assert_eq!(next, previous + 1);
                previous = next;
            }
        }
    }
}
