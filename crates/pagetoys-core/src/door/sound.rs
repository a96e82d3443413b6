//! Sound selection for a knock.
//!
//! A small independent chance overrides the tier and plays from the rare
//! bucket instead. Empty buckets are silent; they never fail.

use std::collections::BTreeMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use super::tier::TierTable;

pub const RARE_BUCKET: &str = "rare";

/// Source of the two random decisions a knock needs.
pub trait Dice {
    /// Uniform draw in `[0, 1)`.
    fn roll(&mut self) -> f64;
    /// Uniform index in `0..len`. Only called with `len > 0`.
    fn pick(&mut self, len: usize) -> usize;
}

/// [`Dice`] over any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDice<R>(pub R);

impl RngDice<Pcg64> {
    pub fn seeded(seed: u64) -> Self {
        Self(Pcg64::seed_from_u64(seed))
    }

    /// Seeded when a seed is configured, otherwise from OS entropy.
    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self(Pcg64::from_entropy()),
        }
    }
}

impl<R: RngCore> Dice for RngDice<R> {
    fn roll(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Named groups of interchangeable sound asset paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundBuckets(BTreeMap<String, Vec<String>>);

impl SoundBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(mut self, name: impl Into<String>, paths: Vec<String>) -> Self {
        self.0.insert(name.into(), paths);
        self
    }

    pub fn bucket(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Built-in asset set matching [`TierTable::canonical`].
    pub fn canonical() -> Self {
        let paths = |prefix: &str, n: usize| {
            (1..=n)
                .map(|i| format!("sounds/{prefix}-{i}.mp3"))
                .collect::<Vec<_>>()
        };
        Self::new()
            .with_bucket("light", paths("knock-wood", 3))
            .with_bucket("heavy", paths("knock-iron", 2))
            .with_bucket("reinforced", paths("knock-vault", 2))
            .with_bucket(RARE_BUCKET, paths("knock-rare", 2))
    }
}

/// Playback settings passed in by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundSettings {
    pub enabled: bool,
    pub rare_chance: f64,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rare_chance: 0.05,
        }
    }
}

/// A chosen sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundPick {
    pub path: String,
    pub rare: bool,
}

/// Choose the sound for the knock that brought the counter to `count`.
pub fn select<D: Dice + ?Sized>(
    count: u64,
    table: &TierTable,
    buckets: &SoundBuckets,
    settings: &SoundSettings,
    dice: &mut D,
) -> Option<SoundPick> {
    if !settings.enabled {
        return None;
    }

    let rare = buckets.bucket(RARE_BUCKET);
    if dice.roll() < settings.rare_chance && !rare.is_empty() {
        let path = rare[dice.pick(rare.len())].clone();
        return Some(SoundPick { path, rare: true });
    }

    let bucket = buckets.bucket(&table.resolve(count).bucket);
    if bucket.is_empty() {
        tracing::debug!(count, "no sound in tier bucket");
        return None;
    }
    let path = bucket[dice.pick(bucket.len())].clone();
    Some(SoundPick { path, rare: false })
}

/// Receives selected sounds. Playing is best effort.
pub trait SoundSink {
    fn play(&mut self, path: &str) -> Result<(), String>;
}

/// Sink that records every path it is asked to play.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub played: Vec<String>,
}

impl SoundSink for RecordingSink {
    fn play(&mut self, path: &str) -> Result<(), String> {
        self.played.push(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Dice that replays queued values; `pick` falls back to index 0.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedDice {
        pub rolls: VecDeque<f64>,
        pub picks: VecDeque<usize>,
    }

    impl ScriptedDice {
        pub(crate) fn rolls(rolls: &[f64]) -> Self {
            Self {
                rolls: rolls.iter().copied().collect(),
                picks: VecDeque::new(),
            }
        }
    }

    impl Dice for ScriptedDice {
        fn roll(&mut self) -> f64 {
            self.rolls.pop_front().unwrap_or(0.99)
        }

        fn pick(&mut self, len: usize) -> usize {
            self.picks.pop_front().unwrap_or(0).min(len - 1)
        }
    }

    #[test]
    fn common_draw_uses_tier_bucket() {
        let table = TierTable::canonical();
        let buckets = SoundBuckets::canonical();
        let mut dice = ScriptedDice::rolls(&[0.5]);
        let pick = select(1, &table, &buckets, &SoundSettings::default(), &mut dice).unwrap();
        assert_eq!(pick.path, "sounds/knock-wood-1.mp3");
        assert!(!pick.rare);
    }

    #[test]
    fn low_draw_overrides_to_rare() {
        let table = TierTable::canonical();
        let buckets = SoundBuckets::canonical();
        let mut dice = ScriptedDice::rolls(&[0.01]);
        dice.picks.push_back(1);
        let pick = select(20_000, &table, &buckets, &SoundSettings::default(), &mut dice).unwrap();
        assert_eq!(pick.path, "sounds/knock-rare-2.mp3");
        assert!(pick.rare);
    }

    #[test]
    fn draw_at_threshold_is_not_rare() {
        let table = TierTable::canonical();
        let buckets = SoundBuckets::canonical();
        let mut dice = ScriptedDice::rolls(&[0.05]);
        let pick = select(1_000, &table, &buckets, &SoundSettings::default(), &mut dice).unwrap();
        assert_eq!(pick.path, "sounds/knock-iron-1.mp3");
    }

    #[test]
    fn empty_rare_bucket_falls_through() {
        let table = TierTable::canonical();
        let buckets = SoundBuckets::new().with_bucket("light", vec!["a.mp3".into()]);
        let mut dice = ScriptedDice::rolls(&[0.0]);
        let pick = select(3, &table, &buckets, &SoundSettings::default(), &mut dice).unwrap();
        assert_eq!(pick.path, "a.mp3");
    }

    #[test]
    fn empty_tier_bucket_is_silent() {
        let table = TierTable::canonical();
        let buckets = SoundBuckets::new().with_bucket("light", Vec::new());
        let mut dice = ScriptedDice::rolls(&[0.9]);
        assert!(select(3, &table, &buckets, &SoundSettings::default(), &mut dice).is_none());
        assert!(select(5_000, &table, &buckets, &SoundSettings::default(), &mut dice).is_none());
    }

    #[test]
    fn disabled_settings_never_roll() {
        let table = TierTable::canonical();
        let buckets = SoundBuckets::canonical();
        let mut dice = ScriptedDice::rolls(&[0.01]);
        let settings = SoundSettings {
            enabled: false,
            ..SoundSettings::default()
        };
        assert!(select(1, &table, &buckets, &settings, &mut dice).is_none());
        assert_eq!(dice.rolls.len(), 1);
    }

    #[test]
    fn seeded_dice_are_reproducible() {
        let mut a = RngDice::seeded(7);
        let mut b = RngDice::seeded(7);
        for _ in 0..16 {
            assert_eq!(a.roll(), b.roll());
            let (x, y) = (a.pick(5), b.pick(5));
            assert_eq!(x, y);
            assert!(x < 5);
        }
    }

    #[test]
    fn buckets_deserialize_from_manifest() {
        let json = r#"{"light": ["w1.mp3", "w2.mp3"], "rare": []}"#;
        let buckets: SoundBuckets = serde_json::from_str(json).unwrap();
        assert_eq!(buckets.bucket("light").len(), 2);
        assert!(buckets.bucket("rare").is_empty());
        assert!(buckets.bucket("heavy").is_empty());
    }
}
