//! Count thresholds to door tiers.
//!
//! One table drives both the door image and the sound bucket, so the two can
//! never disagree about which tier a count is in.

use serde::{Deserialize, Serialize};

/// A discrete visual/audio state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    pub image: String,
    /// Sound bucket key in [`SoundBuckets`](super::SoundBuckets).
    pub bucket: String,
}

/// A tier that applies from `threshold` knocks upward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStep {
    pub threshold: u64,
    #[serde(flatten)]
    pub tier: Tier,
}

/// Ordered threshold table with a fallback tier below every threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTable {
    default: Tier,
    steps: Vec<TierStep>,
}

impl TierTable {
    /// Build a table. Steps may come in any order; they are kept sorted
    /// ascending by threshold.
    pub fn new(default: Tier, mut steps: Vec<TierStep>) -> Self {
        steps.sort_by_key(|s| s.threshold);
        Self { default, steps }
    }

    /// Wooden door, iron from 1000 knocks, vault from 10000.
    pub fn canonical() -> Self {
        Self::new(
            Tier {
                name: "default".into(),
                image: "images/door-wood.png".into(),
                bucket: "light".into(),
            },
            vec![
                TierStep {
                    threshold: 1_000,
                    tier: Tier {
                        name: "iron".into(),
                        image: "images/door-iron.png".into(),
                        bucket: "heavy".into(),
                    },
                },
                TierStep {
                    threshold: 10_000,
                    tier: Tier {
                        name: "vault".into(),
                        image: "images/door-vault.png".into(),
                        bucket: "reinforced".into(),
                    },
                },
            ],
        )
    }

    pub fn default_tier(&self) -> &Tier {
        &self.default
    }

    pub fn steps(&self) -> &[TierStep] {
        &self.steps
    }

    /// Highest-threshold tier whose threshold is `<= count`, else the default.
    pub fn resolve(&self, count: u64) -> &Tier {
        self.steps
            .iter()
            .rev()
            .find(|s| s.threshold <= count)
            .map(|s| &s.tier)
            .unwrap_or(&self.default)
    }

    /// Resolve from untrusted text. Negative or non-numeric input counts as zero.
    pub fn resolve_lenient(&self, raw: &str) -> &Tier {
        self.resolve(parse_count(raw))
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Parse a stored count. Anything that is not a non-negative integer is zero.
pub fn parse_count(raw: &str) -> u64 {
    raw.trim().parse::<u64>().unwrap_or(0)
}
