//! `door-stages.json` / `door-sounds.json` manifests.
//!
//! A manifest that is missing or malformed is reported and the built-in
//! canonical set is used instead.

use std::path::Path;

use serde::Deserialize;

use super::sound::SoundBuckets;
use super::tier::{Tier, TierStep, TierTable};
use crate::error::{CoreError, Result};

#[derive(Debug, Deserialize)]
struct StagesManifest {
    default: Tier,
    #[serde(default)]
    stages: Vec<TierStep>,
}

pub fn parse_stages(json: &str) -> Result<TierTable> {
    let manifest: StagesManifest = serde_json::from_str(json)?;
    Ok(TierTable::new(manifest.default, manifest.stages))
}

pub fn parse_sounds(json: &str) -> Result<SoundBuckets> {
    Ok(serde_json::from_str(json)?)
}

fn read_or_canonical<T>(
    path: Option<&Path>,
    what: &str,
    parse: fn(&str) -> Result<T>,
    canonical: fn() -> T,
) -> T {
    let Some(path) = path else {
        return canonical();
    };
    let parsed = std::fs::read_to_string(path)
        .map_err(CoreError::from)
        .and_then(|json| parse(&json));
    match parsed {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot load {what}, using built-in set");
            canonical()
        }
    }
}

pub fn load_stages(path: Option<&Path>) -> TierTable {
    read_or_canonical(path, "door stages", parse_stages, TierTable::canonical)
}

pub fn load_sounds(path: Option<&Path>) -> SoundBuckets {
    read_or_canonical(path, "door sounds", parse_sounds, SoundBuckets::canonical)
}
