//! Clicker game state machine.
//!
//! Gathering adds one material. Workers and item upgrades are bought with
//! materials, all or nothing. Every `produce()` tick each worker type adds
//! its head count to the material at the same position.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::data::{ClickerData, Recipe};
use crate::error::{ClickerError, Result, ValidationError};
use crate::events::Event;

pub const UPGRADE_TIP: &str = "升級成功！";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickerGame {
    data: ClickerData,
    materials: IndexMap<String, u64>,
    workers: Vec<u64>,
    levels: Vec<u64>,
}

impl ClickerGame {
    pub fn new(data: ClickerData) -> Self {
        let materials = data
            .material_names()
            .into_iter()
            .map(|name| (name, 0))
            .collect();
        let workers = vec![0; data.workers.len()];
        let levels = vec![0; data.items.len()];
        Self {
            data,
            materials,
            workers,
            levels,
        }
    }

    /// Per-worker and per-item counters line up with the data file.
    pub fn is_consistent(&self) -> bool {
        self.workers.len() == self.data.workers.len() && self.levels.len() == self.data.items.len()
    }

    pub fn data(&self) -> &ClickerData {
        &self.data
    }

    pub fn materials(&self) -> &IndexMap<String, u64> {
        &self.materials
    }

    pub fn material(&self, name: &str) -> u64 {
        self.materials.get(name).copied().unwrap_or(0)
    }

    pub fn worker_count(&self, idx: usize) -> u64 {
        self.workers.get(idx).copied().unwrap_or(0)
    }

    pub fn level(&self, idx: usize) -> u64 {
        self.levels.get(idx).copied().unwrap_or(0)
    }

    pub fn gather(&mut self, material: &str) -> Result<Event> {
        self.gather_at(material, Utc::now())
    }

    pub fn gather_at(&mut self, material: &str, now: DateTime<Utc>) -> Result<Event> {
        let amount = self
            .materials
            .get_mut(material)
            .ok_or_else(|| ClickerError::UnknownMaterial(material.to_string()))?;
        *amount += 1;
        Ok(Event::MaterialGathered {
            material: material.to_string(),
            amount: *amount,
            at: now,
        })
    }

    pub fn hire(&mut self, idx: usize) -> Result<Event> {
        self.hire_at(idx, Utc::now())
    }

    pub fn hire_at(&mut self, idx: usize, now: DateTime<Utc>) -> Result<Event> {
        let worker = index(&self.data.workers, idx, "workers")?.clone();
        if !self.can_afford(&worker) {
            tracing::debug!(worker = %worker.name, "not enough materials to hire");
            return Err(ClickerError::CannotHire {
                worker: worker.name,
            }
            .into());
        }
        self.spend(&worker);
        self.workers[idx] += 1;
        Ok(Event::WorkerHired {
            worker: worker.name,
            count: self.workers[idx],
            at: now,
        })
    }

    pub fn upgrade(&mut self, idx: usize) -> Result<Event> {
        self.upgrade_at(idx, Utc::now())
    }

    pub fn upgrade_at(&mut self, idx: usize, now: DateTime<Utc>) -> Result<Event> {
        let item = index(&self.data.items, idx, "items")?.clone();
        if !self.can_afford(&item) {
            return Err(ClickerError::CannotUpgrade { item: item.name }.into());
        }
        self.spend(&item);
        self.levels[idx] += 1;
        Ok(Event::ItemUpgraded {
            item: item.name,
            level: self.levels[idx],
            at: now,
        })
    }

    pub fn produce(&mut self) -> Event {
        self.produce_at(Utc::now())
    }

    /// Worker `i` yields its head count of material `i`. Workers beyond the
    /// material list produce nothing.
    pub fn produce_at(&mut self, now: DateTime<Utc>) -> Event {
        let mut gains = Vec::new();
        for (count, (name, amount)) in self.workers.iter().zip(self.materials.iter_mut()) {
            *amount += count;
            gains.push((name.clone(), *count));
        }
        Event::Produced { gains, at: now }
    }

    fn can_afford(&self, recipe: &Recipe) -> bool {
        self.materials
            .iter()
            .all(|(name, have)| *have >= recipe.cost(name))
    }

    fn spend(&mut self, recipe: &Recipe) {
        for (name, have) in self.materials.iter_mut() {
            *have -= recipe.cost(name);
        }
    }
}

fn index<'a>(
    list: &'a [Recipe],
    idx: usize,
    collection: &str,
) -> Result<&'a Recipe, ValidationError> {
    list.get(idx).ok_or_else(|| ValidationError::OutOfBounds {
        collection: collection.to_string(),
        index: idx,
        len: list.len(),
    })
}
