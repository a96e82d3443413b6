use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Something bought with materials: a worker or an item upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    /// Material name to amount spent per purchase.
    #[serde(default)]
    pub materials: IndexMap<String, u64>,
}

impl Recipe {
    /// Cost of one material; unlisted materials cost nothing.
    pub fn cost(&self, material: &str) -> u64 {
        self.materials.get(material).copied().unwrap_or(0)
    }
}

/// Contents of `items.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickerData {
    #[serde(default)]
    pub workers: Vec<Recipe>,
    pub items: Vec<Recipe>,
}

impl ClickerData {
    pub fn from_json(json: &str) -> Result<Self> {
        let data: ClickerData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::EmptyCollection("items".into()));
        }
        Ok(())
    }

    /// Material names, in the order the first item lists them.
    pub fn material_names(&self) -> Vec<String> {
        self.items
            .first()
            .map(|item| item.materials.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Four materials, one worker per material, three items.
    pub fn sample() -> Self {
        let recipe = |name: &str, costs: [u64; 4]| Recipe {
            name: name.to_string(),
            materials: ["木頭", "石頭", "鐵礦", "金子"]
                .into_iter()
                .zip(costs)
                .map(|(m, c)| (m.to_string(), c))
                .collect(),
        };
        Self {
            workers: vec![
                recipe("伐木工", [10, 0, 0, 0]),
                recipe("採石工", [20, 10, 0, 0]),
                recipe("礦工", [30, 20, 10, 0]),
                recipe("淘金客", [50, 30, 20, 10]),
            ],
            items: vec![
                recipe("木劍", [5, 0, 0, 0]),
                recipe("石盾", [10, 15, 0, 0]),
                recipe("鐵甲", [20, 20, 25, 5]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn material_order_follows_first_item() {
        let data = ClickerData::from_json(indoc! {r#"
            {
              "workers": [{"name": "w", "materials": {"zinc": 1}}],
              "items": [
                {"name": "a", "materials": {"zinc": 1, "clay": 2, "amber": 3}},
                {"name": "b", "materials": {"amber": 1}}
              ]
            }
        "#})
        .unwrap();
        assert_eq!(data.material_names(), vec!["zinc", "clay", "amber"]);
        assert_eq!(data.items[1].cost("clay"), 0);
    }

    #[test]
    fn empty_items_rejected() {
        let err = ClickerData::from_json(r#"{"workers": [], "items": []}"#).unwrap_err();
        assert!(err.to_string().contains("items"));
    }

    #[test]
    fn sample_is_valid() {
        let data = ClickerData::sample();
        assert_eq!(data.material_names().len(), data.workers.len());
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(ClickerData::from_json(&json).unwrap(), data);
    }
}
