//! Weight configuration.
//!
//! Weights are plain key → number pairs stored as a JSON object:
//! ```json
//! {
//!   "禱告會": 2.0,
//!   "主日崇拜": 1.0,
//!   "MD/BL/VL 加權倍數": 1.5
//! }
//! ```
//! A key naming a category sets that category's base weight and also scales
//! the category's column in the weighted breakdown.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Weight used for any category or bonus that is not configured.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Key holding the multiplier for leadership-role columns.
pub const BONUS_KEY: &str = "MD/BL/VL 加權倍數";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightConfig {
    entries: HashMap<String, f64>,
}

impl WeightConfig {
    /// Loads weights from a JSON object at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read weights at {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse weights: invalid JSON in {}", path.display()))?;
        Self::from_json(&value)
            .with_context(|| format!("Invalid weights in {}", path.display()))
    }

    /// Builds weights from a JSON object. Entries that are not numbers are
    /// skipped and fall back to [`DEFAULT_WEIGHT`].
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            bail!("weights must be a JSON object of key to number");
        };

        let mut entries = HashMap::new();
        for (key, value) in map {
            match value.as_f64() {
                Some(weight) => {
                    entries.insert(key.clone(), weight);
                }
                None => warn!(key = %key, value = %value, "Ignoring non-numeric weight"),
            }
        }

        debug!(weights = entries.len(), "Weights loaded");
        Ok(Self { entries })
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(key, weight)| (key.to_string(), weight))
                .collect(),
        }
    }

    /// Base weight for rows of `category`.
    pub fn category_weight(&self, category: &str) -> f64 {
        self.entries.get(category).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Multiplier for cells in leadership-role columns.
    pub fn bonus_multiplier(&self) -> f64 {
        self.entries.get(BONUS_KEY).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Secondary multiplier for a breakdown column, if one is configured.
    pub fn column_weight(&self, column: &str) -> Option<f64> {
        self.entries.get(column).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
