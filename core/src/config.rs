use serde::{Deserialize, Serialize};

use crate::model::{normalize_weight, Weight};

/// Engine-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Weight used by `Graph::add_connection_default`.
    pub default_weight: i64,
}

impl GraphConfig {
    /// The default weight after normalization.
    pub fn default_weight(&self) -> Weight {
        normalize_weight(self.default_weight)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { default_weight: 1 }
    }
}
