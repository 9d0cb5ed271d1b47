//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Stack engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum elements per stack; `None` means unbounded
    #[serde(default)]
    pub max_depth: Option<u64>,
}

impl EngineConfig {
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    pub fn with_max_depth(max_depth: u64) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}
