use serde::{Deserialize, Serialize};

/// Engine tuning. Every field has a default, so an empty TOML `[engine]`
/// table (or none at all) yields [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting of jump / jump-return transfers in one evaluation.
    pub max_jump_depth: usize,
    /// Skip settings whose `enable` flag is false.
    pub skip_disabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_jump_depth: 32,
            skip_disabled: false,
        }
    }
}
