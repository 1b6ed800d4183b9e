//! `pricerule.toml` loading.
//!
//! ```toml
//! [engine]
//! max_jump_depth = 8
//! skip_disabled = true
//! ```

use std::path::Path;

use pricerule_eval::EngineConfig;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CliConfig {
    #[serde(default)]
    pub engine: EngineConfig,
}

impl CliConfig {
    pub(crate) fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub(crate) fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("error reading config '{}': {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("error parsing config '{}': {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = CliConfig::parse("").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn engine_table_overrides_defaults() {
        let config = CliConfig::parse("[engine]\nskip_disabled = true\n").unwrap();
        assert!(config.engine.skip_disabled);
        assert_eq!(config.engine.max_jump_depth, 32);
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(CliConfig::parse("[server]\nport = 1\n").is_err());
    }
}
