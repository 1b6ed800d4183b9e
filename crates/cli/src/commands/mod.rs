pub(crate) mod eval;
pub(crate) mod validate;
pub(crate) mod weekday;

use std::path::Path;

use pricerule_eval::DynamicRecord;
use pricerule_model::RuleSetting;
use serde::de::DeserializeOwned;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|_| format!("error: {} file not found: {}", what, path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("error: invalid {} in {}: {}", what, path.display(), e))
}

/// A rule settings file is a JSON array of settings.
pub(crate) fn load_settings(path: &Path) -> Result<Vec<RuleSetting>, String> {
    read_json(path, "rules")
}

pub(crate) fn load_record(path: &Path) -> Result<DynamicRecord, String> {
    read_json(path, "record")
}
