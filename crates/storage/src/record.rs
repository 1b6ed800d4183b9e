use pricerule_model::{Rule, RuleSetting};
use serde::{Deserialize, Serialize};

use crate::error::SupplyError;

/// A rule setting as stored in a backend row.
///
/// The scalar columns are stored as-is; the rule's condition and modifier
/// chains are stored as one JSON text blob in `rule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSettingRecord {
    pub id: String,
    pub enable: bool,
    pub break_on_fail: bool,
    pub sequence: i64,
    pub rule_id: String,
    pub rule_type: i64,
    /// JSON-encoded [`Rule`].
    pub rule: String,
}

impl RuleSettingRecord {
    /// Encode a setting into its stored row. An empty id is replaced by a
    /// fresh UUIDv4.
    pub fn from_setting(setting: &RuleSetting) -> Result<Self, SupplyError> {
        let id = if setting.id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            setting.id.clone()
        };
        Ok(RuleSettingRecord {
            id,
            enable: setting.enable,
            break_on_fail: setting.break_on_fail,
            sequence: setting.sequence,
            rule_id: setting.rule_id.clone(),
            rule_type: setting.rule_type,
            rule: setting.rule.to_blob()?,
        })
    }

    /// Decode the stored row back into a setting.
    pub fn into_setting(self) -> Result<RuleSetting, SupplyError> {
        let rule = Rule::from_blob(&self.rule)?;
        Ok(RuleSetting {
            id: self.id,
            enable: self.enable,
            break_on_fail: self.break_on_fail,
            sequence: self.sequence,
            rule_id: self.rule_id,
            rule_type: self.rule_type,
            rule,
        })
    }
}
