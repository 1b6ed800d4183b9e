//! In-memory `RuleSupply` backed by stored rows.
//!
//! Settings are kept in their persisted form, so every save encodes the rule
//! blob and every fetch decodes it again.

use std::collections::BTreeMap;
use std::sync::RwLock;

use pricerule_model::RuleSetting;
use tracing::debug;

use crate::error::SupplyError;
use crate::record::RuleSettingRecord;
use crate::traits::RuleSupply;

/// Thread-safe in-memory rule supply, grouped by `rule_id`.
#[derive(Debug, Default)]
pub struct MemorySupply {
    groups: RwLock<BTreeMap<String, Vec<RuleSettingRecord>>>,
}

impl MemorySupply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a supply pre-loaded with `settings`.
    pub fn with_settings(settings: &[RuleSetting]) -> Result<Self, SupplyError> {
        let supply = Self::new();
        supply.save_rule_settings(settings)?;
        Ok(supply)
    }

    /// Stored rule ids with the number of settings under each.
    pub fn rule_ids(&self) -> Result<Vec<(String, usize)>, SupplyError> {
        let groups = self
            .groups
            .read()
            .map_err(|e| SupplyError::Backend(e.to_string()))?;
        Ok(groups
            .iter()
            .map(|(rule_id, rows)| (rule_id.clone(), rows.len()))
            .collect())
    }
}

impl RuleSupply for MemorySupply {
    fn fetch_rule_settings(
        &self,
        rule_id: &str,
        start_sequence: i64,
    ) -> Result<Vec<RuleSetting>, SupplyError> {
        let groups = self
            .groups
            .read()
            .map_err(|e| SupplyError::Backend(e.to_string()))?;
        let rows = groups.get(rule_id).ok_or_else(|| SupplyError::NotFound {
            rule_id: rule_id.to_string(),
        })?;

        let page = rows
            .iter()
            .filter(|row| row.sequence >= start_sequence)
            .cloned()
            .map(RuleSettingRecord::into_setting)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(rule_id, start_sequence, count = page.len(), "fetched rule settings");
        Ok(page)
    }

    fn save_rule_settings(&self, settings: &[RuleSetting]) -> Result<(), SupplyError> {
        // Encode everything before taking the lock so a codec failure stores nothing.
        let records = settings
            .iter()
            .map(RuleSettingRecord::from_setting)
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups = self
            .groups
            .write()
            .map_err(|e| SupplyError::Backend(e.to_string()))?;
        for record in records {
            // An id lives in exactly one group, even when its rule_id changes.
            for (rule_id, rows) in groups.iter_mut() {
                if *rule_id != record.rule_id {
                    rows.retain(|row| row.id != record.id);
                }
            }
            let rows = groups.entry(record.rule_id.clone()).or_default();
            match rows.iter_mut().find(|row| row.id == record.id) {
                Some(existing) => *existing = record,
                None => rows.push(record),
            }
        }
        groups.retain(|_, rows| !rows.is_empty());
        for rows in groups.values_mut() {
            rows.sort_by_key(|row| row.sequence);
        }
        debug!(count = settings.len(), "saved rule settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::run_conformance_suite;

    #[test]
    fn memory_supply_conformance() {
        let report = run_conformance_suite(MemorySupply::new);
        assert!(report.failed == 0, "{report}");
        assert!(report.total > 0);
    }

    #[test]
    fn rule_ids_counts_groups() {
        let supply = MemorySupply::with_settings(&[
            RuleSetting::new("base", 0, Default::default()),
            RuleSetting::new("base", 1, Default::default()),
            RuleSetting::new("promo", 0, Default::default()),
        ])
        .unwrap();
        assert_eq!(
            supply.rule_ids().unwrap(),
            vec![("base".to_string(), 2), ("promo".to_string(), 1)]
        );
    }

    #[test]
    fn moved_id_drops_its_old_group() {
        let mut setting = RuleSetting::new("a", 0, Default::default());
        setting.id = "fixed".to_string();
        let supply = MemorySupply::with_settings(std::slice::from_ref(&setting)).unwrap();

        setting.rule_id = "b".to_string();
        supply.save_rule_settings(&[setting]).unwrap();

        assert_eq!(supply.rule_ids().unwrap(), vec![("b".to_string(), 1)]);
        assert!(matches!(
            supply.fetch_rule_settings("a", 0),
            Err(SupplyError::NotFound { .. })
        ));
    }
}
