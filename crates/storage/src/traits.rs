use pricerule_model::RuleSetting;

use crate::error::SupplyError;

/// The supply of stored rule settings.
///
/// The engine calls [`fetch_rule_settings`](RuleSupply::fetch_rule_settings)
/// whenever a jump or jump-return modifier transfers control to another
/// rule chain. Fetching is synchronous: the calling evaluation blocks until
/// the page is returned.
///
/// ## Ordering
///
/// A fetched page contains only settings of the requested `rule_id` whose
/// `sequence` is at or after `start_sequence`, ordered ascending by
/// `sequence`.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` so one supply can back an engine
/// shared across threads.
pub trait RuleSupply: Send + Sync {
    /// Fetch the settings of `rule_id` starting at `start_sequence`.
    fn fetch_rule_settings(
        &self,
        rule_id: &str,
        start_sequence: i64,
    ) -> Result<Vec<RuleSetting>, SupplyError>;

    /// Persist a batch of settings. Settings with an empty id are assigned one.
    fn save_rule_settings(&self, settings: &[RuleSetting]) -> Result<(), SupplyError>;
}

impl<S: RuleSupply + ?Sized> RuleSupply for &S {
    fn fetch_rule_settings(
        &self,
        rule_id: &str,
        start_sequence: i64,
    ) -> Result<Vec<RuleSetting>, SupplyError> {
        (**self).fetch_rule_settings(rule_id, start_sequence)
    }

    fn save_rule_settings(&self, settings: &[RuleSetting]) -> Result<(), SupplyError> {
        (**self).save_rule_settings(settings)
    }
}
