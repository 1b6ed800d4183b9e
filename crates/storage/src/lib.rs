//! pricerule-storage: where rule settings live between evaluations.
//!
//! The engine only ever reads through [`RuleSupply::fetch_rule_settings`];
//! authoring tools write through [`RuleSupply::save_rule_settings`].

pub mod conformance;
mod error;
mod memory;
mod record;
mod traits;

pub use error::SupplyError;
pub use memory::MemorySupply;
pub use record::RuleSettingRecord;
pub use traits::RuleSupply;
