//! pricerule-model: rule setting data model shared by every pricerule crate.
//!
//! Rule definitions are data. A [`RuleSetting`] carries a [`Rule`] made of a
//! condition chain and a modifier chain, and is persisted with the rule
//! encoded as a single JSON text blob. Every enumeration in this crate is
//! stored as an integer code (see [`codes`]) and must round-trip exactly.

pub mod codes;
pub mod rule;
pub mod weekday;

pub use codes::{
    Comparator, ConditionKind, DataType, Operand, RuleSettingStep, SideKind, UnknownCode,
};
pub use rule::{ComplexValue, Condition, Modifier, Rule, RuleSetting, SelectionEntry};
pub use weekday::{weekday_epoch, weekday_from_name};
