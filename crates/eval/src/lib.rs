//! pricerule rule evaluation engine -- decides whether a target record
//! satisfies a rule setting's condition chain and, if so, mutates the
//! record through the setting's modifier chain.
//!
//! The engine works on any record type implementing [`Record`]. Rule
//! settings come from the caller or, for jump and jump-return modifiers,
//! from a [`pricerule_storage::RuleSupply`].
//!
//! ```ignore
//! let engine = RuleEngine::new(MemorySupply::with_settings(&settings)?);
//! let passed = engine.apply_settings(&mut booking, &settings)?;
//! ```

pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod modifier;
pub mod record;

pub use condition::check_condition;
pub use config::EngineConfig;
pub use engine::{check_sequence, RuleEngine, SettingOutcome};
pub use error::EngineError;
pub use modifier::apply_modifier;
pub use record::{DynamicRecord, FieldError, FieldKind, FieldValue, Record};
