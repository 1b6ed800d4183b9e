//! Rule setting evaluation and rule chain orchestration.
//!
//! A setting's condition chain is evaluated in parallel (conditions only
//! read the record) and joined in chain order. If every condition holds,
//! the modifier chain runs sequentially in `sequence` order. Jump and
//! jump-return modifiers fetch another chain from the [`RuleSupply`] and
//! run it through [`RuleEngine::apply_settings`]:
//!
//! - **jump** replaces the rest of the current chain: the fetched chain's
//!   result becomes the setting's result and stops the enclosing chain.
//! - **jump-return** calls the fetched chain; if it fails the current
//!   setting fails, otherwise the current chain continues.

use pricerule_model::{Condition, DataType, Modifier, RuleSetting};
use pricerule_storage::RuleSupply;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::condition::check_condition;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::modifier::apply_modifier;
use crate::record::Record;

/// Outcome of applying one rule setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingOutcome {
    /// Conditions held and every modifier applied.
    pub passed: bool,
    /// The enclosing chain must stop here and report `passed` as its result.
    pub stop: bool,
}

impl SettingOutcome {
    const PASSED: SettingOutcome = SettingOutcome {
        passed: true,
        stop: false,
    };
    const FAILED: SettingOutcome = SettingOutcome {
        passed: false,
        stop: false,
    };
}

/// Check that settings are ordered by non-decreasing `sequence`.
pub fn check_sequence(settings: &[RuleSetting]) -> Result<(), EngineError> {
    match settings
        .windows(2)
        .position(|pair| pair[0].sequence > pair[1].sequence)
    {
        Some(index) => Err(EngineError::SettingNotInOrder {
            index: index + 1,
            previous: settings[index].sequence,
            next: settings[index + 1].sequence,
        }),
        None => Ok(()),
    }
}

/// The rule evaluation engine.
///
/// Holds the rule supply used to resolve jumps. The engine itself is
/// stateless between calls; the target record is borrowed for the duration
/// of one call only.
pub struct RuleEngine<S> {
    supply: S,
    config: EngineConfig,
}

impl<S: RuleSupply> RuleEngine<S> {
    pub fn new(supply: S) -> Self {
        Self::with_config(supply, EngineConfig::default())
    }

    pub fn with_config(supply: S, config: EngineConfig) -> Self {
        RuleEngine { supply, config }
    }

    /// Evaluate one condition.
    pub fn check_condition<R: Record + ?Sized>(
        &self,
        record: &R,
        condition: &Condition,
    ) -> Result<bool, EngineError> {
        check_condition(record, condition)
    }

    /// Apply one modifier outside any rule chain.
    ///
    /// A jump-return runs the referenced chain and reports its result. A
    /// jump has no chain to abandon here and is unsupported.
    pub fn apply_modifier<R: Record + Sync + ?Sized>(
        &self,
        record: &mut R,
        modifier: &Modifier,
    ) -> Result<bool, EngineError> {
        match modifier.data_type {
            DataType::JumpReturn => self.transfer(record, modifier, 0),
            _ => apply_modifier(record, modifier),
        }
    }

    /// Apply a single rule setting.
    pub fn apply_setting<R: Record + Sync + ?Sized>(
        &self,
        record: &mut R,
        setting: &RuleSetting,
    ) -> Result<SettingOutcome, EngineError> {
        self.apply_setting_at(record, setting, 0)
    }

    /// Apply a sequence-ordered list of settings.
    ///
    /// Returns the `passed` value of the first setting that signals a stop,
    /// or `true` when no setting does, even if some settings were skipped
    /// because their conditions failed.
    pub fn apply_settings<R: Record + Sync + ?Sized>(
        &self,
        record: &mut R,
        settings: &[RuleSetting],
    ) -> Result<bool, EngineError> {
        self.apply_settings_at(record, settings, 0)
    }

    /// Fetch the settings of `rule_id` from `start` and apply them.
    pub fn apply_rule<R: Record + Sync + ?Sized>(
        &self,
        record: &mut R,
        rule_id: &str,
        start: i64,
    ) -> Result<bool, EngineError> {
        let settings = self.fetch(rule_id, start)?;
        self.apply_settings_at(record, &settings, 0)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn apply_settings_at<R: Record + Sync + ?Sized>(
        &self,
        record: &mut R,
        settings: &[RuleSetting],
        depth: usize,
    ) -> Result<bool, EngineError> {
        check_sequence(settings)?;

        for setting in settings {
            if self.config.skip_disabled && !setting.enable {
                debug!(rule_id = %setting.rule_id, sequence = setting.sequence, "skipping disabled setting");
                continue;
            }
            let outcome = self.apply_setting_at(record, setting, depth)?;
            if outcome.stop {
                debug!(
                    rule_id = %setting.rule_id,
                    sequence = setting.sequence,
                    passed = outcome.passed,
                    "rule chain stopped"
                );
                return Ok(outcome.passed);
            }
        }
        Ok(true)
    }

    fn apply_setting_at<R: Record + Sync + ?Sized>(
        &self,
        record: &mut R,
        setting: &RuleSetting,
        depth: usize,
    ) -> Result<SettingOutcome, EngineError> {
        if !conditions_hold(&*record, &setting.rule.condition_chain)? {
            debug!(
                rule_id = %setting.rule_id,
                sequence = setting.sequence,
                break_on_fail = setting.break_on_fail,
                "conditions failed"
            );
            return Ok(SettingOutcome {
                passed: false,
                stop: setting.break_on_fail,
            });
        }

        for modifier in setting.rule.ordered_modifiers() {
            match modifier.data_type {
                DataType::Jump => {
                    let passed = self.transfer(record, modifier, depth)?;
                    return Ok(SettingOutcome {
                        passed,
                        stop: true,
                    });
                }
                DataType::JumpReturn => {
                    if !self.transfer(record, modifier, depth)? {
                        debug!(
                            rule_id = %setting.rule_id,
                            target = %modifier.left_side,
                            "jump-return chain failed"
                        );
                        return Ok(SettingOutcome::FAILED);
                    }
                }
                DataType::String | DataType::Integer => {
                    if !apply_modifier(record, modifier)? {
                        return Ok(SettingOutcome::FAILED);
                    }
                }
            }
        }

        debug!(rule_id = %setting.rule_id, sequence = setting.sequence, "setting applied");
        Ok(SettingOutcome::PASSED)
    }

    /// Run the chain a jump or jump-return modifier points at.
    fn transfer<R: Record + Sync + ?Sized>(
        &self,
        record: &mut R,
        modifier: &Modifier,
        depth: usize,
    ) -> Result<bool, EngineError> {
        let depth = depth + 1;
        if depth > self.config.max_jump_depth {
            return Err(EngineError::JumpDepthExceeded { depth });
        }

        let start = modifier
            .right_side
            .trim()
            .parse::<i64>()
            .map_err(|_| EngineError::ModifierSideInvalid {
                side: format!("jump offset '{}'", modifier.right_side),
            })?;
        let rule_id = modifier.left_side.as_str();
        debug!(rule_id, start, depth, kind = ?modifier.data_type, "transferring to rule chain");

        let settings = self.fetch(rule_id, start)?;
        self.apply_settings_at(record, &settings, depth)
    }

    fn fetch(&self, rule_id: &str, start: i64) -> Result<Vec<RuleSetting>, EngineError> {
        self.supply
            .fetch_rule_settings(rule_id, start)
            .map_err(|err| {
                warn!(rule_id, start, error = %err, "rule supply fetch failed");
                EngineError::UnableToFetch {
                    rule_id: rule_id.to_string(),
                    start,
                }
            })
    }
}

/// Evaluate a condition chain in parallel and join the verdicts in chain order.
///
/// Every condition is evaluated before the join. The first error by chain
/// position wins over any false verdict.
fn conditions_hold<R: Record + Sync + ?Sized>(
    record: &R,
    chain: &[Condition],
) -> Result<bool, EngineError> {
    let verdicts: Vec<Result<bool, EngineError>> = chain
        .par_iter()
        .map(|condition| check_condition(record, condition))
        .collect();

    let mut holds = true;
    for verdict in verdicts {
        holds &= verdict?;
    }
    Ok(holds)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
