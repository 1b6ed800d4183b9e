//! Conformance test suite for `RuleSupply` implementations.
//!
//! A backend-agnostic suite any `RuleSupply` can run to check the fetch
//! contract the engine relies on:
//!
//! - **Round trip**: saved chains come back with identical codes and sequences
//! - **Ordering**: pages are ascending by `sequence`
//! - **Paging**: pages start at (and include) `start_sequence`
//! - **Isolation**: rule ids never leak into each other's pages
//! - **Identity**: missing ids are assigned, existing ids are replaced
//! - **Errors**: unknown rule ids fail with `SupplyError::NotFound`
//!
//! # Usage
//!
//! ```ignore
//! use pricerule_storage::conformance::run_conformance_suite;
//!
//! #[test]
//! fn postgres_conformance() {
//!     let report = run_conformance_suite(create_test_postgres_supply);
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

use std::fmt;

use pricerule_model::{
    Comparator, Condition, ConditionKind, DataType, Modifier, Operand, Rule, RuleSetting,
    SideKind,
};

use crate::{RuleSupply, SupplyError};

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test name (e.g. "fetch_orders_by_sequence").
    pub name: String,
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(name: &str, result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Self {
                name: name.to_string(),
                passed: true,
                message: None,
            },
            Err(msg) => Self {
                name: name.to_string(),
                passed: false,
                message: Some(msg),
            },
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}]: {}",
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

type SupplyTest<S> = fn(S) -> Result<(), String>;

/// Run the full conformance suite against a supply backend.
///
/// The `factory` function is called once per test to create a fresh, empty
/// supply, ensuring test isolation.
pub fn run_conformance_suite<S, F>(factory: F) -> ConformanceReport
where
    S: RuleSupply,
    F: Fn() -> S,
{
    let tests: [(&str, SupplyTest<S>); 9] = [
        ("save_then_fetch_round_trips", save_then_fetch_round_trips),
        ("fetch_orders_by_sequence", fetch_orders_by_sequence),
        ("fetch_starts_at_sequence", fetch_starts_at_sequence),
        ("fetch_isolates_rule_ids", fetch_isolates_rule_ids),
        ("fetch_unknown_rule_is_not_found", fetch_unknown_rule_is_not_found),
        ("save_assigns_missing_ids", save_assigns_missing_ids),
        ("save_replaces_same_id", save_replaces_same_id),
        ("save_replaces_id_across_rule_ids", save_replaces_id_across_rule_ids),
        ("save_is_cumulative", save_is_cumulative),
    ];

    let results: Vec<TestResult> = tests
        .iter()
        .map(|(name, test)| TestResult::from_result(name, test(factory())))
        .collect();

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn make_setting(rule_id: &str, sequence: i64) -> RuleSetting {
    RuleSetting::new(
        rule_id,
        sequence,
        Rule {
            condition_chain: vec![Condition::field_against_value(
                ConditionKind::Integer,
                "nights",
                Comparator::In,
                "1,2,3",
            )],
            modifier_chain: vec![
                Modifier {
                    sequence: 2,
                    operand: Operand::Sub,
                    data_type: DataType::Integer,
                    left_side: "price".to_string(),
                    left_kind: SideKind::Field,
                    right_side: r#"{"flat": 20, "percentage": 10}"#.to_string(),
                    right_kind: SideKind::Complex,
                    target_field: "price".to_string(),
                },
                Modifier::jump_return(1, "tax", 0),
            ],
        },
    )
}

fn sequences(page: &[RuleSetting]) -> Vec<i64> {
    page.iter().map(|s| s.sequence).collect()
}

// ── Test implementations ─────────────────────────────────────────────────────

/// Saved condition and modifier chains come back with identical codes.
fn save_then_fetch_round_trips<S: RuleSupply>(supply: S) -> Result<(), String> {
    let mut setting = make_setting("base", 4);
    setting.id = "setting-1".to_string();
    setting.break_on_fail = true;
    setting.rule_type = 3;
    supply
        .save_rule_settings(std::slice::from_ref(&setting))
        .map_err(|e| e.to_string())?;

    let page = supply
        .fetch_rule_settings("base", 0)
        .map_err(|e| e.to_string())?;
    match page.as_slice() {
        [fetched] if *fetched == setting => Ok(()),
        other => Err(format!("expected the saved setting back, got {:?}", other)),
    }
}

/// Settings saved out of order are fetched ascending by sequence.
fn fetch_orders_by_sequence<S: RuleSupply>(supply: S) -> Result<(), String> {
    let settings = vec![
        make_setting("base", 3),
        make_setting("base", 1),
        make_setting("base", 2),
    ];
    supply
        .save_rule_settings(&settings)
        .map_err(|e| e.to_string())?;
    let page = supply
        .fetch_rule_settings("base", 0)
        .map_err(|e| e.to_string())?;
    if sequences(&page) != vec![1, 2, 3] {
        return Err(format!("expected [1, 2, 3], got {:?}", sequences(&page)));
    }
    Ok(())
}

/// The page begins at `start_sequence`, inclusive.
fn fetch_starts_at_sequence<S: RuleSupply>(supply: S) -> Result<(), String> {
    let settings: Vec<_> = (0..5).map(|n| make_setting("base", n)).collect();
    supply
        .save_rule_settings(&settings)
        .map_err(|e| e.to_string())?;
    let page = supply
        .fetch_rule_settings("base", 2)
        .map_err(|e| e.to_string())?;
    if sequences(&page) != vec![2, 3, 4] {
        return Err(format!("expected [2, 3, 4], got {:?}", sequences(&page)));
    }
    Ok(())
}

/// Only settings of the requested rule id are returned.
fn fetch_isolates_rule_ids<S: RuleSupply>(supply: S) -> Result<(), String> {
    let settings = vec![
        make_setting("base", 0),
        make_setting("promo", 1),
        make_setting("base", 2),
    ];
    supply
        .save_rule_settings(&settings)
        .map_err(|e| e.to_string())?;
    let page = supply
        .fetch_rule_settings("promo", 0)
        .map_err(|e| e.to_string())?;
    if page.len() != 1 || page[0].rule_id != "promo" {
        return Err(format!("expected one promo setting, got {:?}", page));
    }
    Ok(())
}

/// Unknown rule ids fail with NotFound.
fn fetch_unknown_rule_is_not_found<S: RuleSupply>(supply: S) -> Result<(), String> {
    match supply.fetch_rule_settings("missing", 0) {
        Err(SupplyError::NotFound { rule_id }) if rule_id == "missing" => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}

/// A setting saved without an id comes back with one.
fn save_assigns_missing_ids<S: RuleSupply>(supply: S) -> Result<(), String> {
    supply
        .save_rule_settings(&[make_setting("base", 0), make_setting("base", 1)])
        .map_err(|e| e.to_string())?;
    let page = supply
        .fetch_rule_settings("base", 0)
        .map_err(|e| e.to_string())?;
    if page.iter().any(|s| s.id.is_empty()) {
        return Err("fetched setting has an empty id".to_string());
    }
    if page.len() == 2 && page[0].id == page[1].id {
        return Err("assigned ids are not distinct".to_string());
    }
    Ok(())
}

/// Saving a setting with an existing id replaces the stored one.
fn save_replaces_same_id<S: RuleSupply>(supply: S) -> Result<(), String> {
    let mut setting = make_setting("base", 0);
    setting.id = "fixed".to_string();
    supply
        .save_rule_settings(std::slice::from_ref(&setting))
        .map_err(|e| e.to_string())?;

    setting.break_on_fail = true;
    supply
        .save_rule_settings(std::slice::from_ref(&setting))
        .map_err(|e| e.to_string())?;

    let page = supply
        .fetch_rule_settings("base", 0)
        .map_err(|e| e.to_string())?;
    if page.len() != 1 || !page[0].break_on_fail {
        return Err(format!("expected one replaced setting, got {:?}", page));
    }
    Ok(())
}

/// Moving an id to another rule id leaves no copy under the old one.
fn save_replaces_id_across_rule_ids<S: RuleSupply>(supply: S) -> Result<(), String> {
    let mut setting = make_setting("a", 0);
    setting.id = "fixed".to_string();
    supply
        .save_rule_settings(std::slice::from_ref(&setting))
        .map_err(|e| e.to_string())?;

    setting.rule_id = "b".to_string();
    supply
        .save_rule_settings(std::slice::from_ref(&setting))
        .map_err(|e| e.to_string())?;

    let moved = supply
        .fetch_rule_settings("b", 0)
        .map_err(|e| e.to_string())?;
    if moved.len() != 1 || moved[0].id != "fixed" {
        return Err(format!("expected the setting under b, got {:?}", moved));
    }
    match supply.fetch_rule_settings("a", 0) {
        Err(SupplyError::NotFound { .. }) => Ok(()),
        Ok(page) if page.is_empty() => Ok(()),
        other => Err(format!("expected nothing left under a, got {:?}", other)),
    }
}

/// Separate save batches accumulate under the same rule id.
fn save_is_cumulative<S: RuleSupply>(supply: S) -> Result<(), String> {
    supply
        .save_rule_settings(&[make_setting("base", 5)])
        .map_err(|e| e.to_string())?;
    supply
        .save_rule_settings(&[make_setting("base", 0)])
        .map_err(|e| e.to_string())?;
    let page = supply
        .fetch_rule_settings("base", 0)
        .map_err(|e| e.to_string())?;
    if sequences(&page) != vec![0, 5] {
        return Err(format!("expected [0, 5], got {:?}", sequences(&page)));
    }
    Ok(())
}
