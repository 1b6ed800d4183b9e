//! Conditions, modifiers, rules and rule settings.
//!
//! Field names follow the stored JSON representation, so a stored rule blob
//! deserializes directly into [`Rule`].

use serde::{Deserialize, Serialize};

use crate::codes::{Comparator, ConditionKind, DataType, Operand, RuleSettingStep, SideKind};

// ──────────────────────────────────────────────
// Condition
// ──────────────────────────────────────────────

/// One test in a rule's condition chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    #[serde(default)]
    pub left_side: String,
    #[serde(rename = "left_type")]
    pub left_kind: SideKind,
    #[serde(rename = "compare")]
    pub comparator: Comparator,
    #[serde(default)]
    pub right_side: String,
    #[serde(rename = "right_type")]
    pub right_kind: SideKind,
}

impl Condition {
    /// A condition that compares a record field against a literal.
    pub fn field_against_value(
        kind: ConditionKind,
        field: &str,
        comparator: Comparator,
        literal: &str,
    ) -> Self {
        Condition {
            kind,
            left_side: field.to_string(),
            left_kind: SideKind::Field,
            comparator,
            right_side: literal.to_string(),
            right_kind: SideKind::Value,
        }
    }

    /// A filler condition that always holds.
    pub fn always_true() -> Self {
        Condition {
            kind: ConditionKind::AlwaysTrue,
            left_side: String::new(),
            left_kind: SideKind::Value,
            comparator: Comparator::Equal,
            right_side: String::new(),
            right_kind: SideKind::Value,
        }
    }
}

// ──────────────────────────────────────────────
// Modifier
// ──────────────────────────────────────────────

/// One step of a rule's modifier chain.
///
/// For `Jump` and `JumpReturn` modifiers `left_side` is the rule id to
/// transfer to and `right_side` the starting sequence offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(default)]
    pub sequence: i64,
    pub operand: Operand,
    pub data_type: DataType,
    #[serde(default)]
    pub left_side: String,
    #[serde(rename = "left_type")]
    pub left_kind: SideKind,
    #[serde(default)]
    pub right_side: String,
    #[serde(rename = "right_type")]
    pub right_kind: SideKind,
    #[serde(default)]
    pub target_field: String,
}

impl Modifier {
    /// Unconditional transfer to `rule_id`, starting at sequence `start`.
    pub fn jump(sequence: i64, rule_id: &str, start: i64) -> Self {
        Self::transfer(sequence, DataType::Jump, rule_id, start)
    }

    /// Call into `rule_id` starting at sequence `start`, then continue.
    pub fn jump_return(sequence: i64, rule_id: &str, start: i64) -> Self {
        Self::transfer(sequence, DataType::JumpReturn, rule_id, start)
    }

    fn transfer(sequence: i64, data_type: DataType, rule_id: &str, start: i64) -> Self {
        Modifier {
            sequence,
            operand: Operand::Set,
            data_type,
            left_side: rule_id.to_string(),
            left_kind: SideKind::Value,
            right_side: start.to_string(),
            right_kind: SideKind::Value,
            target_field: String::new(),
        }
    }
}

// ──────────────────────────────────────────────
// Complex values
// ──────────────────────────────────────────────

/// One row of a selection table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A flat cap, a percentage and a selection table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplexValue {
    #[serde(default)]
    pub flat: i64,
    #[serde(rename = "percentage", default)]
    pub percent: i64,
    #[serde(rename = "select", default)]
    pub selections: Vec<SelectionEntry>,
}

impl ComplexValue {
    /// Decode a complex value from its JSON literal form.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The first entry whose key equals `key`.
    pub fn select(&self, key: &str) -> Option<&SelectionEntry> {
        self.selections.iter().find(|entry| entry.key == key)
    }

    /// `percent * base / 100`, truncating. `None` on overflow.
    pub fn share_of(&self, base: i64) -> Option<i64> {
        self.percent.checked_mul(base).map(|scaled| scaled / 100)
    }

    /// The percentage share of `base`, clamped to at most `flat`.
    pub fn capped_share_of(&self, base: i64) -> Option<i64> {
        self.share_of(base).map(|share| share.min(self.flat))
    }
}

// ──────────────────────────────────────────────
// Rule / RuleSetting
// ──────────────────────────────────────────────

/// A condition chain (AND semantics) and an ordered modifier chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub condition_chain: Vec<Condition>,
    #[serde(rename = "rate_modifer", alias = "modifier_chain", default)]
    pub modifier_chain: Vec<Modifier>,
}

impl Rule {
    /// Modifiers in execution order: ascending `sequence`, ties keep chain order.
    pub fn ordered_modifiers(&self) -> Vec<&Modifier> {
        let mut ordered: Vec<&Modifier> = self.modifier_chain.iter().collect();
        ordered.sort_by_key(|m| m.sequence);
        ordered
    }

    /// Encode as the opaque text blob stored next to a setting's scalar columns.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }
}

fn default_enabled() -> bool {
    true
}

/// One entry of a sequenced group of rules sharing a `rule_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetting {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_enabled")]
    pub enable: bool,
    #[serde(default)]
    pub break_on_fail: bool,
    #[serde(default)]
    pub sequence: i64,
    pub rule_id: String,
    /// Raw step code, see [`RuleSetting::step`].
    #[serde(default)]
    pub rule_type: i64,
    #[serde(default)]
    pub rule: Rule,
}

impl RuleSetting {
    pub fn new(rule_id: &str, sequence: i64, rule: Rule) -> Self {
        RuleSetting {
            id: String::new(),
            enable: true,
            break_on_fail: false,
            sequence,
            rule_id: rule_id.to_string(),
            rule_type: RuleSettingStep::Base.code(),
            rule,
        }
    }

    /// The pricing step named by `rule_type`, if the code is a known one.
    pub fn step(&self) -> Option<RuleSettingStep> {
        RuleSettingStep::try_from(self.rule_type).ok()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
