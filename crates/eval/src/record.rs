//! Field access on target records.
//!
//! The engine never inspects a record directly. Conditions and modifiers
//! read and write named, typed fields through the [`Record`] trait, so any
//! record type can be evaluated by implementing it.

use std::collections::BTreeMap;
use std::fmt;

use pricerule_model::ComplexValue;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ──────────────────────────────────────────────
// Field kinds and values
// ──────────────────────────────────────────────

/// The kind of value a record field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Timestamp,
    /// Ordered sequence of strings.
    List,
    Complex,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Timestamp => "timestamp",
            FieldKind::List => "list",
            FieldKind::Complex => "complex",
        };
        f.write_str(name)
    }
}

/// A typed field value. Timestamps serialize as unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    #[serde(rename = "string")]
    Str(String),
    #[serde(rename = "int")]
    Int(i64),
    #[serde(rename = "timestamp", with = "time::serde::timestamp")]
    Timestamp(OffsetDateTime),
    #[serde(rename = "list")]
    List(Vec<String>),
    #[serde(rename = "complex")]
    Complex(ComplexValue),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Str(_) => FieldKind::String,
            FieldValue::Int(_) => FieldKind::Integer,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::List(_) => FieldKind::List,
            FieldValue::Complex(_) => FieldKind::Complex,
        }
    }
}

/// Errors raised by a [`Record`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("field not found: {field}")]
    FieldNotFound { field: String },

    #[error("field '{field}' holds {found}, expected {expected}")]
    KindMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },
}

impl FieldError {
    pub fn not_found(field: &str) -> Self {
        FieldError::FieldNotFound {
            field: field.to_string(),
        }
    }

    pub fn mismatch(field: &str, expected: FieldKind, found: FieldKind) -> Self {
        FieldError::KindMismatch {
            field: field.to_string(),
            expected,
            found,
        }
    }
}

// ──────────────────────────────────────────────
// Record trait
// ──────────────────────────────────────────────

/// Named, typed field access on a target record.
///
/// `get` fails with [`FieldError::FieldNotFound`] for unknown names and with
/// [`FieldError::KindMismatch`] when the stored kind differs from `kind`.
/// `set` applies the same checks against the kind of the stored field, so a
/// record's shape never changes during evaluation.
pub trait Record {
    fn get(&self, field: &str, kind: FieldKind) -> Result<FieldValue, FieldError>;

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError>;

    fn get_str(&self, field: &str) -> Result<String, FieldError> {
        match self.get(field, FieldKind::String)? {
            FieldValue::Str(value) => Ok(value),
            other => Err(FieldError::mismatch(field, FieldKind::String, other.kind())),
        }
    }

    fn get_int(&self, field: &str) -> Result<i64, FieldError> {
        match self.get(field, FieldKind::Integer)? {
            FieldValue::Int(value) => Ok(value),
            other => Err(FieldError::mismatch(field, FieldKind::Integer, other.kind())),
        }
    }

    fn get_timestamp(&self, field: &str) -> Result<OffsetDateTime, FieldError> {
        match self.get(field, FieldKind::Timestamp)? {
            FieldValue::Timestamp(value) => Ok(value),
            other => Err(FieldError::mismatch(
                field,
                FieldKind::Timestamp,
                other.kind(),
            )),
        }
    }

    fn get_list(&self, field: &str) -> Result<Vec<String>, FieldError> {
        match self.get(field, FieldKind::List)? {
            FieldValue::List(value) => Ok(value),
            other => Err(FieldError::mismatch(field, FieldKind::List, other.kind())),
        }
    }

    fn get_complex(&self, field: &str) -> Result<ComplexValue, FieldError> {
        match self.get(field, FieldKind::Complex)? {
            FieldValue::Complex(value) => Ok(value),
            other => Err(FieldError::mismatch(field, FieldKind::Complex, other.kind())),
        }
    }
}

/// Split a comma-separated literal. An empty literal is an empty list.
pub(crate) fn split_list(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',').map(|item| item.trim().to_string()).collect()
}

/// Read a list field, accepting either a list or a comma-separated string.
pub(crate) fn read_list<R: Record + ?Sized>(
    record: &R,
    field: &str,
) -> Result<Vec<String>, FieldError> {
    match record.get_str(field) {
        Ok(joined) => Ok(split_list(&joined)),
        Err(FieldError::KindMismatch {
            found: FieldKind::List,
            ..
        }) => record.get_list(field),
        Err(err) => Err(err),
    }
}

// ──────────────────────────────────────────────
// DynamicRecord
// ──────────────────────────────────────────────

/// A record whose fields are an ordered name → value map.
///
/// Serializes as a JSON object of externally tagged values:
/// `{"base_price": {"int": 100}, "check_in": {"timestamp": 1567425600}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: &str, value: FieldValue) -> Self {
        self.insert(field, value);
        self
    }

    /// Add or replace a field, including its kind.
    pub fn insert(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Record for DynamicRecord {
    fn get(&self, field: &str, kind: FieldKind) -> Result<FieldValue, FieldError> {
        let value = self
            .fields
            .get(field)
            .ok_or_else(|| FieldError::not_found(field))?;
        if value.kind() != kind {
            return Err(FieldError::mismatch(field, kind, value.kind()));
        }
        Ok(value.clone())
    }

    fn set(&mut self, field: &str, value: FieldValue) -> Result<(), FieldError> {
        let slot = self
            .fields
            .get_mut(field)
            .ok_or_else(|| FieldError::not_found(field))?;
        if slot.kind() != value.kind() {
            return Err(FieldError::mismatch(field, slot.kind(), value.kind()));
        }
        *slot = value;
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> DynamicRecord {
        DynamicRecord::new()
            .with("guest", FieldValue::Str("ada".to_string()))
            .with("nights", FieldValue::Int(3))
            .with(
                "check_in",
                FieldValue::Timestamp(OffsetDateTime::from_unix_timestamp(1567425600).unwrap()),
            )
            .with(
                "extras",
                FieldValue::List(vec!["wifi".to_string(), "parking".to_string()]),
            )
            .with("codes", FieldValue::Str("A, B,C".to_string()))
    }

    #[test]
    fn get_checks_presence_and_kind() {
        let record = booking();
        assert_eq!(record.get_int("nights"), Ok(3));
        assert_eq!(
            record.get_int("missing"),
            Err(FieldError::not_found("missing"))
        );
        assert_eq!(
            record.get_int("guest"),
            Err(FieldError::mismatch(
                "guest",
                FieldKind::Integer,
                FieldKind::String
            ))
        );
    }

    #[test]
    fn set_keeps_field_kind() {
        let mut record = booking();
        record.set("nights", FieldValue::Int(5)).unwrap();
        assert_eq!(record.get_int("nights"), Ok(5));

        let err = record
            .set("nights", FieldValue::Str("five".to_string()))
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::mismatch("nights", FieldKind::Integer, FieldKind::String)
        );
        assert_eq!(
            record.set("absent", FieldValue::Int(1)),
            Err(FieldError::not_found("absent"))
        );
    }

    #[test]
    fn read_list_accepts_both_shapes() {
        let record = booking();
        assert_eq!(read_list(&record, "extras").unwrap(), vec!["wifi", "parking"]);
        assert_eq!(read_list(&record, "codes").unwrap(), vec!["A", "B", "C"]);
        assert!(matches!(
            read_list(&record, "nights"),
            Err(FieldError::KindMismatch { .. })
        ));
    }

    #[test]
    fn split_list_of_empty_literal_is_empty() {
        assert!(split_list("").is_empty());
        assert!(split_list("  ").is_empty());
        assert_eq!(split_list("1,2"), vec!["1", "2"]);
    }

    #[test]
    fn dynamic_record_json_shape() {
        let record: DynamicRecord = serde_json::from_value(serde_json::json!({
            "base_price": {"int": 100},
            "check_in": {"timestamp": 1567425600},
            "tier": {"string": "gold"},
            "extras": {"list": ["wifi"]},
            "rates": {"complex": {"flat": 10, "percentage": 5, "select": []}}
        }))
        .unwrap();
        assert_eq!(record.get_int("base_price"), Ok(100));
        assert_eq!(
            record.get_timestamp("check_in").unwrap().unix_timestamp(),
            1567425600
        );
        assert_eq!(record.get_complex("rates").unwrap().flat, 10);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["check_in"], serde_json::json!({"timestamp": 1567425600}));
    }
}
