//! Modifier execution.
//!
//! A modifier mutates exactly one field, `target_field`, from a left value
//! and (for arithmetic and table operands) a right value. Jump and
//! jump-return modifiers are control transfers and are only meaningful
//! inside a rule chain; see [`crate::engine`].

use pricerule_model::{ComplexValue, DataType, Modifier, Operand, SideKind};

use crate::error::{parse_int, EngineError};
use crate::record::{read_list, split_list, FieldValue, Record};

/// Apply a string or integer modifier to `record`.
///
/// Returns `Ok(true)` once the target field has been written.
pub fn apply_modifier<R: Record + ?Sized>(
    record: &mut R,
    modifier: &Modifier,
) -> Result<bool, EngineError> {
    match modifier.data_type {
        DataType::String => apply_string(record, modifier)?,
        DataType::Integer => apply_integer(record, modifier)?,
        DataType::Jump | DataType::JumpReturn => {
            return Err(EngineError::unsupported(format!(
                "{:?} modifier outside a rule chain",
                modifier.data_type
            )));
        }
    }
    Ok(true)
}

// ──────────────────────────────────────────────
// Side resolution
// ──────────────────────────────────────────────

fn side_invalid(side: &str, kind: SideKind, operand: Operand) -> EngineError {
    EngineError::ModifierSideInvalid {
        side: format!("{} side of kind {} for {:?}", side, kind.code(), operand),
    }
}

fn left_str<R: Record + ?Sized>(record: &R, modifier: &Modifier) -> Result<String, EngineError> {
    match modifier.left_kind {
        SideKind::Field => Ok(record.get_str(&modifier.left_side)?),
        SideKind::Value => Ok(modifier.left_side.clone()),
        kind => Err(side_invalid("left", kind, modifier.operand)),
    }
}

fn left_int<R: Record + ?Sized>(record: &R, modifier: &Modifier) -> Result<i64, EngineError> {
    match modifier.left_kind {
        SideKind::Field => Ok(record.get_int(&modifier.left_side)?),
        SideKind::Value => parse_int(&modifier.left_side),
        kind => Err(side_invalid("left", kind, modifier.operand)),
    }
}

/// The keys a `Sum` adds up: a list field, or a comma-separated literal.
fn left_keys<R: Record + ?Sized>(
    record: &R,
    modifier: &Modifier,
) -> Result<Vec<String>, EngineError> {
    match modifier.left_kind {
        SideKind::Field => Ok(read_list(record, &modifier.left_side)?),
        SideKind::Value => Ok(split_list(&modifier.left_side)),
        kind => Err(side_invalid("left", kind, modifier.operand)),
    }
}

/// The selection table of a `Select` or `Sum`. A plain literal is not a table.
fn right_complex<R: Record + ?Sized>(
    record: &R,
    modifier: &Modifier,
) -> Result<ComplexValue, EngineError> {
    match modifier.right_kind {
        SideKind::Field => Ok(record.get_complex(&modifier.right_side)?),
        SideKind::Complex => Ok(ComplexValue::from_json(&modifier.right_side)?),
        kind => Err(side_invalid("right", kind, modifier.operand)),
    }
}

/// The right operand of an arithmetic modifier.
///
/// A complex right side contributes a share of `left`: clamped to `flat`
/// for `Add` and `Sub`, unclamped for `Multiply` and `Divide`.
fn right_operand<R: Record + ?Sized>(
    record: &R,
    modifier: &Modifier,
    left: i64,
) -> Result<i64, EngineError> {
    match modifier.right_kind {
        SideKind::Field => Ok(record.get_int(&modifier.right_side)?),
        SideKind::Value => parse_int(&modifier.right_side),
        SideKind::Complex => {
            let complex = ComplexValue::from_json(&modifier.right_side)?;
            let share = match modifier.operand {
                Operand::Add | Operand::Sub => complex.capped_share_of(left),
                _ => complex.share_of(left),
            };
            share.ok_or(EngineError::Overflow {
                operation: "percentage share",
            })
        }
    }
}

fn select_entry(complex: &ComplexValue, key: &str) -> Result<String, EngineError> {
    complex
        .select(key)
        .map(|entry| entry.value.clone())
        .ok_or_else(|| EngineError::FieldNotExisted {
            key: key.to_string(),
        })
}

// ──────────────────────────────────────────────
// String modifiers
// ──────────────────────────────────────────────

fn apply_string<R: Record + ?Sized>(record: &mut R, modifier: &Modifier) -> Result<(), EngineError> {
    let value = match modifier.operand {
        Operand::Set => left_str(record, modifier)?,
        Operand::Select => {
            let key = left_str(record, modifier)?;
            let complex = right_complex(record, modifier)?;
            select_entry(&complex, &key)?
        }
        operand => {
            return Err(EngineError::unsupported(format!(
                "{:?} on string modifier",
                operand
            )))
        }
    };
    record.set(&modifier.target_field, FieldValue::Str(value))?;
    Ok(())
}

// ──────────────────────────────────────────────
// Integer modifiers
// ──────────────────────────────────────────────

fn apply_integer<R: Record + ?Sized>(
    record: &mut R,
    modifier: &Modifier,
) -> Result<(), EngineError> {
    let value = match modifier.operand {
        Operand::Set => left_int(record, modifier)?,
        Operand::Add | Operand::Sub | Operand::Multiply | Operand::Divide => {
            let left = left_int(record, modifier)?;
            let right = right_operand(record, modifier, left)?;
            arithmetic(modifier.operand, left, right)?
        }
        Operand::Select => {
            let key = left_str(record, modifier)?;
            let complex = right_complex(record, modifier)?;
            parse_int(&select_entry(&complex, &key)?)?
        }
        Operand::Sum => {
            let keys = left_keys(record, modifier)?;
            // Accumulates onto the target's current value.
            let mut total = record.get_int(&modifier.target_field)?;
            let complex = right_complex(record, modifier)?;
            for key in &keys {
                if let Some(entry) = complex.select(key) {
                    total = total
                        .checked_add(parse_int(&entry.value)?)
                        .ok_or(EngineError::Overflow { operation: "sum" })?;
                }
            }
            total
        }
    };
    record.set(&modifier.target_field, FieldValue::Int(value))?;
    Ok(())
}

fn arithmetic(operand: Operand, left: i64, right: i64) -> Result<i64, EngineError> {
    let (result, operation) = match operand {
        Operand::Add => (left.checked_add(right), "add"),
        Operand::Sub => (left.checked_sub(right), "sub"),
        Operand::Multiply => (left.checked_mul(right), "multiply"),
        Operand::Divide => {
            if right == 0 {
                return Err(EngineError::DivByZero);
            }
            (left.checked_div(right), "divide")
        }
        other => {
            return Err(EngineError::unsupported(format!(
                "{:?} is not arithmetic",
                other
            )))
        }
    };
    result.ok_or(EngineError::Overflow { operation })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DynamicRecord, FieldError};
    use pricerule_model::SelectionEntry;

    fn rates() -> ComplexValue {
        ComplexValue {
            flat: 15,
            percent: 10,
            selections: vec![
                SelectionEntry {
                    name: "gold".into(),
                    key: "GOLD".into(),
                    value: "30".into(),
                },
                SelectionEntry {
                    name: "silver".into(),
                    key: "SILVER".into(),
                    value: "20".into(),
                },
                SelectionEntry {
                    name: "breakfast".into(),
                    key: "BF".into(),
                    value: "5".into(),
                },
                SelectionEntry {
                    name: "dinner".into(),
                    key: "DN".into(),
                    value: "3".into(),
                },
            ],
        }
    }

    fn record() -> DynamicRecord {
        DynamicRecord::new()
            .with("base_price", FieldValue::Int(100))
            .with("price", FieldValue::Int(0))
            .with("zero", FieldValue::Int(0))
            .with("tier", FieldValue::Str("GOLD".to_string()))
            .with("label", FieldValue::Str(String::new()))
            .with("rates", FieldValue::Complex(rates()))
            .with("extras", FieldValue::List(vec!["BF".into(), "XX".into()]))
            .with("extras_late", FieldValue::List(vec!["DN".into()]))
            .with("total", FieldValue::Int(10))
    }

    fn modifier(
        data_type: DataType,
        operand: Operand,
        left: (&str, SideKind),
        right: (&str, SideKind),
        target: &str,
    ) -> Modifier {
        Modifier {
            sequence: 0,
            operand,
            data_type,
            left_side: left.0.to_string(),
            left_kind: left.1,
            right_side: right.0.to_string(),
            right_kind: right.1,
            target_field: target.to_string(),
        }
    }

    fn field(name: &str) -> (&str, SideKind) {
        (name, SideKind::Field)
    }

    fn value(literal: &str) -> (&str, SideKind) {
        (literal, SideKind::Value)
    }

    fn complex(json: &str) -> (&str, SideKind) {
        (json, SideKind::Complex)
    }

    fn int_op(operand: Operand, left: (&str, SideKind), right: (&str, SideKind)) -> Modifier {
        modifier(DataType::Integer, operand, left, right, "price")
    }

    #[test]
    fn add_literal_to_field() {
        let mut r = record();
        let m = modifier(
            DataType::Integer,
            Operand::Add,
            field("base_price"),
            value("20"),
            "base_price",
        );
        assert!(apply_modifier(&mut r, &m).unwrap());
        assert_eq!(r.get_int("base_price"), Ok(120));
    }

    #[test]
    fn integer_arithmetic() {
        let cases = [
            (Operand::Set, "7", 100),
            (Operand::Sub, "30", 70),
            (Operand::Multiply, "3", 300),
            (Operand::Divide, "7", 14),
        ];
        for (operand, right, expected) in cases {
            let mut r = record();
            apply_modifier(&mut r, &int_op(operand, field("base_price"), value(right))).unwrap();
            assert_eq!(r.get_int("price"), Ok(expected), "{:?}", operand);
        }
    }

    #[test]
    fn divide_truncates_toward_zero() {
        let mut r = record();
        apply_modifier(&mut r, &int_op(Operand::Divide, value("-7"), value("2"))).unwrap();
        assert_eq!(r.get_int("price"), Ok(-3));
    }

    #[test]
    fn divide_by_zero_fails() {
        let mut r = record();
        let literal = int_op(Operand::Divide, field("base_price"), value("0"));
        assert!(matches!(
            apply_modifier(&mut r, &literal),
            Err(EngineError::DivByZero)
        ));
        let from_field = int_op(Operand::Divide, field("base_price"), field("zero"));
        assert!(matches!(
            apply_modifier(&mut r, &from_field),
            Err(EngineError::DivByZero)
        ));
        // 0% of the left side resolves to zero too.
        let from_complex = int_op(
            Operand::Divide,
            field("base_price"),
            complex(r#"{"flat": 50, "percentage": 0}"#),
        );
        assert!(matches!(
            apply_modifier(&mut r, &from_complex),
            Err(EngineError::DivByZero)
        ));
        assert_eq!(r.get_int("price"), Ok(0));
    }

    #[test]
    fn complex_share_is_clamped_only_for_add_and_sub() {
        let json = r#"{"flat": 15, "percentage": 20}"#;
        let cases = [
            (Operand::Add, 115),
            (Operand::Sub, 85),
            (Operand::Multiply, 2000),
            (Operand::Divide, 5),
        ];
        for (operand, expected) in cases {
            let mut r = record();
            apply_modifier(&mut r, &int_op(operand, field("base_price"), complex(json))).unwrap();
            assert_eq!(r.get_int("price"), Ok(expected), "{:?}", operand);
        }
    }

    #[test]
    fn overflow_is_an_error() {
        let mut r = record();
        let m = int_op(Operand::Add, value(&i64::MAX.to_string()), value("1"));
        assert!(matches!(
            apply_modifier(&mut r, &m),
            Err(EngineError::Overflow { operation: "add" })
        ));
    }

    #[test]
    fn string_set_and_select() {
        let mut r = record();
        let set = modifier(DataType::String, Operand::Set, value("promo"), value(""), "label");
        apply_modifier(&mut r, &set).unwrap();
        assert_eq!(r.get_str("label").unwrap(), "promo");

        let select = modifier(DataType::String, Operand::Select, field("tier"), field("rates"), "label");
        apply_modifier(&mut r, &select).unwrap();
        assert_eq!(r.get_str("label").unwrap(), "30");
    }

    #[test]
    fn select_missing_key_is_field_not_existed() {
        let mut r = record();
        let m = modifier(
            DataType::String,
            Operand::Select,
            value("BRONZE"),
            field("rates"),
            "label",
        );
        assert!(matches!(
            apply_modifier(&mut r, &m),
            Err(EngineError::FieldNotExisted { key }) if key == "BRONZE"
        ));
    }

    #[test]
    fn select_rejects_plain_literal_table() {
        let mut r = record();
        for data_type in [DataType::String, DataType::Integer] {
            let m = modifier(data_type, Operand::Select, field("tier"), value("30"), "price");
            assert!(matches!(
                apply_modifier(&mut r, &m),
                Err(EngineError::ModifierSideInvalid { .. })
            ));
        }
    }

    #[test]
    fn integer_select_from_literal_table() {
        let mut r = record();
        let m = int_op(
            Operand::Select,
            value("VIP"),
            complex(r#"{"select": [{"name": "vip", "key": "VIP", "value": "42"}]}"#),
        );
        apply_modifier(&mut r, &m).unwrap();
        assert_eq!(r.get_int("price"), Ok(42));
    }

    #[test]
    fn malformed_complex_literal_propagates() {
        let mut r = record();
        let m = int_op(Operand::Select, value("VIP"), complex("{broken"));
        assert!(matches!(
            apply_modifier(&mut r, &m),
            Err(EngineError::InvalidComplex(_))
        ));
    }

    #[test]
    fn sum_accumulates_onto_target() {
        let mut r = record();
        let first = modifier(DataType::Integer, Operand::Sum, field("extras"), field("rates"), "total");
        apply_modifier(&mut r, &first).unwrap();
        assert_eq!(r.get_int("total"), Ok(15));

        let second = modifier(
            DataType::Integer,
            Operand::Sum,
            field("extras_late"),
            field("rates"),
            "total",
        );
        apply_modifier(&mut r, &second).unwrap();
        assert_eq!(r.get_int("total"), Ok(18));
    }

    #[test]
    fn sum_rejects_plain_literal_table() {
        let mut r = record();
        let m = modifier(DataType::Integer, Operand::Sum, field("extras"), value("5"), "total");
        assert!(matches!(
            apply_modifier(&mut r, &m),
            Err(EngineError::ModifierSideInvalid { .. })
        ));
        assert_eq!(r.get_int("total"), Ok(10));
    }

    #[test]
    fn unsupported_string_operand() {
        let mut r = record();
        let m = modifier(DataType::String, Operand::Add, value("a"), value("b"), "label");
        assert!(matches!(
            apply_modifier(&mut r, &m),
            Err(EngineError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn transfers_are_unsupported_outside_a_chain() {
        let mut r = record();
        for m in [Modifier::jump(0, "promo", 0), Modifier::jump_return(0, "promo", 0)] {
            assert!(matches!(
                apply_modifier(&mut r, &m),
                Err(EngineError::UnsupportedOperation { .. })
            ));
        }
    }

    #[test]
    fn complex_left_side_is_invalid() {
        let mut r = record();
        let m = int_op(Operand::Set, complex("{}"), value("1"));
        assert!(matches!(
            apply_modifier(&mut r, &m),
            Err(EngineError::ModifierSideInvalid { .. })
        ));
    }

    #[test]
    fn target_kind_mismatch_propagates() {
        let mut r = record();
        let m = modifier(DataType::Integer, Operand::Set, value("5"), value(""), "tier");
        assert!(matches!(
            apply_modifier(&mut r, &m),
            Err(EngineError::Field(FieldError::KindMismatch { .. }))
        ));
    }
}
