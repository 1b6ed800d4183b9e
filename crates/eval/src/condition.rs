//! Condition evaluation.
//!
//! Each condition kind resolves both sides to one value type and compares
//! them. Conditions only read the record, which is what allows a setting's
//! condition chain to be evaluated in parallel.
//!
//! Timestamps are compared in UTC: the day-of-week and calendar date of a
//! timestamp are those of its UTC instant.

use std::cmp::Ordering;

use pricerule_model::{Comparator, Condition, ConditionKind, SideKind};
use time::{Date, OffsetDateTime, UtcOffset, Weekday};

use crate::error::{parse_int, EngineError};
use crate::record::{read_list, split_list, Record};

/// Evaluate a single condition against `record`.
pub fn check_condition<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
) -> Result<bool, EngineError> {
    match condition.kind {
        ConditionKind::AlwaysTrue => Ok(true),
        ConditionKind::String => compare_strings(record, condition),
        ConditionKind::Integer => compare_integers(record, condition),
        ConditionKind::DayOfWeek => compare_weekdays(record, condition),
        ConditionKind::Date => compare_dates(record, condition),
    }
}

// ──────────────────────────────────────────────
// Side resolution
// ──────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn side_of(condition: &Condition, side: Side) -> (&str, SideKind) {
    match side {
        Side::Left => (condition.left_side.as_str(), condition.left_kind),
        Side::Right => (condition.right_side.as_str(), condition.right_kind),
    }
}

fn side_invalid(side: Side, kind: SideKind) -> EngineError {
    let name = match side {
        Side::Left => "left",
        Side::Right => "right",
    };
    EngineError::ConditionSideInvalid {
        side: format!("{} side of kind {}", name, kind.code()),
    }
}

fn resolve_str<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
    side: Side,
) -> Result<String, EngineError> {
    match side_of(condition, side) {
        (field, SideKind::Field) => Ok(record.get_str(field)?),
        (literal, SideKind::Value) => Ok(literal.to_string()),
        (_, kind) => Err(side_invalid(side, kind)),
    }
}

fn resolve_int<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
    side: Side,
) -> Result<i64, EngineError> {
    match side_of(condition, side) {
        (field, SideKind::Field) => Ok(record.get_int(field)?),
        (literal, SideKind::Value) => parse_int(literal),
        (_, kind) => Err(side_invalid(side, kind)),
    }
}

fn resolve_timestamp<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
    side: Side,
) -> Result<OffsetDateTime, EngineError> {
    match side_of(condition, side) {
        (field, SideKind::Field) => Ok(record.get_timestamp(field)?),
        (literal, SideKind::Value) => timestamp_from_literal(literal),
        (_, kind) => Err(side_invalid(side, kind)),
    }
}

/// The right side of an `In`/`NotIn` condition as list items.
fn resolve_list<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
) -> Result<Vec<String>, EngineError> {
    match side_of(condition, Side::Right) {
        (field, SideKind::Field) => Ok(read_list(record, field)?),
        (literal, SideKind::Value) => Ok(split_list(literal)),
        (_, kind) => Err(side_invalid(Side::Right, kind)),
    }
}

fn timestamp_from_literal(literal: &str) -> Result<OffsetDateTime, EngineError> {
    let seconds = parse_int(literal)?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|_| EngineError::InvalidTimestamp { value: seconds })
}

fn utc_weekday(at: OffsetDateTime) -> Weekday {
    at.to_offset(UtcOffset::UTC).weekday()
}

fn utc_date(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

// ──────────────────────────────────────────────
// Comparator semantics
// ──────────────────────────────────────────────

/// Apply an ordering comparator. `None` for comparators that are not orderings.
fn ordering_holds(ordering: Ordering, comparator: Comparator) -> Option<bool> {
    let holds = match comparator {
        Comparator::Equal => ordering == Ordering::Equal,
        Comparator::NotEqual => ordering != Ordering::Equal,
        Comparator::Greater => ordering == Ordering::Greater,
        Comparator::Less => ordering == Ordering::Less,
        Comparator::GreaterOrEqual => ordering != Ordering::Less,
        Comparator::LessOrEqual => ordering != Ordering::Greater,
        Comparator::In | Comparator::NotIn | Comparator::Package => return None,
    };
    Some(holds)
}

/// `In` holds when the value was found, `NotIn` when it was not.
fn membership_holds(found: bool, comparator: Comparator) -> bool {
    match comparator {
        Comparator::NotIn => !found,
        _ => found,
    }
}

/// Membership of `left` in the right-side list, each item mapped through `key`.
fn list_contains<R, T, F>(
    record: &R,
    condition: &Condition,
    left: T,
    key: F,
) -> Result<bool, EngineError>
where
    R: Record + ?Sized,
    T: PartialEq,
    F: Fn(&str) -> Result<T, EngineError>,
{
    for item in resolve_list(record, condition)? {
        if key(&item)? == left {
            return Ok(true);
        }
    }
    Ok(false)
}

fn unsupported(condition: &Condition) -> EngineError {
    EngineError::unsupported(format!(
        "comparator {:?} on {:?} condition",
        condition.comparator, condition.kind
    ))
}

// ──────────────────────────────────────────────
// Condition kinds
// ──────────────────────────────────────────────

/// Equality only; membership on strings is ambiguous and unsupported.
fn compare_strings<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
) -> Result<bool, EngineError> {
    let left = resolve_str(record, condition, Side::Left)?;
    let right = resolve_str(record, condition, Side::Right)?;
    match condition.comparator {
        Comparator::Equal => Ok(left == right),
        Comparator::NotEqual => Ok(left != right),
        _ => Err(unsupported(condition)),
    }
}

fn compare_integers<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
) -> Result<bool, EngineError> {
    let left = resolve_int(record, condition, Side::Left)?;

    if condition.comparator.is_membership() {
        let found = list_contains(record, condition, left, parse_int)?;
        return Ok(membership_holds(found, condition.comparator));
    }

    let right = resolve_int(record, condition, Side::Right)?;
    ordering_holds(left.cmp(&right), condition.comparator).ok_or_else(|| unsupported(condition))
}

/// Compares weekdays only; calendar date and time of day are ignored.
fn compare_weekdays<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
) -> Result<bool, EngineError> {
    let left = utc_weekday(resolve_timestamp(record, condition, Side::Left)?);

    if condition.comparator.is_membership() {
        let found = list_contains(record, condition, left, |item| {
            timestamp_from_literal(item).map(utc_weekday)
        })?;
        return Ok(membership_holds(found, condition.comparator));
    }

    let right = utc_weekday(resolve_timestamp(record, condition, Side::Right)?);
    match condition.comparator {
        Comparator::Equal => Ok(left == right),
        Comparator::NotEqual => Ok(left != right),
        _ => Err(unsupported(condition)),
    }
}

/// Compares calendar days; time of day is ignored.
fn compare_dates<R: Record + ?Sized>(
    record: &R,
    condition: &Condition,
) -> Result<bool, EngineError> {
    let left = utc_date(resolve_timestamp(record, condition, Side::Left)?);

    if condition.comparator.is_membership() {
        let found = list_contains(record, condition, left, |item| {
            timestamp_from_literal(item).map(utc_date)
        })?;
        return Ok(membership_holds(found, condition.comparator));
    }

    let right = utc_date(resolve_timestamp(record, condition, Side::Right)?);
    ordering_holds(left.cmp(&right), condition.comparator).ok_or_else(|| unsupported(condition))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
