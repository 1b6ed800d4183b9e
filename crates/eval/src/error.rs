use std::num::ParseIntError;

use crate::record::FieldError;

/// Errors that abort an evaluation.
///
/// A condition evaluating false or a setting being skipped is never an
/// error; those are ordinary outcomes. Every variant here aborts the whole
/// call chain and is returned to the caller unmodified.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A condition side kind that conditions cannot resolve.
    #[error("invalid condition side: {side}")]
    ConditionSideInvalid { side: String },

    /// A modifier side kind that the operand cannot resolve, or a
    /// non-numeric jump offset.
    #[error("invalid modifier side: {side}")]
    ModifierSideInvalid { side: String },

    /// A select lookup found no entry for the key.
    #[error("field not existed: no selection entry for key '{key}'")]
    FieldNotExisted { key: String },

    #[error("unsupported operation: {operation}")]
    UnsupportedOperation { operation: String },

    #[error("rule settings not in order: sequence {previous} is followed by {next} at index {index}")]
    SettingNotInOrder {
        index: usize,
        previous: i64,
        next: i64,
    },

    #[error("divide by zero")]
    DivByZero,

    /// The rule supply failed during a jump or jump-return. The supply's own
    /// error is logged, not carried.
    #[error("unable to fetch rule settings '{rule_id}' from sequence {start}")]
    UnableToFetch { rule_id: String, start: i64 },

    #[error("integer overflow in {operation}")]
    Overflow { operation: &'static str },

    #[error("jump depth {depth} exceeds the configured maximum")]
    JumpDepthExceeded { depth: usize },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("invalid integer '{value}': {source}")]
    Parse {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("timestamp out of range: {value}")]
    InvalidTimestamp { value: i64 },

    #[error("invalid complex value: {0}")]
    InvalidComplex(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn unsupported(operation: impl Into<String>) -> Self {
        EngineError::UnsupportedOperation {
            operation: operation.into(),
        }
    }
}

/// Parse a decimal integer literal, surrounding whitespace ignored.
pub(crate) fn parse_int(text: &str) -> Result<i64, EngineError> {
    text.trim()
        .parse::<i64>()
        .map_err(|source| EngineError::Parse {
            value: text.to_string(),
            source,
        })
}
