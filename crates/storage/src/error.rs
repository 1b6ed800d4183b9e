/// All errors that can be returned by a RuleSupply implementation.
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    /// No settings are stored under the requested rule id.
    #[error("rule settings not found: {rule_id}")]
    NotFound { rule_id: String },

    /// A stored rule blob could not be encoded or decoded.
    #[error("rule codec error: {0}")]
    Codec(String),

    /// A backend-specific storage error (DB connection, lock poisoning, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for SupplyError {
    fn from(err: serde_json::Error) -> Self {
        SupplyError::Codec(err.to_string())
    }
}
