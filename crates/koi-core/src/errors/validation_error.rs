/// Malformed caller input, rejected before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("limit {limit} out of range (1..={max})")]
    LimitOutOfRange { limit: usize, max: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },
}
