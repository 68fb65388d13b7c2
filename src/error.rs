/// The main error type for entitlement operations.
///
/// Entitlement resolution itself never fails: unrecognized or missing
/// subscription state resolves to the free tier. Errors only arise from the
/// external store contracts and from malformed billing events.
#[derive(Debug, thiserror::Error)]
pub enum EntitlementError {
    #[error("Account not found: {account_id}")]
    AccountNotFound { account_id: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid billing event: {0}")]
    InvalidEvent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl EntitlementError {
    pub fn account_not_found(account_id: impl Into<String>) -> Self {
        Self::AccountNotFound {
            account_id: account_id.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Self::InvalidEvent(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is a client-side problem (bad input, missing
    /// record) rather than a store/infrastructure failure.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound { .. } | Self::InvalidEvent(_) | Self::Config(_)
        )
    }
}

impl From<serde_json::Error> for EntitlementError {
    fn from(err: serde_json::Error) -> Self {
        EntitlementError::InvalidEvent(format!("JSON error: {}", err))
    }
}

/// Result type alias for entitlement operations.
pub type Result<T> = std::result::Result<T, EntitlementError>;
