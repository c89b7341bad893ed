//! Error kinds surfaced by the governance core.

/// Result type for governance operations.
pub type CongressResult<T> = Result<T, CongressError>;

/// Result type for collaborator (store) operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Coarse error classification reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, failed precondition, duplicate vote, fraud.
    InvalidData,
    /// Caller lacks the required role or membership.
    AccessDenied,
    /// Referenced proposal, member or body does not exist.
    NotFound,
    /// A collaborator failed.
    Storage,
}

/// Governance errors.
#[derive(Debug, thiserror::Error)]
pub enum CongressError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CongressError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CongressError::InvalidData(_) => ErrorKind::InvalidData,
            CongressError::AccessDenied(_) => ErrorKind::AccessDenied,
            CongressError::NotFound(_) => ErrorKind::NotFound,
            CongressError::Store(
                StoreError::DuplicateVote | StoreError::NotOpen(_) | StoreError::Throttled,
            ) => ErrorKind::InvalidData,
            CongressError::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            CongressError::Store(_) => ErrorKind::Storage,
        }
    }
}

/// Collaborator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Treasury debit would go below zero.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// A vote for this (proposal, voter) pair already exists.
    #[error("Vote already recorded")]
    DuplicateVote,

    /// The proposal is closed or already holds every expected vote.
    #[error("Proposal not open for votes: {0}")]
    NotOpen(String),

    /// The proposer submitted another proposal within the cooldown.
    #[error("Proposal cooldown has not elapsed")]
    Throttled,

    #[error("Record not found: {0}")]
    NotFound(String),

    /// Balance arithmetic overflowed.
    #[error("Balance overflow")]
    Overflow,

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CongressError::InvalidData("x".into()).kind(),
            ErrorKind::InvalidData
        );
        assert_eq!(
            CongressError::AccessDenied("x".into()).kind(),
            ErrorKind::AccessDenied
        );
        assert_eq!(CongressError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            CongressError::from(StoreError::DuplicateVote).kind(),
            ErrorKind::InvalidData
        );
        assert_eq!(
            CongressError::from(StoreError::NotOpen("proposal#1".into())).kind(),
            ErrorKind::InvalidData
        );
        assert_eq!(
            CongressError::from(StoreError::Throttled).kind(),
            ErrorKind::InvalidData
        );
        assert_eq!(
            CongressError::from(StoreError::Backend("disk full".into())).kind(),
            ErrorKind::Storage
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CongressError::InvalidData("reason must not be empty".into()).to_string(),
            "Invalid data: reason must not be empty"
        );
        assert_eq!(
            CongressError::from(StoreError::InsufficientFunds).to_string(),
            "Store error: Insufficient funds"
        );
    }
}
