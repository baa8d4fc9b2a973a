use thiserror::Error;

/// Failure of a domain operation, mapped to an HTTP status by the REST layer
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        DomainError::Forbidden(message.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        assert_eq!(DomainError::validation("Amount must be positive").to_string(), "Amount must be positive");
        assert_eq!(DomainError::not_found("Account not found").to_string(), "Account not found");
    }

    #[test]
    fn test_storage_errors_convert_from_anyhow() {
        let err: DomainError = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, DomainError::Storage(_)));
        assert_eq!(err.to_string(), "Storage error: connection reset");
    }
}
