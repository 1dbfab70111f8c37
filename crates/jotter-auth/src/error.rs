//! Authentication and authorization error types.

use jotter_storage::StorageError;

/// Errors that can occur during authentication and authorization operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider returned a profile without the data needed to identify
    /// the user. The login fails before any storage access.
    #[error("Malformed provider profile: {message}")]
    MalformedProfile {
        /// Description of what was missing or invalid.
        message: String,
    },

    /// A referenced record does not exist (dangling credential, or a
    /// session whose user is gone). Session paths treat this identically
    /// to "unauthenticated".
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what could not be resolved.
        message: String,
    },

    /// The request lacks valid authentication credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The authenticated user does not own the target resource.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// The identity provider failed or returned an error.
    #[error("Identity provider error: {provider} - {message}")]
    Provider {
        /// The identity provider id.
        provider: String,
        /// Description of the error.
        message: String,
    },

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `MalformedProfile` error.
    #[must_use]
    pub fn malformed_profile(message: impl Into<String>) -> Self {
        Self::MalformedProfile {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `Provider` error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedProfile { .. }
                | Self::NotFound { .. }
                | Self::Unauthorized { .. }
                | Self::Forbidden { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Storage { .. } | Self::Configuration { .. }
        )
    }

    /// Returns `true` if callers must treat this as "unauthenticated".
    ///
    /// A session that resolves to a missing user is indistinguishable, to
    /// the caller, from no session at all.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotFound { .. })
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(message) => Self::NotFound { message },
            other => Self::Storage {
                message: other.to_string(),
            },
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::malformed_profile("missing email");
        assert_eq!(err.to_string(), "Malformed provider profile: missing email");

        let err = AuthError::provider("google", "token exchange failed");
        assert_eq!(
            err.to_string(),
            "Identity provider error: google - token exchange failed"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::unauthorized("no session").is_client_error());
        assert!(AuthError::forbidden("not the owner").is_client_error());
        assert!(!AuthError::storage("db down").is_client_error());

        assert!(AuthError::storage("db down").is_server_error());
        assert!(AuthError::provider("google", "5xx").is_server_error());

        assert!(AuthError::unauthorized("x").is_unauthenticated());
        assert!(AuthError::not_found("user gone").is_unauthenticated());
        assert!(!AuthError::forbidden("x").is_unauthenticated());
    }

    #[test]
    fn test_from_storage_error() {
        let err = AuthError::from(StorageError::not_found("user 42"));
        assert!(matches!(err, AuthError::NotFound { .. }));

        let err = AuthError::from(StorageError::invalid_input("bad row"));
        assert!(matches!(err, AuthError::Storage { .. }));
    }
}
