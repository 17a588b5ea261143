//! Error types for cache operations.

/// Error type for cache operations.
///
/// Every variant carries a stable machine-readable [`code`](CacheError::code);
/// callers should branch on the code, not on the rendered message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The ambient browser-like environment is unavailable.
    #[error("No window object detected.")]
    NoWindowObject,

    /// The cache location is unknown or its storage medium is disabled.
    #[error("Given storage configuration option was not supported: {location}")]
    StorageNotSupported { location: String },

    /// The request-params entry was missing or could not be decoded.
    #[error("The token request could not be fetched from the cache correctly: {reason}")]
    TokenRequestCache { reason: String },

    /// The storage medium rejected a write.
    #[error("Failed to write cache entry '{key}': {reason}")]
    StorageWrite { key: String, reason: String },

    /// Cache options could not be parsed.
    #[error("Invalid cache options: {0}")]
    InvalidOptions(String),

    /// The client id is empty or contains a key separator.
    #[error("Invalid client id '{client_id}': must be non-empty and contain no '.' or '|'")]
    InvalidClientId { client_id: String },
}

impl CacheError {
    /// Stable identifier for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            CacheError::NoWindowObject => "no_window_object",
            CacheError::StorageNotSupported { .. } => "storage_not_supported",
            CacheError::TokenRequestCache { .. } => "token_request_cache_error",
            CacheError::StorageWrite { .. } => "storage_write_error",
            CacheError::InvalidOptions(_) => "invalid_cache_options",
            CacheError::InvalidClientId { .. } => "invalid_client_id",
        }
    }

    pub(crate) fn token_request_cache(reason: impl Into<String>) -> Self {
        CacheError::TokenRequestCache {
            reason: reason.into(),
        }
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
