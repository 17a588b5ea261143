//! Configuration for the request cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

const SESSION_STORAGE: &str = "sessionStorage";
const LOCAL_STORAGE: &str = "localStorage";

/// Where cache entries live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CacheLocation {
    /// Cleared when the tab or window session ends.
    #[default]
    #[serde(rename = "sessionStorage")]
    SessionStorage,
    /// Survives across sessions.
    #[serde(rename = "localStorage")]
    LocalStorage,
}

impl CacheLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheLocation::SessionStorage => SESSION_STORAGE,
            CacheLocation::LocalStorage => LOCAL_STORAGE,
        }
    }
}

impl fmt::Display for CacheLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheLocation {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            SESSION_STORAGE => Ok(CacheLocation::SessionStorage),
            LOCAL_STORAGE => Ok(CacheLocation::LocalStorage),
            other => Err(CacheError::StorageNotSupported {
                location: other.to_string(),
            }),
        }
    }
}

/// Options consumed by [`RequestCache`](crate::RequestCache).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheOptions {
    /// Storage medium backing the cache.
    pub cache_location: CacheLocation,

    /// Mirror redirect-sensitive request state into cookies so it survives
    /// a full-page redirect even when the storage medium does not.
    pub store_auth_state_in_cookie: bool,
}

/// Wire form of [`CacheOptions`]; the location stays a raw string until
/// it is validated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCacheOptions {
    #[serde(default)]
    cache_location: Option<String>,
    #[serde(default)]
    store_auth_state_in_cookie: bool,
}

impl CacheOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache location.
    pub fn with_cache_location(mut self, location: CacheLocation) -> Self {
        self.cache_location = location;
        self
    }

    /// Enable or disable cookie mirroring of request state.
    pub fn with_store_auth_state_in_cookie(mut self, enabled: bool) -> Self {
        self.store_auth_state_in_cookie = enabled;
        self
    }

    /// Parse options from their JSON form, e.g.
    /// `{"cacheLocation":"localStorage","storeAuthStateInCookie":true}`.
    ///
    /// An unrecognized `cacheLocation` fails with
    /// [`CacheError::StorageNotSupported`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawCacheOptions =
            serde_json::from_str(json).map_err(|e| CacheError::InvalidOptions(e.to_string()))?;

        let cache_location = match raw.cache_location {
            Some(location) => location.parse()?,
            None => CacheLocation::default(),
        };

        Ok(Self {
            cache_location,
            store_auth_state_in_cookie: raw.store_auth_state_in_cookie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CacheOptions::default();
        assert_eq!(options.cache_location, CacheLocation::SessionStorage);
        assert!(!options.store_auth_state_in_cookie);
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(
            "localStorage".parse::<CacheLocation>().unwrap(),
            CacheLocation::LocalStorage
        );
        assert_eq!(
            "sessionStorage".parse::<CacheLocation>().unwrap(),
            CacheLocation::SessionStorage
        );

        let err = "cookieStorage".parse::<CacheLocation>().unwrap_err();
        assert_eq!(err.code(), "storage_not_supported");
    }

    #[test]
    fn test_from_json() {
        let options =
            CacheOptions::from_json(r#"{"cacheLocation":"localStorage","storeAuthStateInCookie":true}"#)
                .unwrap();
        assert_eq!(options.cache_location, CacheLocation::LocalStorage);
        assert!(options.store_auth_state_in_cookie);

        let options = CacheOptions::from_json("{}").unwrap();
        assert_eq!(options, CacheOptions::default());
    }

    #[test]
    fn test_from_json_rejects_unknown_location() {
        let err = CacheOptions::from_json(r#"{"cacheLocation":"indexedDB"}"#).unwrap_err();
        assert_eq!(
            err,
            CacheError::StorageNotSupported {
                location: "indexedDB".to_string()
            }
        );
    }

    #[test]
    fn test_from_json_malformed() {
        let err = CacheOptions::from_json("{not json").unwrap_err();
        assert_eq!(err.code(), "invalid_cache_options");
    }

    #[test]
    fn test_serialize_camel_case() {
        let options = CacheOptions::new()
            .with_cache_location(CacheLocation::LocalStorage)
            .with_store_auth_state_in_cookie(true);
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(
            json,
            r#"{"cacheLocation":"localStorage","storeAuthStateInCookie":true}"#
        );
    }
}
