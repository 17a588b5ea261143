//! Client-scoped browser storage cache for OAuth/OIDC request state.
//!
//! This crate sits between authentication protocol logic, which decides what
//! to remember, and a pluggable storage medium, which decides where the bytes
//! live. It provides:
//! - Per-client key namespacing (`msal.<client-id>.<key>`)
//! - Session-scoped or durable storage selected once at construction
//! - Optional cookie mirroring of state that must survive a full-page redirect
//! - One-time migration of entries written under the legacy key format
//! - The temporary state lifecycle of an in-flight authorization request
//!
//! # Example
//!
//! ```rust
//! use latchkey_cache::{CacheLocation, CacheOptions, MemoryWindow, RequestCache};
//!
//! let window = MemoryWindow::new();
//! let options = CacheOptions::new()
//!     .with_cache_location(CacheLocation::LocalStorage)
//!     .with_store_auth_state_in_cookie(true);
//!
//! let cache = RequestCache::new("my-client-id", &options, &window)?;
//! cache.update_cache_entries("state-123", "nonce-456", "https://login.example/common")?;
//!
//! assert_eq!(cache.get_cached_nonce("state-123").as_deref(), Some("nonce-456"));
//! cache.reset_request_cache("state-123");
//! # Ok::<(), latchkey_cache::CacheError>(())
//! ```

#[cfg(all(feature = "browser", target_arch = "wasm32"))]
pub mod browser;
mod cache;
mod config;
pub mod cookie;
mod error;
pub mod keys;
mod migration;
mod request;
mod storage;
mod window;

pub use cache::RequestCache;
pub use config::{CacheLocation, CacheOptions};
pub use cookie::{CookieJar, MemoryCookieJar};
pub use error::{CacheError, Result};
pub use migration::{LegacyMigrator, MigrationReport};
pub use request::{Base64Codec, CachedAuthorizationRequest, StandardBase64};
pub use storage::{MemoryStorage, StorageBackend};
pub use window::{MemoryWindow, Window};
