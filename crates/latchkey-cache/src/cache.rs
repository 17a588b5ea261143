//! Client-scoped request cache.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::{CacheLocation, CacheOptions};
use crate::cookie::{self, CookieJar};
use crate::error::{CacheError, Result};
use crate::keys::{self, temporary};
use crate::migration::{LegacyMigrator, MigrationReport};
use crate::request::{Base64Codec, CachedAuthorizationRequest};
use crate::storage::StorageBackend;
use crate::window::Window;

/// The cache contract the authentication protocol layer writes through.
///
/// Every logical key is namespaced by client id before it reaches the
/// storage medium, so several applications can share one medium. When
/// `store_auth_state_in_cookie` is enabled, request state that has to
/// survive a full-page redirect (request state, origin URI, nonces and
/// authorities) is mirrored into cookies as well.
pub struct RequestCache {
    client_id: String,
    options: CacheOptions,
    storage: Rc<dyn StorageBackend>,
    cookies: Rc<dyn CookieJar>,
    migration: MigrationReport,
}

impl RequestCache {
    /// Select and validate the storage medium, then migrate legacy entries.
    ///
    /// Fails with [`CacheError::InvalidClientId`] when the id cannot scope a
    /// namespace, [`CacheError::NoWindowObject`] when the environment is
    /// unavailable and [`CacheError::StorageNotSupported`] when the
    /// configured medium is disabled.
    pub fn new(
        client_id: impl Into<String>,
        options: &CacheOptions,
        window: &dyn Window,
    ) -> Result<Self> {
        let client_id = client_id.into();
        if !keys::is_valid_client_id(&client_id) {
            return Err(CacheError::InvalidClientId { client_id });
        }

        if !window.is_available() {
            return Err(CacheError::NoWindowObject);
        }

        let storage = select_storage(window, options.cache_location)?;
        let migration = LegacyMigrator::new(&client_id).migrate(storage.as_ref());

        debug!(
            client_id = %client_id,
            cache_location = %options.cache_location,
            store_auth_state_in_cookie = options.store_auth_state_in_cookie,
            "Request cache initialized"
        );

        Ok(Self {
            client_id,
            options: options.clone(),
            storage,
            cookies: window.cookies(),
            migration,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// What the construction-time migration did.
    pub fn migration_report(&self) -> &MigrationReport {
        &self.migration
    }

    /// Namespaced form of `key` for this client.
    pub fn generate_cache_key(&self, key: &str) -> String {
        keys::namespace(&self.client_id, key)
    }

    fn mirrors_to_cookie(&self, key: &str) -> bool {
        self.options.store_auth_state_in_cookie && keys::is_redirect_state_key(key)
    }

    // ========================================================================
    // Storage contract
    // ========================================================================

    /// Store `value` under the logical `key`.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let cache_key = self.generate_cache_key(key);
        self.storage.set_item(&cache_key, value)?;
        if self.mirrors_to_cookie(key) {
            self.set_item_cookie(&cache_key, value, None);
        }
        trace!(key = %cache_key, "Cache entry written");
        Ok(())
    }

    /// Value stored under the logical `key`.
    ///
    /// The storage medium wins. Mirrored request state falls back to its
    /// cookie only when the medium has nothing, e.g. after the session
    /// medium was lost across a redirect.
    pub fn get_item(&self, key: &str) -> Option<String> {
        let cache_key = self.generate_cache_key(key);
        if let Some(value) = self.storage.get_item(&cache_key) {
            return Some(value);
        }

        if self.mirrors_to_cookie(key) {
            let value = self.get_item_cookie(&cache_key);
            if !value.is_empty() {
                trace!(key = %cache_key, "Cache entry recovered from cookie");
                return Some(value);
            }
        }

        None
    }

    /// Remove the logical `key`, and its cookie when mirrored.
    pub fn remove_item(&self, key: &str) {
        let cache_key = self.generate_cache_key(key);
        self.storage.remove_item(&cache_key);
        if self.mirrors_to_cookie(key) {
            self.clear_item_cookie(&cache_key);
        }
        trace!(key = %cache_key, "Cache entry removed");
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.storage.contains_key(&self.generate_cache_key(key))
    }

    /// Namespaced keys belonging to this client.
    pub fn get_keys(&self) -> Vec<String> {
        let prefix = keys::client_prefix(&self.client_id);
        self.storage
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .collect()
    }

    /// Remove every entry belonging to this client and, when mirroring is
    /// enabled, empty the cookie header.
    ///
    /// Other clients' entries and legacy `msal.<tag>` entries are kept.
    pub fn clear(&self) {
        let owned = self.get_keys();
        for key in &owned {
            self.storage.remove_item(key);
        }

        if self.options.store_auth_state_in_cookie {
            cookie::clear_all_cookies(self.cookies.as_ref());
        }

        debug!(client_id = %self.client_id, removed = owned.len(), "Request cache cleared");
    }

    // ========================================================================
    // Cookies
    // ========================================================================

    /// Write a cookie; see [`cookie::set_item_cookie`].
    pub fn set_item_cookie(&self, name: &str, value: &str, expiration_days: Option<i64>) {
        cookie::set_item_cookie(self.cookies.as_ref(), name, value, expiration_days);
    }

    /// Read a cookie, or an empty string when absent.
    pub fn get_item_cookie(&self, name: &str) -> String {
        cookie::get_item_cookie(self.cookies.as_ref(), name)
    }

    /// Expire a cookie.
    pub fn clear_item_cookie(&self, name: &str) {
        cookie::clear_item_cookie(self.cookies.as_ref(), name);
    }

    /// Clear the nonce, request-state and origin-URI cookies of one request.
    /// Cookies that are already gone are ignored.
    pub fn clear_msal_cookie(&self, correlation_id: &str) {
        self.clear_item_cookie(&self.generate_cache_key(&keys::generate_nonce_key(correlation_id)));
        self.clear_item_cookie(&self.generate_cache_key(temporary::REQUEST_STATE));
        self.clear_item_cookie(&self.generate_cache_key(temporary::ORIGIN_URI));
    }

    /// HTTP date `days` days from now.
    pub fn get_cookie_expiration_time(&self, days: i64) -> String {
        cookie::cookie_expiration_time(days)
    }

    // ========================================================================
    // Temporary request state
    // ========================================================================

    /// Record the state, nonce and authority of a request about to leave.
    pub fn update_cache_entries(&self, state: &str, nonce: &str, authority: &str) -> Result<()> {
        self.set_item(temporary::REQUEST_STATE, state)?;
        self.set_item(&keys::generate_nonce_key(state), nonce)?;
        self.set_authority_cache(authority, state)
    }

    /// Store the canonical form of `authority` for `correlation_id`.
    pub fn set_authority_cache(&self, authority: &str, correlation_id: &str) -> Result<()> {
        self.set_item(
            &keys::generate_authority_key(correlation_id),
            &canonical_authority(authority),
        )
    }

    /// Authority recorded for `correlation_id`.
    pub fn get_cached_authority(&self, correlation_id: &str) -> Option<String> {
        self.get_item(&keys::generate_authority_key(correlation_id))
    }

    /// Nonce recorded for `correlation_id`.
    pub fn get_cached_nonce(&self, correlation_id: &str) -> Option<String> {
        self.get_item(&keys::generate_nonce_key(correlation_id))
    }

    /// State of the single in-flight interactive request.
    pub fn get_request_state(&self) -> Option<String> {
        self.get_item(temporary::REQUEST_STATE)
    }

    /// Remember the page to return to after the redirect.
    pub fn set_origin_uri(&self, uri: &str) -> Result<()> {
        self.set_item(temporary::ORIGIN_URI, uri)
    }

    pub fn get_origin_uri(&self) -> Option<String> {
        self.get_item(temporary::ORIGIN_URI)
    }

    /// Drop all temporary state of one request. Safe to call when some or
    /// all of it is already gone.
    pub fn reset_request_cache(&self, correlation_id: &str) {
        self.remove_item(&keys::generate_nonce_key(correlation_id));
        self.remove_item(&keys::generate_authority_key(correlation_id));
        self.remove_item(temporary::REQUEST_STATE);
        self.remove_item(temporary::REQUEST_PARAMS);
        self.remove_item(temporary::ORIGIN_URI);
        debug!(correlation_id = %correlation_id, "Request cache reset");
    }

    // ========================================================================
    // Authorization request recovery
    // ========================================================================

    /// Serialize `request` and store it as the request-params entry.
    pub fn cache_code_request(
        &self,
        request: &CachedAuthorizationRequest,
        codec: &dyn Base64Codec,
    ) -> Result<()> {
        let json = serde_json::to_string(request).map_err(|e| CacheError::StorageWrite {
            key: self.generate_cache_key(temporary::REQUEST_PARAMS),
            reason: e.to_string(),
        })?;
        self.set_item(temporary::REQUEST_PARAMS, &codec.base64_encode(&json))
    }

    /// Recover the request stored by [`cache_code_request`](Self::cache_code_request).
    ///
    /// An authority embedded in the request is kept. Otherwise the authority
    /// cached for `correlation_id` is substituted; if there is none the field
    /// stays unset.
    pub fn get_cached_request(
        &self,
        correlation_id: &str,
        codec: &dyn Base64Codec,
    ) -> Result<CachedAuthorizationRequest> {
        let encoded = self
            .get_item(temporary::REQUEST_PARAMS)
            .ok_or_else(|| CacheError::token_request_cache("no cached request parameters"))?;

        let json = codec
            .base64_decode(&encoded)
            .map_err(CacheError::token_request_cache)?;

        let mut request: CachedAuthorizationRequest = serde_json::from_str(&json)
            .map_err(|e| CacheError::token_request_cache(format!("malformed request: {e}")))?;

        if !request.has_authority() {
            request.authority = self.get_cached_authority(correlation_id);
            trace!(
                correlation_id = %correlation_id,
                found = request.authority.is_some(),
                "Request has no authority, using cached authority"
            );
        }

        Ok(request)
    }
}

impl fmt::Debug for RequestCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCache")
            .field("client_id", &self.client_id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn select_storage(window: &dyn Window, location: CacheLocation) -> Result<Rc<dyn StorageBackend>> {
    window
        .storage(location)
        .ok_or_else(|| CacheError::StorageNotSupported {
            location: location.to_string(),
        })
}

/// Authorities are compared and stored with a trailing slash.
fn canonical_authority(authority: &str) -> String {
    if authority.ends_with('/') {
        authority.to_string()
    } else {
        format!("{authority}/")
    }
}
