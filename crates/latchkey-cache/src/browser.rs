//! Bindings to the real browser environment.
//!
//! Storage errors raised by the host (private browsing, quota) are logged and
//! reported as absence on reads; writes surface them as
//! [`CacheError::StorageWrite`].

use std::rc::Rc;

use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};

use crate::config::CacheLocation;
use crate::cookie::CookieJar;
use crate::error::{CacheError, Result};
use crate::storage::StorageBackend;
use crate::window::Window;

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

/// `window.sessionStorage` or `window.localStorage`.
pub struct WebStorage {
    inner: web_sys::Storage,
}

impl WebStorage {
    pub fn new(inner: web_sys::Storage) -> Self {
        Self { inner }
    }
}

impl StorageBackend for WebStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.inner.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %describe(&e), "Storage read failed");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .set_item(key, value)
            .map_err(|e| CacheError::StorageWrite {
                key: key.to_string(),
                reason: describe(&e),
            })
    }

    fn remove_item(&self, key: &str) {
        if let Err(e) = self.inner.remove_item(key) {
            warn!(key = %key, error = %describe(&e), "Storage remove failed");
        }
    }

    fn keys(&self) -> Vec<String> {
        let len = self.inner.length().unwrap_or(0);
        (0..len)
            .filter_map(|index| self.inner.key(index).ok().flatten())
            .collect()
    }

    fn clear(&self) {
        if let Err(e) = self.inner.clear() {
            warn!(error = %describe(&e), "Storage clear failed");
        }
    }
}

/// `document.cookie`.
pub struct DocumentCookies {
    document: web_sys::HtmlDocument,
}

impl CookieJar for DocumentCookies {
    fn read(&self) -> String {
        self.document.cookie().unwrap_or_else(|e| {
            warn!(error = %describe(&e), "Cookie read failed");
            String::new()
        })
    }

    fn write(&self, cookie: &str) {
        if let Err(e) = self.document.set_cookie(cookie) {
            warn!(error = %describe(&e), "Cookie write failed");
        }
    }
}

/// A cookie jar for documents that do not expose cookies.
struct NoCookies;

impl CookieJar for NoCookies {
    fn read(&self) -> String {
        String::new()
    }

    fn write(&self, _cookie: &str) {}
}

/// The global `window`.
pub struct BrowserWindow {
    window: Option<web_sys::Window>,
}

impl BrowserWindow {
    pub fn new() -> Self {
        Self {
            window: web_sys::window(),
        }
    }
}

impl Default for BrowserWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Window for BrowserWindow {
    fn is_available(&self) -> bool {
        self.window.is_some()
    }

    fn storage(&self, location: CacheLocation) -> Option<Rc<dyn StorageBackend>> {
        let window = self.window.as_ref()?;
        let storage = match location {
            CacheLocation::SessionStorage => window.session_storage(),
            CacheLocation::LocalStorage => window.local_storage(),
        };

        match storage {
            Ok(Some(storage)) => Some(Rc::new(WebStorage::new(storage)) as Rc<dyn StorageBackend>),
            Ok(None) => None,
            Err(e) => {
                warn!(cache_location = %location, error = %describe(&e), "Storage is not accessible");
                None
            }
        }
    }

    fn cookies(&self) -> Rc<dyn CookieJar> {
        let document = self
            .window
            .as_ref()
            .and_then(|window| window.document())
            .and_then(|document| document.dyn_into::<web_sys::HtmlDocument>().ok());

        match document {
            Some(document) => Rc::new(DocumentCookies { document }) as Rc<dyn CookieJar>,
            None => Rc::new(NoCookies),
        }
    }
}
