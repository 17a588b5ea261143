//! The host environment a cache is constructed against.

use std::rc::Rc;

use crate::config::CacheLocation;
use crate::cookie::{CookieJar, MemoryCookieJar};
use crate::storage::{MemoryStorage, StorageBackend};

/// A browser-like environment providing storage media and a cookie header.
pub trait Window {
    /// Whether the environment exists at all. A cache cannot be built
    /// against an unavailable window.
    fn is_available(&self) -> bool {
        true
    }

    /// The storage medium for `location`, or `None` if the host has it
    /// disabled.
    fn storage(&self, location: CacheLocation) -> Option<Rc<dyn StorageBackend>>;

    /// The shared cookie header.
    fn cookies(&self) -> Rc<dyn CookieJar>;
}

/// In-process environment with one session medium, one durable medium and
/// a cookie jar.
///
/// Clones share the same underlying media, so two caches built from clones
/// of one window see each other's writes, as two scripts on one page would.
#[derive(Debug, Clone)]
pub struct MemoryWindow {
    session: Rc<MemoryStorage>,
    local: Rc<MemoryStorage>,
    cookies: Rc<MemoryCookieJar>,
    available: bool,
    session_enabled: bool,
    local_enabled: bool,
}

impl Default for MemoryWindow {
    fn default() -> Self {
        Self {
            session: Rc::new(MemoryStorage::new()),
            local: Rc::new(MemoryStorage::new()),
            cookies: Rc::new(MemoryCookieJar::new()),
            available: true,
            session_enabled: true,
            local_enabled: true,
        }
    }
}

impl MemoryWindow {
    /// Create an environment with both media enabled and no cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment that reports itself as absent.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::default()
        }
    }

    /// Disable the medium for `location`, as a host with storage turned off
    /// would.
    pub fn without_storage(mut self, location: CacheLocation) -> Self {
        match location {
            CacheLocation::SessionStorage => self.session_enabled = false,
            CacheLocation::LocalStorage => self.local_enabled = false,
        }
        self
    }

    /// Direct access to the session medium.
    pub fn session_storage(&self) -> &MemoryStorage {
        &self.session
    }

    /// Direct access to the durable medium.
    pub fn local_storage(&self) -> &MemoryStorage {
        &self.local
    }

    /// Direct access to the cookie jar.
    pub fn cookie_jar(&self) -> &MemoryCookieJar {
        &self.cookies
    }

    /// End the browsing session: session storage and session cookies are
    /// gone, durable storage and persistent cookies remain.
    pub fn end_session(&self) {
        self.session.clear();
        self.cookies.end_session();
    }
}

impl Window for MemoryWindow {
    fn is_available(&self) -> bool {
        self.available
    }

    fn storage(&self, location: CacheLocation) -> Option<Rc<dyn StorageBackend>> {
        match location {
            CacheLocation::SessionStorage if self.session_enabled => {
                Some(self.session.clone() as Rc<dyn StorageBackend>)
            }
            CacheLocation::LocalStorage if self.local_enabled => {
                Some(self.local.clone() as Rc<dyn StorageBackend>)
            }
            _ => None,
        }
    }

    fn cookies(&self) -> Rc<dyn CookieJar> {
        self.cookies.clone()
    }
}
