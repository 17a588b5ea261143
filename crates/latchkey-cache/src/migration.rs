//! Migration of entries written by releases that predate per-client keys.
//!
//! Older releases stored a handful of persistent values under the bare
//! `msal.<tag>` form. Those values are copied forward to
//! `msal.<client-id>.<tag>` so the current key scheme finds them. The legacy
//! entries are left in place: other consumers may still read the old format.

use tracing::{debug, warn};

use crate::keys::{LEGACY_TAGS, legacy_key, namespace};
use crate::storage::StorageBackend;

/// Outcome of one migration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Tags whose legacy value was copied to the namespaced key.
    pub migrated: Vec<&'static str>,

    /// Tags with a legacy value that already had a namespaced value.
    pub already_present: Vec<&'static str>,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.migrated.is_empty() && self.already_present.is_empty()
    }
}

/// Copies legacy entries forward for one client.
#[derive(Debug, Clone)]
pub struct LegacyMigrator<'a> {
    client_id: &'a str,
}

impl<'a> LegacyMigrator<'a> {
    pub fn new(client_id: &'a str) -> Self {
        Self { client_id }
    }

    /// Run one pass against `storage`.
    ///
    /// Never fails: a missing legacy entry is skipped and a rejected write is
    /// logged and skipped. Running it again is a no-op.
    pub fn migrate(&self, storage: &dyn StorageBackend) -> MigrationReport {
        let mut report = MigrationReport::default();

        for tag in LEGACY_TAGS {
            let Some(value) = storage.get_item(&legacy_key(tag)) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }

            let target = namespace(self.client_id, tag);
            if storage.contains_key(&target) {
                report.already_present.push(tag);
                continue;
            }

            match storage.set_item(&target, &value) {
                Ok(()) => report.migrated.push(tag),
                Err(e) => warn!(key = %target, error = %e, "Failed to migrate legacy cache entry"),
            }
        }

        if !report.migrated.is_empty() {
            debug!(
                client_id = %self.client_id,
                migrated = ?report.migrated,
                "Migrated legacy cache entries"
            );
        }

        report
    }
}
