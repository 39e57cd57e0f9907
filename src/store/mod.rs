//! Store contract and implementations.
//!
//! The refresh engine is a consumer of whatever backend actually holds the
//! configuration records; it only depends on the [`ConfigStore`] contract:
//! - [`memory`] - Embedded in-process implementation
//! - [`resilient`] - Retry/timeout decorator over any implementation
//!
//! The read side (`active_entries`, `active_entries_updated_since`) feeds
//! the refresh loop. The write side (`create`, `update`, `set_active`,
//! `all_entries`) exists for administrative collaborators; the cache itself
//! never writes.

pub mod memory;
pub mod resilient;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::entry::{ConfigEntry, EntryId};
use crate::core::error::TidelineResult;

/// Asynchronous, application-scoped configuration store.
///
/// Implementations must enforce `(application, name)` uniqueness among
/// current records, surfacing violations as
/// [`TidelineError::DuplicateName`](crate::TidelineError::DuplicateName),
/// and must stamp `updated_at` on every successful write.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// All active entries for the application.
    async fn active_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>>;

    /// Every entry for the application, active or not. Admin listing; the
    /// refresh loop never calls this.
    async fn all_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>>;

    /// Active entries whose `updated_at` is strictly after `since`.
    async fn active_entries_updated_since(
        &self,
        application: &str,
        since: DateTime<Utc>,
    ) -> TidelineResult<Vec<ConfigEntry>>;

    /// Persist a new entry. The store assigns the identity when blank and
    /// stamps `updated_at`.
    async fn create(&self, entry: ConfigEntry) -> TidelineResult<ConfigEntry>;

    /// Replace an existing entry's name, kind, value and active flag.
    /// Returns `None` when no record matches both `id` and `application`.
    async fn update(
        &self,
        id: &EntryId,
        application: &str,
        entry: ConfigEntry,
    ) -> TidelineResult<Option<ConfigEntry>>;

    /// Flip an entry's active flag. Returns `false` when no record matches
    /// both `id` and `application`.
    async fn set_active(
        &self,
        id: &EntryId,
        application: &str,
        active: bool,
    ) -> TidelineResult<bool>;
}

#[async_trait]
impl<S: ConfigStore + ?Sized> ConfigStore for Arc<S> {
    async fn active_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        (**self).active_entries(application).await
    }

    async fn all_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        (**self).all_entries(application).await
    }

    async fn active_entries_updated_since(
        &self,
        application: &str,
        since: DateTime<Utc>,
    ) -> TidelineResult<Vec<ConfigEntry>> {
        (**self)
            .active_entries_updated_since(application, since)
            .await
    }

    async fn create(&self, entry: ConfigEntry) -> TidelineResult<ConfigEntry> {
        (**self).create(entry).await
    }

    async fn update(
        &self,
        id: &EntryId,
        application: &str,
        entry: ConfigEntry,
    ) -> TidelineResult<Option<ConfigEntry>> {
        (**self).update(id, application, entry).await
    }

    async fn set_active(
        &self,
        id: &EntryId,
        application: &str,
        active: bool,
    ) -> TidelineResult<bool> {
        (**self).set_active(id, application, active).await
    }
}

pub use memory::MemoryStore;
pub use resilient::ResilientStore;
