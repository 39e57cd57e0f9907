//! Embedded in-process configuration store.
//!
//! `MemoryStore` implements the full [`ConfigStore`] contract against a
//! lock-guarded vector of records. It is the reference implementation for
//! tests and for embedding: uniqueness, write stamping and the query
//! filters behave exactly as a remote document store is required to.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::core::entry::{ConfigEntry, EntryId};
use crate::core::error::{TidelineError, TidelineResult};
use crate::store::ConfigStore;

/// In-process [`ConfigStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<ConfigEntry>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry exactly as given, without stamping or identity
    /// assignment. Intended for seeding fixtures and embedded bootstrap
    /// data; uniqueness is still enforced.
    pub fn seed(&self, entry: ConfigEntry) -> TidelineResult<()> {
        let mut entries = self.entries.write();
        if entries
            .iter()
            .any(|e| e.application == entry.application && e.name == entry.name)
        {
            return Err(TidelineError::duplicate_name(
                entry.application.clone(),
                entry.name.clone(),
            ));
        }
        entries.push(entry);
        Ok(())
    }

    /// Number of records across all applications.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn assign_id(&self) -> EntryId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        EntryId::new(format!("mem-{}", n + 1))
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn active_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .filter(|e| e.application == application && e.active)
            .cloned()
            .collect())
    }

    async fn all_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .filter(|e| e.application == application)
            .cloned()
            .collect())
    }

    async fn active_entries_updated_since(
        &self,
        application: &str,
        since: DateTime<Utc>,
    ) -> TidelineResult<Vec<ConfigEntry>> {
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .filter(|e| e.application == application && e.active && e.updated_at > since)
            .cloned()
            .collect())
    }

    async fn create(&self, entry: ConfigEntry) -> TidelineResult<ConfigEntry> {
        let mut entries = self.entries.write();
        if entries
            .iter()
            .any(|e| e.application == entry.application && e.name == entry.name)
        {
            return Err(TidelineError::duplicate_name(
                entry.application.clone(),
                entry.name.clone(),
            ));
        }

        let mut created = entry;
        if created.id.is_blank() {
            created.id = self.assign_id();
        }
        created.updated_at = Utc::now();
        entries.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &EntryId,
        application: &str,
        entry: ConfigEntry,
    ) -> TidelineResult<Option<ConfigEntry>> {
        let mut entries = self.entries.write();

        let Some(index) = entries
            .iter()
            .position(|e| &e.id == id && e.application == application)
        else {
            return Ok(None);
        };

        // Renaming onto an existing name breaks uniqueness just like create.
        if entry.name != entries[index].name
            && entries
                .iter()
                .any(|e| e.application == application && e.name == entry.name)
        {
            return Err(TidelineError::duplicate_name(
                application.to_string(),
                entry.name.clone(),
            ));
        }

        let updated = ConfigEntry {
            id: id.clone(),
            application: application.to_string(),
            name: entry.name,
            kind: entry.kind,
            value: entry.value,
            active: entry.active,
            updated_at: Utc::now(),
        };
        entries[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn set_active(
        &self,
        id: &EntryId,
        application: &str,
        active: bool,
    ) -> TidelineResult<bool> {
        let mut entries = self.entries.write();

        let Some(record) = entries
            .iter_mut()
            .find(|e| &e.id == id && e.application == application)
        else {
            return Ok(false);
        };

        record.active = active;
        record.updated_at = Utc::now();
        Ok(true)
    }
}
