//! Common test utilities.
//!
//! This module contains shared helpers for integration tests.
//! Import with `mod common;` in test files.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tideline::{
    ConfigEntry, ConfigStore, EntryId, MemoryStore, TidelineError, TidelineResult, ValueKind,
};

/// Application scope used across the tests.
pub const APP: &str = "service-a";

/// A UTC timestamp at the given second offset.
pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// An active entry for [`APP`] with a deterministic identity and timestamp.
pub fn entry(name: &str, kind: ValueKind, value: &str, stamp: i64) -> ConfigEntry {
    ConfigEntry {
        id: EntryId::new(format!("id-{}", name)),
        application: APP.to_string(),
        name: name.to_string(),
        kind,
        value: value.to_string(),
        active: true,
        updated_at: ts(stamp),
    }
}

/// A [`MemoryStore`] seeded with the given entries, timestamps untouched.
pub fn seeded_store(entries: Vec<ConfigEntry>) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for e in entries {
        store.seed(e).expect("seed entry");
    }
    Arc::new(store)
}

// ============================================================================
// Fake stores
// ============================================================================

/// Store that fails its first `failures` calls, then delegates to an inner
/// [`MemoryStore`]. Every call is counted, failed or not.
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
    failures_left: AtomicU32,
    error: fn() -> TidelineError,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore, failures: u32) -> Self {
        Self::failing_with(inner, failures, || {
            TidelineError::unavailable("simulated outage")
        })
    }

    pub fn failing_with(inner: MemoryStore, failures: u32, error: fn() -> TidelineError) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            failures_left: AtomicU32::new(failures),
            error,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next `n` calls fail.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    fn gate(&self) -> TidelineResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err((self.error)());
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FlakyStore {
    async fn active_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        self.gate()?;
        self.inner.active_entries(application).await
    }

    async fn all_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        self.gate()?;
        self.inner.all_entries(application).await
    }

    async fn active_entries_updated_since(
        &self,
        application: &str,
        since: DateTime<Utc>,
    ) -> TidelineResult<Vec<ConfigEntry>> {
        self.gate()?;
        self.inner
            .active_entries_updated_since(application, since)
            .await
    }

    async fn create(&self, entry: ConfigEntry) -> TidelineResult<ConfigEntry> {
        self.gate()?;
        self.inner.create(entry).await
    }

    async fn update(
        &self,
        id: &EntryId,
        application: &str,
        entry: ConfigEntry,
    ) -> TidelineResult<Option<ConfigEntry>> {
        self.gate()?;
        self.inner.update(id, application, entry).await
    }

    async fn set_active(
        &self,
        id: &EntryId,
        application: &str,
        active: bool,
    ) -> TidelineResult<bool> {
        self.gate()?;
        self.inner.set_active(id, application, active).await
    }
}

/// Store decorator that counts every call before delegating.
pub struct CountingStore<S> {
    pub inner: S,
    pub calls: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: ConfigStore> ConfigStore for CountingStore<S> {
    async fn active_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        self.bump();
        self.inner.active_entries(application).await
    }

    async fn all_entries(&self, application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        self.bump();
        self.inner.all_entries(application).await
    }

    async fn active_entries_updated_since(
        &self,
        application: &str,
        since: DateTime<Utc>,
    ) -> TidelineResult<Vec<ConfigEntry>> {
        self.bump();
        self.inner
            .active_entries_updated_since(application, since)
            .await
    }

    async fn create(&self, entry: ConfigEntry) -> TidelineResult<ConfigEntry> {
        self.bump();
        self.inner.create(entry).await
    }

    async fn update(
        &self,
        id: &EntryId,
        application: &str,
        entry: ConfigEntry,
    ) -> TidelineResult<Option<ConfigEntry>> {
        self.bump();
        self.inner.update(id, application, entry).await
    }

    async fn set_active(
        &self,
        id: &EntryId,
        application: &str,
        active: bool,
    ) -> TidelineResult<bool> {
        self.bump();
        self.inner.set_active(id, application, active).await
    }
}

/// Store whose every operation pends forever, for exercising time budgets.
pub struct HangingStore;

#[async_trait]
impl ConfigStore for HangingStore {
    async fn active_entries(&self, _application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        std::future::pending().await
    }

    async fn all_entries(&self, _application: &str) -> TidelineResult<Vec<ConfigEntry>> {
        std::future::pending().await
    }

    async fn active_entries_updated_since(
        &self,
        _application: &str,
        _since: DateTime<Utc>,
    ) -> TidelineResult<Vec<ConfigEntry>> {
        std::future::pending().await
    }

    async fn create(&self, _entry: ConfigEntry) -> TidelineResult<ConfigEntry> {
        std::future::pending().await
    }

    async fn update(
        &self,
        _id: &EntryId,
        _application: &str,
        _entry: ConfigEntry,
    ) -> TidelineResult<Option<ConfigEntry>> {
        std::future::pending().await
    }

    async fn set_active(
        &self,
        _id: &EntryId,
        _application: &str,
        _active: bool,
    ) -> TidelineResult<bool> {
        std::future::pending().await
    }
}
