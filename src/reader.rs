//! Public facade: typed lookups over the live snapshot.
//!
//! A `ConfigReader` owns one [`RefreshEngine`] and the snapshot cell it
//! publishes into. Lookups are synchronous and lock-free: each takes one
//! consistent reference to the currently published [`Snapshot`], so a
//! lookup racing a publication sees either the old view or the new one,
//! never a mix. Multiple independent readers (different applications,
//! different stores) coexist without shared state.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::cache::refresh::{EngineState, RefreshEngine};
use crate::cache::snapshot::Snapshot;
use crate::core::convert::FromRaw;
use crate::core::entry::ValueKind;
use crate::core::error::{TidelineError, TidelineResult};
use crate::core::options::ReaderOptions;
use crate::store::resilient::ResilientStore;
use crate::store::ConfigStore;

/// Self-refreshing typed view of one application's configuration.
pub struct ConfigReader {
    application: String,
    current: Arc<ArcSwap<Snapshot>>,
    engine: RefreshEngine,
}

impl std::fmt::Debug for ConfigReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigReader")
            .field("application", &self.application)
            .finish_non_exhaustive()
    }
}

impl ConfigReader {
    /// Construct a reader and start its refresh engine.
    ///
    /// Options are validated eagerly; misuse is rejected here, before any
    /// background task exists. The store is wrapped in a
    /// [`ResilientStore`] carrying the options' retry policy. The reader
    /// returns immediately with an empty snapshot; values appear once the
    /// initial load completes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(options: ReaderOptions, store: Arc<dyn ConfigStore>) -> TidelineResult<Self> {
        options.validate()?;

        let resilient = ResilientStore::new(store, options.retry.clone())?;
        let current = Arc::new(ArcSwap::from_pointee(Snapshot::empty()));
        let engine = RefreshEngine::new(&options, Arc::new(resilient), current.clone());
        engine.start();

        Ok(Self {
            application: options.application,
            current,
            engine,
        })
    }

    /// The application this reader serves.
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Look up `name` and convert it to `T`.
    ///
    /// Returns `None` when the name is blank, absent from the snapshot, or
    /// present but not convertible to `T`. Never fails loudly: a reader
    /// that has not loaded yet simply reports every key as absent.
    pub fn try_get<T: FromRaw>(&self, name: &str) -> Option<T> {
        if name.trim().is_empty() {
            return None;
        }
        let snapshot = self.current.load();
        let (_kind, raw) = snapshot.get(name)?;
        T::from_raw(raw)
    }

    /// Strict companion to [`try_get`](Self::try_get).
    pub fn get<T: FromRaw>(&self, name: &str) -> TidelineResult<T> {
        self.try_get(name)
            .ok_or_else(|| TidelineError::key_not_found(name))
    }

    /// The raw value and declared kind for `name`, for diagnostics.
    pub fn raw(&self, name: &str) -> Option<(ValueKind, String)> {
        let snapshot = self.current.load();
        snapshot
            .get(name)
            .map(|(kind, raw)| (kind, raw.to_string()))
    }

    /// Number of entries in the current snapshot.
    pub fn entry_count(&self) -> usize {
        self.current.load().len()
    }

    /// The current snapshot's high-water mark.
    pub fn updated_through(&self) -> Option<DateTime<Utc>> {
        self.current.load().updated_through()
    }

    /// The refresh engine's lifecycle state.
    pub fn engine_state(&self) -> EngineState {
        self.engine.state()
    }

    /// Stop the refresh engine and wait for its task to fully exit.
    ///
    /// After this returns no background activity remains; lookups keep
    /// working against the last published snapshot. Idempotent.
    pub async fn stop(&self) {
        self.engine.stop().await;
    }
}

impl Drop for ConfigReader {
    fn drop(&mut self) {
        // Best effort only: Drop cannot wait for the task. Callers that
        // need the no-activity-after-return guarantee use stop().
        self.engine.request_stop();
    }
}
