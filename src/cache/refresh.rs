//! Background refresh loop and atomic publication.
//!
//! One engine owns one background task. The task performs an initial full
//! load, then a delta load every tick, folding results into successor
//! [`Snapshot`]s published through a shared `ArcSwap` cell. Every failure
//! is absorbed at the loop boundary: the last published snapshot stays in
//! place and the loop tries again on the next tick.
//!
//! Shutdown is cooperative. A watch channel carries the stop signal; the
//! timer wait and the in-flight fetch are both raced against it, so the
//! loop observes cancellation within one tick or one fetch. Awaiting
//! [`RefreshEngine::stop`] returns only once the task has fully exited.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cache::snapshot::Snapshot;
use crate::core::options::ReaderOptions;
use crate::store::ConfigStore;

/// Engine lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, background task not yet spawned.
    NotStarted,
    /// Background task running.
    Running,
    /// Stop requested, task still draining.
    Stopping,
    /// Background task has exited.
    Stopped,
}

/// Background synchronization loop for one application's configuration.
pub struct RefreshEngine {
    ctx: Arc<LoopCtx>,
    state: Arc<RwLock<EngineState>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Everything the background task needs, shared between engine and task.
struct LoopCtx {
    application: String,
    interval: Duration,
    resync_after_ticks: Option<u32>,
    store: Arc<dyn ConfigStore>,
    current: Arc<ArcSwap<Snapshot>>,
}

impl RefreshEngine {
    /// Create an engine publishing into `current`.
    ///
    /// The store should already carry the resilience policy; the engine
    /// adds no retries of its own beyond trying again next tick. The
    /// interval is clamped to the configured floor.
    pub fn new(
        options: &ReaderOptions,
        store: Arc<dyn ConfigStore>,
        current: Arc<ArcSwap<Snapshot>>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            ctx: Arc::new(LoopCtx {
                application: options.application.clone(),
                interval: options.effective_interval(),
                resync_after_ticks: options.resync_after_ticks,
                store,
                current,
            }),
            state: Arc::new(RwLock::new(EngineState::NotStarted)),
            shutdown_tx,
            shutdown_rx,
            handle: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    /// Spawn the background task. Calling again once running is a no-op;
    /// a stopped engine stays stopped.
    pub fn start(&self) {
        let mut state = self.state.write();
        if *state != EngineState::NotStarted {
            let current = *state;
            tracing::debug!(
                application = %self.ctx.application,
                state = ?current,
                "refresh engine start ignored"
            );
            return;
        }
        *state = EngineState::Running;
        drop(state);

        let ctx = self.ctx.clone();
        let shutdown_rx = self.shutdown_rx.clone();
        let task_state = self.state.clone();

        let handle = tokio::spawn(async move {
            run(ctx, shutdown_rx).await;
            *task_state.write() = EngineState::Stopped;
        });

        *self.handle.lock() = Some(handle);
        tracing::info!(
            application = %self.ctx.application,
            interval_ms = self.ctx.interval.as_millis() as u64,
            "refresh engine started"
        );
    }

    /// Request shutdown without waiting for the task to exit.
    ///
    /// Safe to call any number of times, from any thread.
    pub fn request_stop(&self) {
        let mut state = self.state.write();
        if *state == EngineState::Running {
            *state = EngineState::Stopping;
        }
        drop(state);
        let _ = self.shutdown_tx.send(true);
    }

    /// Stop the engine and wait for the background task to fully exit.
    ///
    /// After this returns no further store call happens. Idempotent.
    pub async fn stop(&self) {
        self.request_stop();

        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::warn!(
                    application = %self.ctx.application,
                    error = %err,
                    "refresh task ended abnormally"
                );
            }
        }

        *self.state.write() = EngineState::Stopped;
        tracing::info!(application = %self.ctx.application, "refresh engine stopped");
    }
}

/// Wait until the shutdown signal is raised.
async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            break;
        }
    }
}

/// Loop body: initial full load, then a fetch-and-publish cycle per tick.
async fn run(ctx: Arc<LoopCtx>, mut shutdown_rx: watch::Receiver<bool>) {
    tokio::select! {
        _ = ctx.initial_load() => {}
        _ = shutdown_signalled(&mut shutdown_rx) => return,
    }

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            _ = tokio::time::sleep(ctx.interval) => {}
            _ = shutdown_signalled(&mut shutdown_rx) => break,
        }

        ticks += 1;
        let full = matches!(ctx.resync_after_ticks, Some(n) if n > 0 && ticks % u64::from(n) == 0);

        tokio::select! {
            _ = ctx.refresh_cycle(full) => {}
            _ = shutdown_signalled(&mut shutdown_rx) => break,
        }
    }
}

impl LoopCtx {
    /// Fetch all active entries and publish a full snapshot.
    ///
    /// A store outage here must not crash the caller: the previously
    /// published snapshot (empty if none) keeps serving and the periodic
    /// phase proceeds anyway.
    async fn initial_load(&self) {
        match self.store.active_entries(&self.application).await {
            Ok(batch) => {
                let snapshot = Snapshot::from_entries(batch);
                tracing::info!(
                    application = %self.application,
                    entries = snapshot.len(),
                    "initial configuration load complete"
                );
                self.current.store(Arc::new(snapshot));
            }
            Err(err) => {
                tracing::warn!(
                    application = %self.application,
                    error = %err,
                    "initial configuration load failed; serving empty cache until a refresh succeeds"
                );
            }
        }
    }

    async fn refresh_cycle(&self, full: bool) {
        if full {
            self.full_resync().await;
        } else {
            self.refresh_delta().await;
        }
    }

    /// Fetch entries updated after the high-water mark and overlay them.
    ///
    /// An empty batch is a no-op. On failure the last-good snapshot stays
    /// published, the mark does not move, and the next tick retries.
    async fn refresh_delta(&self) {
        let prev = self.current.load_full();
        let since = prev.updated_through().unwrap_or(MIN_MARK);

        match self
            .store
            .active_entries_updated_since(&self.application, since)
            .await
        {
            Ok(batch) => {
                if batch.is_empty() {
                    return;
                }
                let merged = prev.merge(batch);
                tracing::debug!(
                    application = %self.application,
                    entries = merged.len(),
                    "configuration delta applied"
                );
                self.current.store(Arc::new(merged));
            }
            Err(err) => {
                tracing::warn!(
                    application = %self.application,
                    error = %err,
                    "configuration delta refresh failed; keeping last-good snapshot"
                );
            }
        }
    }

    /// Fetch all active entries and replace the snapshot outright.
    ///
    /// This is the only cycle that makes deactivations and renames visible.
    async fn full_resync(&self) {
        let prev = self.current.load_full();

        match self.store.active_entries(&self.application).await {
            Ok(batch) => {
                let rebuilt = prev.rebuilt_from(batch);
                tracing::debug!(
                    application = %self.application,
                    entries = rebuilt.len(),
                    "configuration full resync applied"
                );
                self.current.store(Arc::new(rebuilt));
            }
            Err(err) => {
                tracing::warn!(
                    application = %self.application,
                    error = %err,
                    "configuration full resync failed; keeping last-good snapshot"
                );
            }
        }
    }
}

/// Exclusive lower bound used before any entry has been observed.
const MIN_MARK: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;
