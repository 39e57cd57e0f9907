//! Tideline - self-refreshing typed configuration cache.
//!
//! Tideline keeps a process-local, strongly-typed view of a remote, shared
//! configuration store. Reads never touch the network: a single background
//! task per [`ConfigReader`] performs an initial full load and then periodic
//! delta loads bounded by a high-water mark, folds the results into an
//! immutable [`Snapshot`], and publishes each snapshot with one atomic
//! pointer swap. Store outages degrade to serving the last-good snapshot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ConfigReader                             │
//! │        typed lookups (try_get / get) │ lifecycle (stop)         │
//! └─────────────────────────────────────────────────────────────────┘
//!            │ lock-free reads                 │ owns
//! ┌──────────────────────────┐   ┌─────────────────────────────────┐
//! │   ArcSwap<Snapshot>      │◄──│        RefreshEngine            │
//! │   immutable name→value   │   │ initial load │ delta │ resync   │
//! └──────────────────────────┘   └─────────────────────────────────┘
//!                                                │ fetches through
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       ResilientStore                            │
//! │          bounded retry │ backoff + jitter │ time budget         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                                │ wraps
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  ConfigStore implementation                     │
//! │        remote document store │ embedded MemoryStore             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Organization
//!
//! ## Core
//! - [`core::entry`] - Configuration entry model and value kinds
//! - [`core::convert`] - Raw-string to typed-value conversion
//! - [`core::options`] - Reader options and retry policy validation
//! - [`core::error`] - Error types and retry classification
//!
//! ## Store
//! - [`store`] - The asynchronous store contract
//! - [`store::memory`] - Embedded in-process store implementation
//! - [`store::resilient`] - Retry/timeout decorator over any store
//!
//! ## Cache
//! - [`cache::snapshot`] - Immutable snapshot and delta merge
//! - [`cache::refresh`] - Background refresh loop and publication
//!
//! # Key Invariants
//!
//! - **SNAP-ATOMIC**: A lookup observes exactly one published snapshot,
//!   never a mix of two
//! - **MARK-MONOTONE**: The high-water mark never decreases and advances
//!   only to timestamps observed in a successful fetch
//! - **LAST-GOOD**: A refresh failure keeps the previous snapshot in place
//! - **ACTIVE-ONLY**: A snapshot never contains a deactivated entry;
//!   deactivation is represented by absence

// Core infrastructure
pub mod core;

// Store contract and implementations
pub mod store;

// Snapshot cache and refresh loop
pub mod cache;

// Public facade
pub mod reader;

// Re-exports for convenience
pub use self::core::convert::{convert, try_convert, ConfigValue, FromRaw};
pub use self::core::entry::{ConfigEntry, EntryId, ValueKind};
pub use self::core::error::{TidelineError, TidelineResult};
pub use self::core::options::{ReaderOptions, RetryPolicy};
pub use cache::refresh::{EngineState, RefreshEngine};
pub use cache::snapshot::Snapshot;
pub use reader::ConfigReader;
pub use store::memory::MemoryStore;
pub use store::resilient::ResilientStore;
pub use store::ConfigStore;
