//! Snapshot cache and refresh loop.
//!
//! - [`snapshot`] - Immutable point-in-time view and the delta merge
//! - [`refresh`] - Background synchronization loop and atomic publication
//!
//! # Publication
//!
//! Exactly one writer task per engine builds snapshots; readers take one
//! consistent `Arc` per lookup through an atomic pointer cell. There is no
//! reader-side locking, and a superseded snapshot is reclaimed once the
//! last lookup holding it finishes.

pub mod refresh;
pub mod snapshot;
