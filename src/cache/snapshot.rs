//! Immutable configuration snapshot.
//!
//! A snapshot is a fully-formed mapping from entry name to `(kind, raw
//! value)` for one application, built only from active entries. It is never
//! mutated: the refresh engine builds a replacement and publishes it whole.
//! The high-water mark travels inside the snapshot, so entries and mark are
//! always swapped together and a torn pair cannot be observed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::entry::{ConfigEntry, ValueKind};

/// Immutable point-in-time view of an application's active configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: HashMap<String, (ValueKind, String)>,
    updated_through: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// A snapshot with no entries and no high-water mark.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from a full load.
    ///
    /// Inactive entries are skipped; with duplicate names the last one in
    /// input order wins. The high-water mark is the maximum `updated_at`
    /// across the folded entries, or unset when nothing was folded.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ConfigEntry>,
    {
        let mut snapshot = Self::empty();
        snapshot.fold(entries);
        snapshot
    }

    /// Build the successor snapshot from a delta batch.
    ///
    /// Every existing key is carried over, then each batch entry is
    /// overlaid by name (insert if new, overwrite if existing). A delta
    /// can only add or overwrite: entries deactivated since the last full
    /// load are absent from the batch and therefore survive untouched.
    /// The mark advances to the batch maximum only when that exceeds the
    /// current value.
    pub fn merge<I>(&self, batch: I) -> Self
    where
        I: IntoIterator<Item = ConfigEntry>,
    {
        let mut next = self.clone();
        next.fold(batch);
        next
    }

    /// Build the successor snapshot from a full reload.
    ///
    /// Unlike [`merge`](Self::merge), the entry set is replaced outright,
    /// which drops keys that were deactivated or renamed since the last
    /// full load. The high-water mark stays monotonic: it never drops
    /// below the current value even when the reloaded set is older.
    pub fn rebuilt_from<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = ConfigEntry>,
    {
        let mut next = Self {
            entries: HashMap::new(),
            updated_through: self.updated_through,
        };
        next.fold(entries);
        next
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<(ValueKind, &str)> {
        self.entries
            .get(name)
            .map(|(kind, raw)| (*kind, raw.as_str()))
    }

    /// True when the snapshot holds the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over the entry names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The high-water mark: the latest `updated_at` folded into this
    /// snapshot, used as the exclusive lower bound of the next delta query.
    pub fn updated_through(&self) -> Option<DateTime<Utc>> {
        self.updated_through
    }

    fn fold<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = ConfigEntry>,
    {
        for entry in entries {
            if !entry.active {
                continue;
            }
            self.entries
                .insert(entry.name, (entry.kind, entry.value));
            if self.updated_through.map_or(true, |mark| entry.updated_at > mark) {
                self.updated_through = Some(entry.updated_at);
            }
        }
    }
}
