//! Ledger state
//!
//! Plain data and synchronous transitions. The async [`EntryLedger`] holds
//! this behind a lock and never awaits while the lock is held.
//!
//! [`EntryLedger`]: super::EntryLedger

use serde::Serialize;

use crate::types::{Entry, EntryId, EntryPage, EntryPatch, RoundId};

/// Unconfirmed local change on an item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PendingOp {
    /// Patched locally; `previous` is restored if the service refuses
    Update { previous: Entry },
    /// Delete requested, item still shown until confirmed
    Remove,
}

/// One cached entry plus its pending marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerItem {
    pub entry: Entry,
    pub pending: Option<PendingOp>,
}

impl LedgerItem {
    /// Wrap an entry as confirmed by the service
    pub fn confirmed(entry: Entry) -> Self {
        Self {
            entry,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// What the ledger is doing right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LedgerStatus {
    Idle,
    /// First page of a round in flight
    Loading,
    /// Follow-up page in flight
    LoadingMore,
    /// Last load failed; the message is user-facing
    Error(String),
}

/// Copy of the ledger state handed to views
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub round_id: Option<RoundId>,
    pub items: Vec<LedgerItem>,
    pub total_count: u64,
    pub offset: u64,
    pub has_more: bool,
    pub status: LedgerStatus,
}

impl LedgerSnapshot {
    /// Entries in display order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.items.iter().map(|item| &item.entry)
    }

    /// Count of loaded entries the service flags as over limit
    pub fn over_limit_count(&self) -> usize {
        self.entries().filter(|e| e.is_over_limit).count()
    }
}

#[derive(Debug)]
pub(crate) struct LedgerState {
    pub(crate) round_id: Option<RoundId>,
    /// Bumped on every reset; results tagged with an older epoch are dropped
    pub(crate) epoch: u64,
    pub(crate) items: Vec<LedgerItem>,
    pub(crate) total_count: u64,
    /// Server-side cursor for the next page
    pub(crate) offset: u64,
    pub(crate) has_more: bool,
    pub(crate) loading: bool,
    pub(crate) loading_more: bool,
    pub(crate) last_error: Option<String>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            round_id: None,
            epoch: 0,
            items: Vec::new(),
            total_count: 0,
            offset: 0,
            has_more: true,
            loading: false,
            loading_more: false,
            last_error: None,
        }
    }
}

impl LedgerState {
    /// Switch to a round and start its initial load. Returns the new epoch.
    pub(crate) fn reset(&mut self, round_id: RoundId) -> u64 {
        self.epoch += 1;
        self.round_id = Some(round_id);
        self.items.clear();
        self.total_count = 0;
        self.offset = 0;
        self.has_more = true;
        self.loading = true;
        self.loading_more = false;
        self.last_error = None;
        self.epoch
    }

    pub(crate) fn position(&self, id: EntryId) -> Option<usize> {
        self.items.iter().position(|item| item.entry.id == id)
    }

    pub(crate) fn item(&self, id: EntryId) -> Option<&LedgerItem> {
        self.items.iter().find(|item| item.entry.id == id)
    }

    pub(crate) fn finish_loading(&mut self, replace: bool) {
        if replace {
            self.loading = false;
        } else {
            self.loading_more = false;
        }
    }

    /// Apply a fetched page. Returns the number of entries the service sent.
    pub(crate) fn apply_page(
        &mut self,
        start_offset: u64,
        replace: bool,
        page: EntryPage,
        page_size: u64,
    ) -> usize {
        let fetched = page.entries.len();

        if replace {
            self.items = page.entries.into_iter().map(LedgerItem::confirmed).collect();
        } else {
            for entry in page.entries {
                // shifted server list can repeat an entry we already hold
                if self.position(entry.id).is_none() {
                    self.items.push(LedgerItem::confirmed(entry));
                }
            }
        }

        self.total_count = page.total;
        self.offset = start_offset + fetched as u64;
        // an empty page never leaves more to load
        self.has_more =
            fetched > 0 && fetched as u64 >= page_size && self.offset < self.total_count;
        self.last_error = None;

        if self.items.len() as u64 > self.total_count {
            tracing::warn!(
                items = self.items.len(),
                total = self.total_count,
                "Ledger holds more entries than the service reports"
            );
        }

        fetched
    }

    /// Put a newly created entry at the front
    pub(crate) fn prepend(&mut self, entry: Entry) {
        if self.position(entry.id).is_some() {
            return;
        }
        self.items.insert(0, LedgerItem::confirmed(entry));
        self.total_count += 1;
        self.offset += 1;
    }

    /// Show a patch locally. Returns false if the entry is not loaded or is
    /// being deleted.
    pub(crate) fn begin_update(&mut self, id: EntryId, patch: &EntryPatch) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        let item = &mut self.items[pos];
        if matches!(item.pending, Some(PendingOp::Remove)) {
            return false;
        }
        if item.pending.is_none() {
            item.pending = Some(PendingOp::Update {
                previous: item.entry.clone(),
            });
        }
        item.entry.apply_patch(patch);
        true
    }

    /// Replace the entry in place with the service's canonical record
    pub(crate) fn confirm_update(&mut self, entry: Entry) {
        if let Some(pos) = self.position(entry.id) {
            self.items[pos] = LedgerItem::confirmed(entry);
        }
    }

    pub(crate) fn rollback_update(&mut self, id: EntryId) {
        if let Some(pos) = self.position(id) {
            let item = &mut self.items[pos];
            if let Some(PendingOp::Update { previous }) = &item.pending {
                item.entry = previous.clone();
                item.pending = None;
            }
        }
    }

    /// Mark an entry as being deleted. Returns false if it is not loaded.
    pub(crate) fn begin_remove(&mut self, id: EntryId) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.items[pos].pending = Some(PendingOp::Remove);
                true
            }
            None => false,
        }
    }

    pub(crate) fn confirm_remove(&mut self, id: EntryId) {
        if let Some(pos) = self.position(id) {
            self.items.remove(pos);
            self.total_count = self.total_count.saturating_sub(1);
            self.offset = self.offset.saturating_sub(1);
        }
    }

    /// Count a deletion of an entry past the loaded range
    pub(crate) fn note_remote_remove(&mut self) {
        if self.round_id.is_some() {
            self.total_count = self.total_count.saturating_sub(1);
        }
    }

    pub(crate) fn rollback_remove(&mut self, id: EntryId) {
        if let Some(pos) = self.position(id) {
            let item = &mut self.items[pos];
            if matches!(item.pending, Some(PendingOp::Remove)) {
                item.pending = None;
            }
        }
    }

    pub(crate) fn status(&self) -> LedgerStatus {
        if self.loading {
            LedgerStatus::Loading
        } else if self.loading_more {
            LedgerStatus::LoadingMore
        } else if let Some(message) = &self.last_error {
            LedgerStatus::Error(message.clone())
        } else {
            LedgerStatus::Idle
        }
    }

    pub(crate) fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            round_id: self.round_id,
            items: self.items.clone(),
            total_count: self.total_count,
            offset: self.offset,
            has_more: self.has_more,
            status: self.status(),
        }
    }
}
