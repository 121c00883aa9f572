//! Paginated Entry Ledger
//!
//! Locally materialized view of a round's entries that grows a page at a time
//! and stays consistent under local create/update/delete without a refetch.
//!
//! # Architecture
//!
//! ```text
//! reset(round) ──► epoch += 1 ──► load_page(0, replace)
//! on_scroll / load_more ──► guard (has_more, !loading) ──► load_page(offset, append)
//! create / update / remove ──► validate ──► service ──► patch items in place
//! ```
//!
//! The handle is cheap to clone; all clones share one state. Every fetch and
//! mutation remembers the epoch it was issued in, and its result is dropped if
//! the ledger has been reset since.
//!
//! # Example
//!
//! ```rust,no_run
//! use numberx::client::{HttpClient, HttpClientConfig};
//! use numberx::ledger::{EntryLedger, LedgerConfig};
//! use numberx::types::NewEntry;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Arc::new(HttpClient::new(HttpClientConfig::default())?);
//!     let ledger = EntryLedger::new(api, LedgerConfig::default());
//!
//!     ledger.reset(1).await?;
//!     ledger.create(NewEntry::new(1, "42", 100.0)).await?;
//!
//!     let snapshot = ledger.snapshot().await;
//!     println!("{} of {} entries loaded", snapshot.items.len(), snapshot.total_count);
//!     Ok(())
//! }
//! ```

pub mod scroll;
pub mod state;

pub use scroll::ScrollPosition;
pub use state::{LedgerItem, LedgerSnapshot, LedgerStatus, PendingOp};

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::client::{ClientError, LotteryApi};
use crate::error::ErrorKind;
use crate::types::{Entry, EntryId, EntryPatch, NewEntry, NumberType, RoundId};
use crate::validation::{self, ValidationError};
use state::LedgerState;

/// Ledger tuning
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Entries requested per page; must be at least 1
    #[serde(default = "default_page_size", deserialize_with = "deserialize_page_size")]
    pub page_size: u64,

    /// Distance from the bottom that triggers the next page
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,
}

fn default_page_size() -> u64 {
    10
}

fn deserialize_page_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let size = u64::deserialize(deserializer)?;
    if size == 0 {
        return Err(serde::de::Error::custom("page_size must be at least 1"));
    }
    Ok(size)
}

fn default_scroll_threshold() -> f64 {
    50.0
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            scroll_threshold: default_scroll_threshold(),
        }
    }
}

/// Errors from ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Paging requested before any round was selected
    #[error("No round selected")]
    NoRound,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Validation(_) | LedgerError::NoRound => ErrorKind::Validation,
            LedgerError::Client(e) => e.kind(),
        }
    }

    /// Message to show an operator
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// What a page request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page applied; `fetched` entries came back
    Loaded { fetched: usize },
    /// Guard declined: nothing more to load or a load is already running
    Skipped,
    /// Result arrived after a reset and was dropped
    Stale,
}

/// Shared, incrementally loaded list of a round's entries
#[derive(Clone)]
pub struct EntryLedger {
    api: Arc<dyn LotteryApi>,
    state: Arc<RwLock<LedgerState>>,
    config: LedgerConfig,
}

impl EntryLedger {
    /// Create an empty ledger with no round selected
    pub fn new(api: Arc<dyn LotteryApi>, mut config: LedgerConfig) -> Self {
        if config.page_size == 0 {
            tracing::warn!("Page size 0 is not usable, using {}", default_page_size());
            config.page_size = default_page_size();
        }
        Self {
            api,
            state: Arc::new(RwLock::new(LedgerState::default())),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.state.read().await.snapshot()
    }

    /// Round currently shown, if any
    pub async fn round_id(&self) -> Option<RoundId> {
        self.state.read().await.round_id
    }

    /// Switch to `round_id`, drop everything cached and load the first page.
    ///
    /// Results of fetches or mutations issued before this call are ignored
    /// when they arrive.
    pub async fn reset(&self, round_id: RoundId) -> LedgerResult<PageOutcome> {
        let epoch = self.state.write().await.reset(round_id);
        tracing::debug!(round_id, epoch, "Ledger reset");
        self.fetch_page(round_id, epoch, 0, true).await
    }

    /// Fetch one page starting at `start_offset`.
    ///
    /// `replace` swaps the whole list for the page; otherwise the page is
    /// appended. This does not consult the loading guards: callers must not
    /// overlap calls for the same page. Use [`load_more`](Self::load_more)
    /// from event handlers.
    pub async fn load_page(&self, start_offset: u64, replace: bool) -> LedgerResult<PageOutcome> {
        let (round_id, epoch) = {
            let mut state = self.state.write().await;
            let round_id = state.round_id.ok_or(LedgerError::NoRound)?;
            if replace {
                state.loading = true;
            } else {
                state.loading_more = true;
            }
            (round_id, state.epoch)
        };
        self.fetch_page(round_id, epoch, start_offset, replace).await
    }

    /// Append the next page unless there is none or a load is running
    pub async fn load_more(&self) -> LedgerResult<PageOutcome> {
        let (round_id, epoch, offset) = {
            let mut state = self.state.write().await;
            let round_id = state.round_id.ok_or(LedgerError::NoRound)?;
            if !state.has_more || state.loading || state.loading_more {
                return Ok(PageOutcome::Skipped);
            }
            state.loading_more = true;
            (round_id, state.epoch, state.offset)
        };
        self.fetch_page(round_id, epoch, offset, false).await
    }

    /// Scroll handler: loads the next page when the viewport nears the end
    pub async fn on_scroll(&self, position: ScrollPosition) -> LedgerResult<PageOutcome> {
        if !position.is_near_bottom(self.config.scroll_threshold) {
            return Ok(PageOutcome::Skipped);
        }
        self.load_more().await
    }

    /// Load pages until the service reports no more
    pub async fn load_all(&self) -> LedgerResult<usize> {
        let mut pages = 0;
        while let PageOutcome::Loaded { .. } = self.load_more().await? {
            pages += 1;
        }
        Ok(pages)
    }

    async fn fetch_page(
        &self,
        round_id: RoundId,
        epoch: u64,
        start_offset: u64,
        replace: bool,
    ) -> LedgerResult<PageOutcome> {
        let result = self
            .api
            .list_entries(round_id, self.config.page_size, start_offset)
            .await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!(
                round_id,
                epoch,
                current_epoch = state.epoch,
                "Dropping page from before reset"
            );
            return Ok(PageOutcome::Stale);
        }
        state.finish_loading(replace);

        match result {
            Ok(page) => {
                let fetched = state.apply_page(start_offset, replace, page, self.config.page_size);
                tracing::debug!(
                    round_id,
                    start_offset,
                    fetched,
                    total = state.total_count,
                    has_more = state.has_more,
                    "Page loaded"
                );
                Ok(PageOutcome::Loaded { fetched })
            }
            Err(e) => {
                tracing::error!(round_id, start_offset, error = %e, "Failed to load entries");
                state.last_error = Some(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Record a new entry and show it first.
    ///
    /// The list is not re-sorted or refetched.
    pub async fn create(&self, entry: NewEntry) -> LedgerResult<Entry> {
        validation::validate_new_entry(&entry)?;
        let epoch = self.state.read().await.epoch;

        let created = self.api.create_entry(&entry).await.map_err(|e| {
            tracing::warn!(round_id = entry.round_id, error = %e, "Failed to create entry");
            e
        })?;

        let mut state = self.state.write().await;
        if state.epoch == epoch && state.round_id == Some(created.round_id) {
            state.prepend(created.clone());
        }
        tracing::info!(
            entry_id = created.id,
            round_id = created.round_id,
            number = %created.number_value,
            price = created.price,
            "Entry created"
        );
        Ok(created)
    }

    /// Change an entry, keeping its position.
    ///
    /// A loaded entry shows the patch immediately and is marked pending; the
    /// service's answer either replaces it or restores the previous value.
    /// The service is called even when the entry is not loaded locally.
    pub async fn update(&self, id: EntryId, patch: EntryPatch) -> LedgerResult<Entry> {
        self.update_with_type(id, patch, NumberType::default()).await
    }

    /// Like [`update`](Self::update), checking a new number against
    /// `fallback_type` when the entry is not loaded locally
    pub async fn update_with_type(
        &self,
        id: EntryId,
        patch: EntryPatch,
        fallback_type: NumberType,
    ) -> LedgerResult<Entry> {
        let (epoch, tracked) = {
            let mut state = self.state.write().await;
            let current_type = state
                .item(id)
                .map(|item| item.entry.number_type)
                .unwrap_or(fallback_type);
            validation::validate_patch(&patch, current_type)?;
            (state.epoch, state.begin_update(id, &patch))
        };

        let result = self.api.update_entry(id, &patch).await;

        let mut state = self.state.write().await;
        let current = state.epoch == epoch;
        match result {
            Ok(entry) => {
                if current && tracked {
                    state.confirm_update(entry.clone());
                } else if !tracked {
                    tracing::debug!(entry_id = id, "Updated entry is not loaded locally");
                }
                tracing::info!(entry_id = id, "Entry updated");
                Ok(entry)
            }
            Err(e) => {
                if current && tracked {
                    state.rollback_update(id);
                }
                tracing::warn!(entry_id = id, error = %e, "Failed to update entry");
                Err(e.into())
            }
        }
    }

    /// Like [`update`](Self::update), asking the service for the entry's
    /// type when a new number has to be checked and the entry is not loaded.
    ///
    /// A failed lookup is not an error; the update call reports it.
    pub async fn edit(&self, id: EntryId, patch: EntryPatch) -> LedgerResult<Entry> {
        let needs_type = patch.number_value.is_some()
            && patch.number_type.is_none()
            && self.state.read().await.item(id).is_none();

        let fallback_type = if needs_type {
            match self.api.get_entry(id).await {
                Ok(entry) => entry.number_type,
                Err(e) => {
                    tracing::debug!(entry_id = id, error = %e, "Entry type lookup failed");
                    NumberType::default()
                }
            }
        } else {
            NumberType::default()
        };

        self.update_with_type(id, patch, fallback_type).await
    }

    /// Delete an entry.
    ///
    /// Deleting an entry that is not loaded still lowers the total.
    pub async fn remove(&self, id: EntryId) -> LedgerResult<()> {
        let (epoch, tracked) = {
            let mut state = self.state.write().await;
            (state.epoch, state.begin_remove(id))
        };

        let result = self.api.delete_entry(id).await;

        let mut state = self.state.write().await;
        let current = state.epoch == epoch;
        match result {
            Ok(()) => {
                if current && tracked {
                    state.confirm_remove(id);
                } else if current {
                    state.note_remote_remove();
                }
                tracing::info!(entry_id = id, "Entry deleted");
                Ok(())
            }
            Err(e) => {
                if current && tracked {
                    state.rollback_remove(id);
                }
                tracing::warn!(entry_id = id, error = %e, "Failed to delete entry");
                Err(e.into())
            }
        }
    }
}
