//! NumberX REST Client
//!
//! Access to the remote NumberX service. [`LotteryApi`] is the seam the rest
//! of the crate talks to; [`HttpClient`] is the production implementation.
//!
//! # Endpoints
//!
//! All paths are relative to `<base_url>/api`.
//!
//! ## Rounds
//! - `GET /rounds/` - List rounds
//! - `GET /rounds/:id` - Get a round
//! - `POST /rounds/` - Create a round
//! - `PUT /rounds/:id` - Update round status
//! - `DELETE /rounds/:id` - Delete a round
//! - `GET /rounds/:id/summary` - Round totals
//!
//! ## Entries
//! - `GET /entries/round/:round_id?limit&offset` - One page of a round's entries
//! - `GET /entries/:id` - Get an entry
//! - `POST /entries/` - Create an entry
//! - `PUT /entries/:id` - Update an entry
//! - `DELETE /entries/:id` - Delete an entry
//! - `GET /entries/round/:round_id/summary` - Per-number totals
//!
//! ## Limits
//! - `GET /limits/round/:round_id` - List a round's limits
//! - `POST /limits/` - Create or replace a limit
//! - `PUT /limits/:id` - Update a limit amount
//! - `DELETE /limits/:id` - Delete a limit

pub mod error;
pub mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, HttpClientConfig};

use async_trait::async_trait;

use crate::types::{
    Entry, EntryId, EntryPage, EntryPatch, LimitId, NewEntry, NewLimit, NumberSummary,
    PriceLimit, Round, RoundId, RoundSummary,
};
use chrono::NaiveDate;

/// Operations offered by the NumberX service
#[async_trait]
pub trait LotteryApi: Send + Sync {
    /// List all rounds
    async fn list_rounds(&self) -> ClientResult<Vec<Round>>;

    /// Get one round
    async fn get_round(&self, id: RoundId) -> ClientResult<Round>;

    /// Create a round for a draw date
    async fn create_round(&self, draw_date: NaiveDate) -> ClientResult<Round>;

    /// Change a round's status
    async fn update_round_status(&self, id: RoundId, status: &str) -> ClientResult<Round>;

    /// Delete a round with its entries and limits
    async fn delete_round(&self, id: RoundId) -> ClientResult<()>;

    /// Totals for a round
    async fn round_summary(&self, id: RoundId) -> ClientResult<RoundSummary>;

    /// Fetch up to `limit` entries of a round starting at `offset`
    async fn list_entries(&self, round_id: RoundId, limit: u64, offset: u64)
        -> ClientResult<EntryPage>;

    /// Get one entry
    async fn get_entry(&self, id: EntryId) -> ClientResult<Entry>;

    /// Create an entry, returning the canonical record
    async fn create_entry(&self, entry: &NewEntry) -> ClientResult<Entry>;

    /// Update an entry, returning the canonical record
    async fn update_entry(&self, id: EntryId, patch: &EntryPatch) -> ClientResult<Entry>;

    /// Delete an entry
    async fn delete_entry(&self, id: EntryId) -> ClientResult<()>;

    /// Per-number totals for a round
    async fn number_summary(&self, round_id: RoundId) -> ClientResult<Vec<NumberSummary>>;

    /// Limits configured for a round
    async fn list_limits(&self, round_id: RoundId) -> ClientResult<Vec<PriceLimit>>;

    /// Create a limit, or replace the existing one for the same type
    async fn create_limit(&self, limit: &NewLimit) -> ClientResult<PriceLimit>;

    /// Change a limit's amount
    async fn update_limit(&self, id: LimitId, limit_amount: f64) -> ClientResult<PriceLimit>;

    /// Delete a limit
    async fn delete_limit(&self, id: LimitId) -> ClientResult<()>;
}
