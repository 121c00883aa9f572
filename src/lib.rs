//! # NumberX
//!
//! Client for the NumberX lottery service: record bets on 2- and 3-digit
//! numbers for a draw round, manage per-type wager limits, and report which
//! numbers went over their limit.
//!
//! ## Features
//!
//! - **Paginated entry ledger**: pages of a round's entries loaded on demand,
//!   kept consistent under local create/update/delete
//! - **Input validation**: bad numbers and prices never reach the network
//! - **Wager limits**: one limit per number type and round
//! - **Over-limit reports**: per-type excess, terminal tables and CSV export
//! - **Operator session**: name with an expiry, stamped onto new entries
//!
//! ## Modules
//!
//! - [`client`]: REST client and the [`client::LotteryApi`] seam
//! - [`ledger`]: Paginated entry ledger
//! - [`limits`]: Wager limit management
//! - [`report`]: Over-limit reporting and export
//! - [`session`]: Operator session
//! - [`validation`]: Input checks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use numberx::client::{HttpClient, HttpClientConfig};
//! use numberx::ledger::{EntryLedger, LedgerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Arc::new(HttpClient::new(HttpClientConfig::new("http://localhost:8000"))?);
//!     let ledger = EntryLedger::new(api, LedgerConfig::default());
//!
//!     // Show round 3, then keep loading until everything is in
//!     ledger.reset(3).await?;
//!     ledger.load_all().await?;
//!
//!     for entry in ledger.snapshot().await.entries() {
//!         println!("{} {} {}", entry.number_value, entry.number_type, entry.price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod ledger;
pub mod limits;
pub mod report;
pub mod session;
pub mod types;
pub mod validation;

// Re-export top-level types for convenience
pub use client::{ClientError, ClientResult, HttpClient, HttpClientConfig, LotteryApi};

pub use config::{
    generate_default_config, ApiConfig, Config, ConfigError, LoggingConfig, SessionConfig,
};

pub use error::{ErrorKind, GENERIC_FAILURE_MESSAGE};

pub use ledger::{
    EntryLedger, LedgerConfig, LedgerError, LedgerItem, LedgerResult, LedgerSnapshot,
    LedgerStatus, PageOutcome, PendingOp, ScrollPosition,
};

pub use limits::{limit_for, LimitBook, LimitError, LimitResult};

pub use report::{
    format_money, limit_share, paginate, OverLimitReport, ReportConfig, ReportError, ReportPage,
    ReportRow, SummaryFilter, TypeSection,
};

pub use session::{OperatorSession, SessionError, SessionStore};

pub use types::{
    Entry, EntryId, EntryPage, EntryPatch, LimitId, NewEntry, NewLimit, NumberSummary,
    NumberType, PriceLimit, Round, RoundId, RoundSummary,
};

pub use validation::ValidationError;
