//! In-memory [`LotteryApi`] used by tests
//!
//! Keeps entries newest first, like the service, and can be told to refuse
//! mutations or to hold a round's page requests until released.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::error::{ClientError, ClientResult};
use super::LotteryApi;
use crate::types::{
    Entry, EntryId, EntryPage, EntryPatch, LimitId, NewEntry, NewLimit, NumberSummary,
    NumberType, PriceLimit, Round, RoundId, RoundSummary,
};

#[derive(Default)]
pub struct MemoryApi {
    entries: Mutex<Vec<Entry>>,
    limits: Mutex<Vec<PriceLimit>>,
    next_id: Mutex<i64>,
    refuse_mutations: AtomicBool,
    fail_pages: AtomicBool,
    mutation_gate: Mutex<Option<Arc<Notify>>>,
    gates: Mutex<HashMap<RoundId, Arc<Notify>>>,
    page_requests: Mutex<Vec<(RoundId, u64, u64)>>,
    mutation_calls: Mutex<usize>,
}

impl MemoryApi {
    /// Service holding `count` entries for `round_id`, newest first
    pub fn with_entries(round_id: RoundId, count: usize) -> Self {
        let api = Self::default();
        api.seed(round_id, count);
        api
    }

    /// Add `count` entries to a round
    pub fn seed(&self, round_id: RoundId, count: usize) {
        let mut entries = self.entries.lock().unwrap();
        for _ in 0..count {
            let id = self.allocate_id();
            entries.insert(0, sample_entry(id, round_id));
        }
    }

    fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    pub fn refuse_mutations(&self, refuse: bool) {
        self.refuse_mutations.store(refuse, Ordering::SeqCst);
    }

    /// Make page requests fail with a service error
    pub fn fail_pages(&self, fail: bool) {
        self.fail_pages.store(fail, Ordering::SeqCst);
    }

    /// Hold every mutation until the returned handle is notified
    pub fn gate_mutations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.mutation_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold page requests for a round until the returned handle is notified
    pub fn gate_round(&self, round_id: RoundId) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(round_id, Arc::clone(&gate));
        gate
    }

    /// Every `(round_id, limit, offset)` page request seen so far
    pub fn page_requests(&self) -> Vec<(RoundId, u64, u64)> {
        self.page_requests.lock().unwrap().clone()
    }

    /// Number of create/update/delete calls that reached the service
    pub fn mutation_calls(&self) -> usize {
        *self.mutation_calls.lock().unwrap()
    }

    async fn check_mutation(&self) -> ClientResult<()> {
        *self.mutation_calls.lock().unwrap() += 1;

        let gate = self.mutation_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.refuse_mutations.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: 400,
                detail: Some("Round is closed".to_string()),
            });
        }
        Ok(())
    }

    fn not_found(what: &str) -> ClientError {
        ClientError::NotFound {
            detail: Some(format!("{} not found", what)),
        }
    }
}

pub fn sample_entry(id: EntryId, round_id: RoundId) -> Entry {
    Entry {
        id,
        round_id,
        number_value: format!("{:02}", id % 100),
        number_type: NumberType::TwoDigit,
        price: 10.0,
        is_over_limit: false,
        customer_name: None,
        recorded_by: None,
        note: None,
        created_at: None,
        updated_at: None,
    }
}

fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 16).unwrap_or_default()
}

#[async_trait]
impl LotteryApi for MemoryApi {
    async fn list_rounds(&self) -> ClientResult<Vec<Round>> {
        Ok(Vec::new())
    }

    async fn get_round(&self, _id: RoundId) -> ClientResult<Round> {
        Err(Self::not_found("Round"))
    }

    async fn create_round(&self, draw_date: NaiveDate) -> ClientResult<Round> {
        Ok(Round {
            id: self.allocate_id(),
            draw_date,
            status: "open".to_string(),
            is_active: true,
            created_at: None,
            updated_at: None,
        })
    }

    async fn update_round_status(&self, _id: RoundId, _status: &str) -> ClientResult<Round> {
        Err(Self::not_found("Round"))
    }

    async fn delete_round(&self, _id: RoundId) -> ClientResult<()> {
        Ok(())
    }

    async fn round_summary(&self, id: RoundId) -> ClientResult<RoundSummary> {
        let entries = self.entries.lock().unwrap();
        let round: Vec<&Entry> = entries.iter().filter(|e| e.round_id == id).collect();
        Ok(RoundSummary {
            round_id: id,
            draw_date: sample_date(),
            status: "open".to_string(),
            total_entries: round.len() as u64,
            total_amount: round.iter().map(|e| e.price).sum(),
            over_limit_count: round.iter().filter(|e| e.is_over_limit).count() as u64,
        })
    }

    async fn list_entries(
        &self,
        round_id: RoundId,
        limit: u64,
        offset: u64,
    ) -> ClientResult<EntryPage> {
        self.page_requests.lock().unwrap().push((round_id, limit, offset));

        let gate = self.gates.lock().unwrap().get(&round_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: 503,
                detail: Some("Database unavailable".to_string()),
            });
        }

        let entries = self.entries.lock().unwrap();
        let round: Vec<Entry> = entries
            .iter()
            .filter(|e| e.round_id == round_id)
            .cloned()
            .collect();
        let page = round
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(EntryPage {
            entries: page,
            total: round.len() as u64,
            offset,
            limit,
        })
    }

    async fn get_entry(&self, id: EntryId) -> ClientResult<Entry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("Entry"))
    }

    async fn create_entry(&self, entry: &NewEntry) -> ClientResult<Entry> {
        self.check_mutation().await?;
        let created = Entry {
            number_value: entry.number_value.clone(),
            number_type: entry.number_type,
            price: entry.price,
            recorded_by: entry.recorded_by.clone(),
            ..sample_entry(self.allocate_id(), entry.round_id)
        };
        self.entries.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn update_entry(&self, id: EntryId, patch: &EntryPatch) -> ClientResult<Entry> {
        self.check_mutation().await?;
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| Self::not_found("Entry"))?;
        entry.apply_patch(patch);
        entry.updated_at = Some("2025-01-16T12:00:00".to_string());
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: EntryId) -> ClientResult<()> {
        self.check_mutation().await?;
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Err(Self::not_found("Entry"));
        }
        Ok(())
    }

    async fn number_summary(&self, _round_id: RoundId) -> ClientResult<Vec<NumberSummary>> {
        Ok(Vec::new())
    }

    async fn list_limits(&self, round_id: RoundId) -> ClientResult<Vec<PriceLimit>> {
        Ok(self
            .limits
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.round_id == round_id)
            .cloned()
            .collect())
    }

    async fn create_limit(&self, limit: &NewLimit) -> ClientResult<PriceLimit> {
        self.check_mutation().await?;
        let mut limits = self.limits.lock().unwrap();
        limits.retain(|l| !(l.round_id == limit.round_id && l.number_type == limit.number_type));
        let created = PriceLimit {
            id: self.allocate_id(),
            round_id: limit.round_id,
            number_type: limit.number_type,
            limit_amount: limit.limit_amount,
            created_at: None,
            updated_at: None,
        };
        limits.push(created.clone());
        Ok(created)
    }

    async fn update_limit(&self, id: LimitId, limit_amount: f64) -> ClientResult<PriceLimit> {
        self.check_mutation().await?;
        let mut limits = self.limits.lock().unwrap();
        let limit = limits
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Self::not_found("Limit"))?;
        limit.limit_amount = limit_amount;
        Ok(limit.clone())
    }

    async fn delete_limit(&self, id: LimitId) -> ClientResult<()> {
        self.check_mutation().await?;
        self.limits.lock().unwrap().retain(|l| l.id != id);
        Ok(())
    }
}
