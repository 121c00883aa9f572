//! Wager limits
//!
//! A round holds at most one limit per number type. Setting a limit for a type
//! that already has one replaces it.

use std::sync::Arc;
use thiserror::Error;

use crate::client::{ClientError, LotteryApi};
use crate::error::ErrorKind;
use crate::types::{LimitId, NewLimit, NumberType, PriceLimit, RoundId};
use crate::validation::{self, ValidationError};

/// Errors from limit operations
#[derive(Error, Debug)]
pub enum LimitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl LimitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LimitError::Validation(_) => ErrorKind::Validation,
            LimitError::Client(e) => e.kind(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            LimitError::Validation(e) => e.to_string(),
            LimitError::Client(e) => e.user_message(),
        }
    }
}

pub type LimitResult<T> = Result<T, LimitError>;

/// Limit for `number_type` among a round's limits
pub fn limit_for(limits: &[PriceLimit], number_type: NumberType) -> Option<&PriceLimit> {
    limits.iter().find(|l| l.number_type == number_type)
}

/// Limit management for rounds
#[derive(Clone)]
pub struct LimitBook {
    api: Arc<dyn LotteryApi>,
}

impl LimitBook {
    pub fn new(api: Arc<dyn LotteryApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self, round_id: RoundId) -> LimitResult<Vec<PriceLimit>> {
        let mut limits = self.api.list_limits(round_id).await?;
        limits.sort_by_key(|l| l.number_type);
        Ok(limits)
    }

    /// Create or replace the limit for a number type
    pub async fn set(
        &self,
        round_id: RoundId,
        number_type: NumberType,
        limit_amount: f64,
    ) -> LimitResult<PriceLimit> {
        let limit = NewLimit {
            round_id,
            number_type,
            limit_amount,
        };
        validation::validate_new_limit(&limit)?;

        let created = self.api.create_limit(&limit).await.map_err(|e| {
            tracing::warn!(round_id, number_type = %number_type, error = %e, "Failed to set limit");
            e
        })?;
        tracing::info!(round_id, number_type = %number_type, limit_amount, "Limit set");
        Ok(created)
    }

    pub async fn update(&self, id: LimitId, limit_amount: f64) -> LimitResult<PriceLimit> {
        validation::validate_limit_amount(limit_amount)?;
        let updated = self.api.update_limit(id, limit_amount).await?;
        tracing::info!(limit_id = id, limit_amount, "Limit updated");
        Ok(updated)
    }

    pub async fn remove(&self, id: LimitId) -> LimitResult<()> {
        self.api.delete_limit(id).await?;
        tracing::info!(limit_id = id, "Limit removed");
        Ok(())
    }

    /// Remove the limit for a number type; `false` if there was none
    pub async fn remove_type(&self, round_id: RoundId, number_type: NumberType) -> LimitResult<bool> {
        let limits = self.api.list_limits(round_id).await?;
        match limit_for(&limits, number_type) {
            Some(limit) => {
                self.remove(limit.id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemoryApi;

    fn book() -> (Arc<MemoryApi>, LimitBook) {
        let api = Arc::new(MemoryApi::default());
        let book = LimitBook::new(api.clone());
        (api, book)
    }

    #[tokio::test]
    async fn test_set_replaces_same_type() {
        let (_, book) = book();
        book.set(1, NumberType::TwoDigit, 1000.0).await.unwrap();
        book.set(1, NumberType::ThreeDigit, 500.0).await.unwrap();
        book.set(1, NumberType::TwoDigit, 2000.0).await.unwrap();

        let limits = book.list(1).await.unwrap();
        assert_eq!(limits.len(), 2);
        assert_eq!(limits[0].number_type, NumberType::TwoDigit);
        assert_eq!(limit_for(&limits, NumberType::TwoDigit).unwrap().limit_amount, 2000.0);
        assert!(book.list(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_never_reaches_service() {
        let (api, book) = book();
        let err = book.set(1, NumberType::TwoDigit, 0.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = book.update(7, -5.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(api.mutation_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let (_, book) = book();
        let limit = book.set(1, NumberType::ThreeDigit, 500.0).await.unwrap();
        let updated = book.update(limit.id, 750.0).await.unwrap();
        assert_eq!(updated.limit_amount, 750.0);

        assert!(book.remove_type(1, NumberType::ThreeDigit).await.unwrap());
        assert!(!book.remove_type(1, NumberType::ThreeDigit).await.unwrap());
        assert!(book.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_surfaces_detail() {
        let (api, book) = book();
        api.refuse_mutations(true);
        let err = book.set(1, NumberType::TwoDigit, 100.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.user_message(), "Round is closed");
    }
}
