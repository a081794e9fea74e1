// src/services/governor.rs - Fixed-window attempt budget per client
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::config::AttemptConfig;
use crate::errors::AppError;
use crate::models::{AttemptDecision, AttemptRecord, BudgetSnapshot};
use crate::repositories::AttemptRepositoryTrait;

type Result<T> = std::result::Result<T, AppError>;

/// Bounds how many link-mutating requests one client may issue per window.
///
/// The budget check and the write are separate store calls, so concurrent
/// requests from one client can briefly overshoot the budget.
pub struct AttemptGovernor<R: AttemptRepositoryTrait> {
    repository: Arc<R>,
    budget: u32,
    window: Duration,
}

impl<R: AttemptRepositoryTrait> AttemptGovernor<R> {
    pub fn new(repository: Arc<R>, config: &AttemptConfig) -> Self {
        Self {
            repository,
            budget: config.budget,
            window: config.window(),
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Counts one attempt for `client_id` if the budget allows it
    pub async fn admit(&self, client_id: &str) -> Result<AttemptDecision> {
        self.admit_at(client_id, Utc::now()).await
    }

    pub async fn admit_at(&self, client_id: &str, now: DateTime<Utc>) -> Result<AttemptDecision> {
        let decision = match self.repository.find(client_id).await? {
            None => {
                let record = AttemptRecord::opened_at(client_id, now, self.window);
                self.repository.insert(&record).await?;
                debug!("Opened attempt window for {}", client_id);
                self.allowed(record.attempt_count)
            }
            Some(record) if record.is_expired_at(now) => {
                let record = AttemptRecord::opened_at(client_id, now, self.window);
                self.repository.update(&record).await?;
                debug!("Attempt window for {} expired, starting over", client_id);
                self.allowed(record.attempt_count)
            }
            Some(record) if i64::from(record.attempt_count) >= i64::from(self.budget) => {
                info!(
                    "Client {} exhausted its budget until {}",
                    client_id, record.reset_time
                );
                AttemptDecision {
                    allowed: false,
                    remaining: 0,
                }
            }
            Some(mut record) => {
                record.attempt_count += 1;
                record.last_attempt = now;
                self.repository.update(&record).await?;
                self.allowed(record.attempt_count)
            }
        };

        Ok(decision)
    }

    /// Reports the remaining budget without creating or changing anything
    pub async fn peek(&self, client_id: &str) -> Result<BudgetSnapshot> {
        self.peek_at(client_id, Utc::now()).await
    }

    pub async fn peek_at(&self, client_id: &str, now: DateTime<Utc>) -> Result<BudgetSnapshot> {
        let remaining = match self.repository.find(client_id).await? {
            None => self.budget,
            // The next admit resets the window, so the full budget is available
            Some(record) if record.is_expired_at(now) => self.budget,
            Some(record) => self.remaining_after(record.attempt_count),
        };

        Ok(BudgetSnapshot { remaining })
    }

    fn allowed(&self, attempt_count: i32) -> AttemptDecision {
        AttemptDecision {
            allowed: true,
            remaining: self.remaining_after(attempt_count),
        }
    }

    fn remaining_after(&self, attempt_count: i32) -> u32 {
        let remaining = i64::from(self.budget) - i64::from(attempt_count);
        remaining.clamp(0, i64::from(self.budget)) as u32
    }
}
