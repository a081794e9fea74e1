// src/services/retention.rs - Periodic cleanup of stale links and attempt records
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use log::{error, info};

use crate::config::RetentionConfig;
use crate::errors::AppError;
use crate::repositories::{AttemptRepositoryTrait, LinkRepositoryTrait};

/// Rows removed by one retention sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted_links: u64,
    pub deleted_attempts: u64,
}

pub struct RetentionService<L: LinkRepositoryTrait, A: AttemptRepositoryTrait> {
    links: Arc<L>,
    attempts: Arc<A>,
    link_max_age: Months,
    attempt_grace: Duration,
}

impl<L: LinkRepositoryTrait, A: AttemptRepositoryTrait> RetentionService<L, A> {
    pub fn new(links: Arc<L>, attempts: Arc<A>, config: &RetentionConfig) -> Self {
        Self {
            links,
            attempts,
            link_max_age: Months::new(config.link_max_age_months),
            attempt_grace: config.attempt_grace(),
        }
    }

    pub async fn sweep(&self) -> Result<SweepReport, AppError> {
        self.sweep_at(Utc::now()).await
    }

    /// Deletes never-visited links older than the retention age, then attempt
    /// records whose window closed more than the grace period ago. Only the
    /// link deletion can fail the sweep.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, AppError> {
        let link_cutoff = now
            .checked_sub_months(self.link_max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let deleted_links = self.links.delete_unvisited_before(link_cutoff).await?;

        let attempt_cutoff = now
            .checked_sub_signed(self.attempt_grace)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let deleted_attempts = match self.attempts.delete_expired_before(attempt_cutoff).await {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to clean up attempt records: {}", e);
                0
            }
        };

        info!(
            "Retention sweep removed {} links and {} attempt records",
            deleted_links, deleted_attempts
        );
        Ok(SweepReport {
            deleted_links,
            deleted_attempts,
        })
    }
}
