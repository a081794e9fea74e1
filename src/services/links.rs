// src/services/links.rs - Business logic for creating and managing links
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, RepositoryError};
use crate::models::{Link, LinkMutationDto, LinkOrigin, LinkStats, UpsertAction};
use crate::repositories::LinkRepositoryTrait;

type Result<T> = std::result::Result<T, AppError>;

pub struct LinkService<R: LinkRepositoryTrait> {
    repository: Arc<R>,
}

impl<R: LinkRepositoryTrait> LinkService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Customer write: points an existing code at a new destination, or
    /// creates the code if nobody owns it yet.
    pub async fn upsert_for_customer(&self, dto: LinkMutationDto) -> Result<(UpsertAction, String)> {
        dto.validate()?;
        let dto = dto.normalized();

        if self.repository.find_by_code(&dto.short_code).await?.is_some() {
            let affected = self
                .repository
                .update_destination(&dto.short_code, &dto.destination_url)
                .await?;
            if affected > 0 {
                info!("Customer updated destination of '{}'", dto.short_code);
                return Ok((UpsertAction::Updated, dto.short_code));
            }
            warn!("Code '{}' vanished before its update, creating it instead", dto.short_code);
        }

        let short_code = dto.short_code.clone();
        let destination_url = dto.destination_url.clone();
        match self
            .repository
            .insert(&dto.into_new_link(LinkOrigin::Customer))
            .await
        {
            Ok(link) => {
                info!("Customer created '{}'", link.short_code);
                Ok((UpsertAction::Created, link.short_code))
            }
            // Someone else created the code between our lookup and insert
            Err(RepositoryError::Conflict(_)) => {
                warn!("Code '{}' appeared concurrently, updating instead", short_code);
                let affected = self
                    .repository
                    .update_destination(&short_code, &destination_url)
                    .await?;
                if affected == 0 {
                    return Err(AppError::Conflict(format!(
                        "Short code '{}' is changing concurrently, try again",
                        short_code
                    )));
                }
                Ok((UpsertAction::Updated, short_code))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every link, newest first, with dashboard aggregates
    pub async fn list_with_stats(&self) -> Result<(Vec<Link>, LinkStats)> {
        let links = self.repository.find_all().await?;
        let stats = LinkStats::from_links(&links, local_day_start());
        Ok((links, stats))
    }

    /// Admin create. Duplicate codes are rejected before anything is written.
    pub async fn create(&self, dto: LinkMutationDto) -> Result<Link> {
        dto.validate()?;
        let dto = dto.normalized();

        if self.repository.find_by_code(&dto.short_code).await?.is_some() {
            return Err(AppError::Conflict("Short code already exists".to_string()));
        }

        let link = self
            .repository
            .insert(&dto.into_new_link(LinkOrigin::Admin))
            .await?;
        info!("Admin created '{}'", link.short_code);
        Ok(link)
    }

    /// Admin update of both code and destination, returning the stored record
    pub async fn update(&self, id: &Uuid, dto: LinkMutationDto) -> Result<Link> {
        dto.validate()?;
        let dto = dto.normalized();

        if self
            .repository
            .find_by_code_excluding(&dto.short_code, id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Short code already exists".to_string()));
        }

        let affected = self
            .repository
            .update(id, &dto.short_code, &dto.destination_url)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("Link {} not found", id)));
        }

        info!("Admin updated link {} to '{}'", id, dto.short_code);
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Link {} not found", id)))
    }

    pub async fn delete(&self, id: &Uuid) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(AppError::NotFound(format!("Link {} not found", id)));
        }

        info!("Admin deleted link {}", id);
        Ok(())
    }
}

/// Local midnight of the current day, as UTC
fn local_day_start() -> DateTime<Utc> {
    let now = Local::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or_else(|| now.with_timezone(&Utc))
}
