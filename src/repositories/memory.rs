//! In-memory stand-ins for the record store, for tests that need state to
//! persist across calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AttemptRepositoryTrait, LinkRepositoryTrait};
use crate::errors::RepositoryError;
use crate::models::{AttemptRecord, Link, NewLink};

type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<Link>>,
    lookup_delay: Option<Duration>,
}

impl InMemoryLinkRepository {
    pub fn with_links(links: Vec<Link>) -> Self {
        Self {
            links: Mutex::new(links),
            lookup_delay: None,
        }
    }

    /// Makes `find_by_code` stall, to simulate a slow store
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub fn snapshot(&self) -> Vec<Link> {
        self.links.lock().unwrap().clone()
    }

    pub fn get(&self, code: &str) -> Option<Link> {
        self.snapshot().into_iter().find(|l| l.short_code == code)
    }
}

#[async_trait]
impl LinkRepositoryTrait for InMemoryLinkRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.get(code))
    }

    async fn find_by_code_excluding(&self, code: &str, id: &Uuid) -> Result<Option<Link>> {
        Ok(self
            .snapshot()
            .into_iter()
            .find(|l| l.short_code == code && l.id != *id))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Link>> {
        Ok(self.snapshot().into_iter().find(|l| l.id == *id))
    }

    async fn find_all(&self) -> Result<Vec<Link>> {
        let mut links = self.snapshot();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn insert(&self, link: &NewLink) -> Result<Link> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.short_code == link.short_code) {
            return Err(RepositoryError::Conflict("Short code already exists".into()));
        }

        let now = Utc::now();
        let record = Link {
            id: Uuid::new_v4(),
            short_code: link.short_code.clone(),
            destination_url: link.destination_url.clone(),
            visit_count: 0,
            created_by: link.created_by,
            created_at: now,
            updated_at: now,
        };
        links.push(record.clone());
        Ok(record)
    }

    async fn update_destination(&self, code: &str, destination_url: &str) -> Result<u64> {
        let mut links = self.links.lock().unwrap();
        let mut affected = 0;
        for link in links.iter_mut().filter(|l| l.short_code == code) {
            link.destination_url = destination_url.to_string();
            link.updated_at = Utc::now();
            affected += 1;
        }
        Ok(affected)
    }

    async fn update(&self, id: &Uuid, short_code: &str, destination_url: &str) -> Result<u64> {
        let mut links = self.links.lock().unwrap();
        match links.iter_mut().find(|l| l.id == *id) {
            Some(link) => {
                link.short_code = short_code.to_string();
                link.destination_url = destination_url.to_string();
                link.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn set_visit_count(&self, id: &Uuid, visit_count: i64) -> Result<u64> {
        let mut links = self.links.lock().unwrap();
        match links.iter_mut().find(|l| l.id == *id) {
            Some(link) => {
                link.visit_count = visit_count;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| l.id != *id);
        Ok(links.len() < before)
    }

    async fn delete_unvisited_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| !(l.created_at < cutoff && l.visit_count == 0));
        Ok((before - links.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryAttemptRepository {
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl InMemoryAttemptRepository {
    pub fn get(&self, client_id: &str) -> Option<AttemptRecord> {
        self.records.lock().unwrap().get(client_id).cloned()
    }

    pub fn put(&self, record: AttemptRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.client_id.clone(), record);
    }
}

#[async_trait]
impl AttemptRepositoryTrait for InMemoryAttemptRepository {
    async fn find(&self, client_id: &str) -> Result<Option<AttemptRecord>> {
        Ok(self.get(client_id))
    }

    async fn insert(&self, record: &AttemptRecord) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .entry(record.client_id.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn update(&self, record: &AttemptRecord) -> Result<u64> {
        let mut records = self.records.lock().unwrap();
        match records.get_mut(&record.client_id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|_, r| r.reset_time >= cutoff);
        Ok((before - records.len()) as u64)
    }
}
