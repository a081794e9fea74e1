// src/repositories/link.rs - Data access for short links
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{Link, NewLink};

type Result<T> = std::result::Result<T, RepositoryError>;

const LINK_COLUMNS: &str =
    "id, short_code, destination_url, visit_count, created_by, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepositoryTrait: Send + Sync {
    /// Finds the link owning `code`, fetching at most one row
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If a database error occurs
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>>;

    /// Finds a link owning `code` other than the one identified by `id`
    ///
    /// Used to keep short codes unique when an existing record is renamed.
    async fn find_by_code_excluding(&self, code: &str, id: &Uuid) -> Result<Option<Link>>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Link>>;

    /// Lists every link, newest first
    async fn find_all(&self) -> Result<Vec<Link>>;

    /// Inserts a link with a zero visit counter
    ///
    /// ### Errors
    /// * `RepositoryError::Conflict` - If the short code is already taken
    /// * `RepositoryError::Database` - If a database error occurs
    async fn insert(&self, link: &NewLink) -> Result<Link>;

    /// Replaces the destination of the link owning `code` and refreshes `updated_at`
    ///
    /// ### Returns
    /// * `Result<u64>` - number of rows affected
    async fn update_destination(&self, code: &str, destination_url: &str) -> Result<u64>;

    /// Replaces both the short code and destination of a link and refreshes `updated_at`
    async fn update(&self, id: &Uuid, short_code: &str, destination_url: &str) -> Result<u64>;

    /// Writes an already computed visit counter. Callers read, add one, then
    /// write; concurrent visits may overwrite each other.
    async fn set_visit_count(&self, id: &Uuid, visit_count: i64) -> Result<u64>;

    /// ### Returns
    /// * `Result<bool>` - whether a row was deleted
    async fn delete(&self, id: &Uuid) -> Result<bool>;

    /// Deletes links created before `cutoff` that were never visited
    ///
    /// ### Returns
    /// * `Result<u64>` - number of links deleted
    async fn delete_unvisited_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Equality and not-equal predicates for single-row lookups
#[derive(Debug, Default)]
struct LinkFilter<'a> {
    id: Option<&'a Uuid>,
    short_code: Option<&'a str>,
    exclude_id: Option<&'a Uuid>,
}

pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }

    async fn find_one(&self, filter: LinkFilter<'_>) -> Result<Option<Link>> {
        let mut query_builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM links WHERE 1=1", LINK_COLUMNS));

        if let Some(id) = filter.id {
            query_builder.push(" AND id = ");
            query_builder.push_bind(*id);
        }

        if let Some(code) = filter.short_code {
            query_builder.push(" AND short_code = ");
            query_builder.push_bind(code);
        }

        if let Some(excluded) = filter.exclude_id {
            query_builder.push(" AND id <> ");
            query_builder.push_bind(*excluded);
        }

        query_builder.push(" LIMIT 1");

        query_builder
            .build_query_as::<Link>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to look up link with {:?}: {}", filter, e);
                RepositoryError::from(e)
            })
    }
}

#[async_trait]
impl LinkRepositoryTrait for LinkRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>> {
        self.find_one(LinkFilter {
            short_code: Some(code),
            ..Default::default()
        })
        .await
    }

    async fn find_by_code_excluding(&self, code: &str, id: &Uuid) -> Result<Option<Link>> {
        self.find_one(LinkFilter {
            short_code: Some(code),
            exclude_id: Some(id),
            ..Default::default()
        })
        .await
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Link>> {
        self.find_one(LinkFilter {
            id: Some(id),
            ..Default::default()
        })
        .await
    }

    async fn find_all(&self) -> Result<Vec<Link>> {
        let sql = format!("SELECT {} FROM links ORDER BY created_at DESC", LINK_COLUMNS);
        let links = sqlx::query_as::<_, Link>(&sql).fetch_all(&self.pool).await?;
        Ok(links)
    }

    async fn insert(&self, link: &NewLink) -> Result<Link> {
        let sql = format!(
            "INSERT INTO links (short_code, destination_url, created_by) VALUES ($1, $2, $3) RETURNING {}",
            LINK_COLUMNS
        );

        sqlx::query_as::<_, Link>(&sql)
            .bind(&link.short_code)
            .bind(&link.destination_url)
            .bind(link.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to insert link '{}': {}", link.short_code, e);
                RepositoryError::from(e)
            })
    }

    async fn update_destination(&self, code: &str, destination_url: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE links SET destination_url = $1, updated_at = $2 WHERE short_code = $3",
        )
        .bind(destination_url)
        .bind(Utc::now())
        .bind(code)
        .execute(&self.pool)
        .await?;

        debug!("Updated destination of '{}' ({} rows)", code, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn update(&self, id: &Uuid, short_code: &str, destination_url: &str) -> Result<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE links SET ");
        let mut separated = builder.separated(", ");
        separated.push("short_code = ").push_bind_unseparated(short_code);
        separated.push("destination_url = ").push_bind_unseparated(destination_url);
        separated.push("updated_at = ").push_bind_unseparated(Utc::now());
        builder.push(" WHERE id = ").push_bind(*id);

        let result = builder.build().execute(&self.pool).await?;

        debug!("Updated link {} ({} rows)", id, result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn set_visit_count(&self, id: &Uuid, visit_count: i64) -> Result<u64> {
        let result = sqlx::query("UPDATE links SET visit_count = $1 WHERE id = $2")
            .bind(visit_count)
            .bind(*id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(*id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_unvisited_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM links WHERE created_at < $1 AND visit_count = 0")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
