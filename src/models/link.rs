// src/models/link.rs - Link records and their request/response shapes
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validations::{normalize_url, validate_short_code, validate_url};

/// Who created a link. Set once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "link_origin", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkOrigin {
    Admin,
    Customer,
}

/// A short code mapped to its destination
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: Uuid,

    /// Unique, 3-25 ASCII alphanumerics
    pub short_code: String,

    pub destination_url: String,

    /// Best-effort popularity counter, never decremented
    pub visit_count: i64,

    pub created_by: LinkOrigin,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Link {
    pub fn has_visits(&self) -> bool {
        self.visit_count > 0
    }
}

/// Values needed to insert a link; the store assigns id, counter and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewLink {
    pub short_code: String,
    pub destination_url: String,
    pub created_by: LinkOrigin,
}

/// Body of every link-mutating request, customer or admin
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkMutationDto {
    #[validate(custom(function = "validate_short_code"))]
    pub short_code: String,

    #[validate(custom(function = "validate_url"))]
    pub destination_url: String,
}

impl LinkMutationDto {
    /// Replaces the destination with its canonical serialization, so only
    /// header-safe URLs reach the store. Call after `validate`.
    pub fn normalized(mut self) -> Self {
        if let Some(url) = normalize_url(&self.destination_url) {
            self.destination_url = url;
        }
        self
    }

    pub fn into_new_link(self, created_by: LinkOrigin) -> NewLink {
        NewLink {
            short_code: self.short_code,
            destination_url: self.destination_url,
            created_by,
        }
    }
}

/// What a customer write did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Aggregates shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub total_links: usize,
    pub total_visits: i64,
    pub today_links: usize,
    pub active_links: usize,
}

impl LinkStats {
    /// `day_start` is the instant of local midnight for "today"
    pub fn from_links(links: &[Link], day_start: DateTime<Utc>) -> Self {
        links.iter().fold(Self::default(), |mut stats, link| {
            stats.total_links += 1;
            stats.total_visits += link.visit_count;
            if link.created_at >= day_start {
                stats.today_links += 1;
            }
            if link.has_visits() {
                stats.active_links += 1;
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn link(code: &str, visits: i64, created_at: DateTime<Utc>) -> Link {
        Link {
            id: Uuid::new_v4(),
            short_code: code.to_string(),
            destination_url: "https://example.com".to_string(),
            visit_count: visits,
            created_by: LinkOrigin::Customer,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_stats_from_links() {
        let now = Utc::now();
        let day_start = now - Duration::hours(1);
        let links = vec![
            link("abc", 0, now),
            link("def", 4, now - Duration::days(3)),
            link("ghi", 2, now - Duration::minutes(5)),
        ];

        let stats = LinkStats::from_links(&links, day_start);
        assert_eq!(
            stats,
            LinkStats {
                total_links: 3,
                total_visits: 6,
                today_links: 2,
                active_links: 2,
            }
        );
    }

    #[test]
    fn test_stats_of_empty_store() {
        assert_eq!(LinkStats::from_links(&[], Utc::now()), LinkStats::default());
    }

    #[test]
    fn test_dto_reads_camel_case_and_tolerates_missing_fields() {
        let dto: LinkMutationDto =
            serde_json::from_str(r#"{"shortCode":"abc123","destinationUrl":"https://x.test"}"#)
                .unwrap();
        assert_eq!(dto.short_code, "abc123");
        assert_eq!(dto.destination_url, "https://x.test");
        assert!(dto.validate().is_ok());

        let dto: LinkMutationDto = serde_json::from_str(r#"{"shortCode":"abc123"}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_normalized_destination_is_header_safe() {
        let dto = LinkMutationDto {
            short_code: "nl12".to_string(),
            destination_url: " https://x.test/path\n".to_string(),
        };
        assert!(dto.validate().is_ok());

        let link = dto.normalized().into_new_link(LinkOrigin::Customer);
        assert_eq!(link.destination_url, "https://x.test/path");
        assert!(actix_web::http::header::HeaderValue::from_str(&link.destination_url).is_ok());
    }
}
