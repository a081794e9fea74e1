// src/services/resolver.rs - Short code to redirect target
use std::sync::Arc;
use std::time::Duration;

use actix_web::{
    http::header::{HeaderValue, LOCATION},
    http::StatusCode,
    HttpResponse,
};
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use crate::models::Link;
use crate::repositories::LinkRepositoryTrait;
use crate::validations::is_valid_short_code;

/// Where a resolution sends the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// A stored mapping was found; answered with 301
    Destination(String),
    /// Anything else; answered with 302 to the configured fallback
    Fallback(String),
}

impl RedirectOutcome {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RedirectOutcome::Destination(_) => StatusCode::MOVED_PERMANENTLY,
            RedirectOutcome::Fallback(_) => StatusCode::FOUND,
        }
    }

    pub fn location(&self) -> &str {
        match self {
            RedirectOutcome::Destination(url) | RedirectOutcome::Fallback(url) => url,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((LOCATION, self.location()))
            .finish()
    }
}

/// The redirect decision plus the detached visit-count write, if one was started
pub struct Resolution {
    pub outcome: RedirectOutcome,
    pub visit: Option<JoinHandle<()>>,
}

pub struct Resolver<R: LinkRepositoryTrait> {
    repository: Arc<R>,
    fallback_location: String,
    lookup_timeout: Duration,
}

impl<R: LinkRepositoryTrait + 'static> Resolver<R> {
    pub fn new(repository: Arc<R>, fallback_location: impl Into<String>, lookup_timeout: Duration) -> Self {
        Self {
            repository,
            fallback_location: fallback_location.into(),
            lookup_timeout,
        }
    }

    /// The final path segment, which is the candidate short code
    pub fn candidate_code(raw_path: &str) -> &str {
        raw_path.rsplit('/').next().unwrap_or_default()
    }

    /// Resolves the final segment of `raw_path`. Never fails: every miss,
    /// malformed code, store error or timeout becomes the fallback redirect.
    pub async fn resolve(&self, raw_path: &str) -> Resolution {
        let code = Self::candidate_code(raw_path);

        if !is_valid_short_code(code) {
            debug!("Rejected malformed short code {:?}", code);
            return self.fallback();
        }

        let lookup = tokio::time::timeout(self.lookup_timeout, self.repository.find_by_code(code));

        match lookup.await {
            Err(_) => {
                error!(
                    "Lookup for '{}' timed out after {:?}",
                    code, self.lookup_timeout
                );
                self.fallback()
            }
            Ok(Err(e)) => {
                error!("Lookup for '{}' failed: {}", code, e);
                self.fallback()
            }
            Ok(Ok(None)) => {
                debug!("No link found for code '{}'", code);
                self.fallback()
            }
            // Rows written before destinations were normalized may hold
            // characters a Location header cannot carry
            Ok(Ok(Some(link))) if HeaderValue::from_str(&link.destination_url).is_err() => {
                error!(
                    "Stored destination for '{}' is not a valid Location: {:?}",
                    code, link.destination_url
                );
                self.fallback()
            }
            Ok(Ok(Some(link))) => {
                info!("Redirecting '{}' to '{}'", code, link.destination_url);
                let visit = self.record_visit(&link);
                Resolution {
                    outcome: RedirectOutcome::Destination(link.destination_url),
                    visit: Some(visit),
                }
            }
        }
    }

    fn fallback(&self) -> Resolution {
        Resolution {
            outcome: RedirectOutcome::Fallback(self.fallback_location.clone()),
            visit: None,
        }
    }

    // Detached read-increment-write; concurrent visits may lose updates.
    fn record_visit(&self, link: &Link) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        let id = link.id;
        let code = link.short_code.clone();
        let next = link.visit_count.saturating_add(1);

        tokio::spawn(async move {
            match repository.set_visit_count(&id, next).await {
                Ok(0) => warn!("Visit for '{}' not recorded, link no longer exists", code),
                Ok(_) => debug!("Visit count for '{}' is now {}", code, next),
                Err(e) => warn!("Failed to record visit for '{}': {}", code, e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    use super::*;
    use crate::errors::RepositoryError;
    use crate::models::{LinkOrigin, NewLink};
    use crate::repositories::memory::InMemoryLinkRepository;
    use crate::repositories::MockLinkRepositoryTrait;

    const FALLBACK: &str = "/404.html";

    fn resolver<R: LinkRepositoryTrait + 'static>(repo: R) -> Resolver<R> {
        Resolver::new(Arc::new(repo), FALLBACK, Duration::from_secs(1))
    }

    fn stored_link(code: &str, url: &str, visits: i64) -> Link {
        Link {
            id: Uuid::new_v4(),
            short_code: code.to_string(),
            destination_url: url.to_string(),
            visit_count: visits,
            created_by: LinkOrigin::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_candidate_code_is_final_segment() {
        type R = Resolver<MockLinkRepositoryTrait>;
        assert_eq!(R::candidate_code("/abc123"), "abc123");
        assert_eq!(R::candidate_code("/go/nested/abc123"), "abc123");
        assert_eq!(R::candidate_code("/abc123/"), "");
        assert_eq!(R::candidate_code(""), "");
    }

    #[tokio::test]
    async fn test_malformed_codes_fall_back_without_store_access() {
        // Any repository call on this mock panics
        let resolver = resolver(MockLinkRepositoryTrait::new());

        let too_long = format!("/{}", "a".repeat(26));
        for path in ["/", "/ab", "/abc-12", "/abc%20", "/ab.c", too_long.as_str()] {
            let resolution = resolver.resolve(path).await;
            assert_eq!(
                resolution.outcome,
                RedirectOutcome::Fallback(FALLBACK.to_string()),
                "path {path}"
            );
            assert!(resolution.visit.is_none());
        }
    }

    #[tokio::test]
    async fn test_unknown_code_falls_back_without_counting() {
        let mut repo = MockLinkRepositoryTrait::new();
        repo.expect_find_by_code()
            .with(eq("nosuch"))
            .times(2)
            .returning(|_| Ok(None));
        repo.expect_set_visit_count().never();

        let resolver = resolver(repo);
        let first = resolver.resolve("/nosuch").await;
        let second = resolver.resolve("/nosuch").await;

        assert_eq!(first.outcome.status_code(), StatusCode::FOUND);
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.outcome.location(), FALLBACK);
    }

    #[tokio::test]
    async fn test_store_failure_falls_back() {
        let mut repo = MockLinkRepositoryTrait::new();
        repo.expect_find_by_code()
            .returning(|_| Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)));
        repo.expect_set_visit_count().never();

        let resolution = resolver(repo).resolve("/abc123").await;

        assert_eq!(
            resolution.outcome,
            RedirectOutcome::Fallback(FALLBACK.to_string())
        );
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out_to_fallback() {
        let repo = InMemoryLinkRepository::with_links(vec![stored_link(
            "abc123",
            "https://example.com/x",
            0,
        )])
        .with_lookup_delay(Duration::from_secs(5));
        let repo = Arc::new(repo);
        let resolver = Resolver::new(Arc::clone(&repo), FALLBACK, Duration::from_millis(20));

        let resolution = resolver.resolve("/abc123").await;

        assert_eq!(
            resolution.outcome,
            RedirectOutcome::Fallback(FALLBACK.to_string())
        );
        assert!(resolution.visit.is_none());
        assert_eq!(repo.get("abc123").unwrap().visit_count, 0);
    }

    #[tokio::test]
    async fn test_unsafe_stored_destination_falls_back() {
        let link = stored_link("nl12", "https://x.test\n", 0);

        let mut repo = MockLinkRepositoryTrait::new();
        repo.expect_find_by_code()
            .returning(move |_| Ok(Some(link.clone())));
        repo.expect_set_visit_count().never();

        let resolution = resolver(repo).resolve("/nl12").await;

        assert_eq!(
            resolution.outcome,
            RedirectOutcome::Fallback(FALLBACK.to_string())
        );
        assert!(resolution.visit.is_none());
    }

    #[tokio::test]
    async fn test_found_code_redirects_permanently_and_counts_once() {
        let link = stored_link("abc123", "https://example.com/x", 4);
        let link_id = link.id;

        let mut repo = MockLinkRepositoryTrait::new();
        repo.expect_find_by_code()
            .with(eq("abc123"))
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));
        repo.expect_set_visit_count()
            .withf(move |id, count| *id == link_id && *count == 5)
            .times(1)
            .returning(|_, _| Ok(1));

        let resolution = resolver(repo).resolve("/abc123").await;

        assert_eq!(resolution.outcome.status_code(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resolution.outcome.location(), "https://example.com/x");
        resolution.visit.expect("visit should be recorded").await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_visit_count_does_not_block_redirect() {
        let link = stored_link("abc123", "https://example.com/x", 0);

        let mut repo = MockLinkRepositoryTrait::new();
        repo.expect_find_by_code()
            .returning(move |_| Ok(Some(link.clone())));
        repo.expect_set_visit_count()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Database(sqlx::Error::PoolClosed)));

        let resolution = resolver(repo).resolve("/abc123").await;

        assert_eq!(
            resolution.outcome,
            RedirectOutcome::Destination("https://example.com/x".to_string())
        );
        resolution.visit.unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn test_created_link_resolves_and_increments() {
        let repo = Arc::new(InMemoryLinkRepository::default());
        repo.insert(&NewLink {
            short_code: "abc123".to_string(),
            destination_url: "https://x.test".to_string(),
            created_by: LinkOrigin::Customer,
        })
        .await
        .unwrap();

        let resolver = Resolver::new(Arc::clone(&repo), FALLBACK, Duration::from_secs(1));
        let resolution = resolver.resolve("/abc123").await;

        assert_eq!(
            resolution.outcome,
            RedirectOutcome::Destination("https://x.test".to_string())
        );
        resolution.visit.unwrap().await.unwrap();
        assert_eq!(repo.get("abc123").unwrap().visit_count, 1);
    }

    #[test]
    fn test_outcome_response_headers() {
        let response = RedirectOutcome::Destination("https://x.test".into()).into_response();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "https://x.test");

        let response = RedirectOutcome::Fallback(FALLBACK.into()).into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), FALLBACK);
    }
}
