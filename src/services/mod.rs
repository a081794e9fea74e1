use std::sync::Arc;

use actix_web::web;

mod auth;
mod governor;
mod links;
mod resolver;
mod retention;

pub use auth::{CredentialVerifier, StaticPasswordVerifier};
pub use governor::AttemptGovernor;
pub use links::LinkService;
pub use resolver::Resolver;
pub use retention::RetentionService;

#[cfg(test)]
pub use auth::MockCredentialVerifier;

use crate::{
    config::Config,
    db::Database,
    repositories::{AttemptRepository, AttemptRepositoryTrait, LinkRepository, LinkRepositoryTrait},
};

/// Every service the routes depend on, wrapped for sharing across workers
pub struct Services<L: LinkRepositoryTrait, A: AttemptRepositoryTrait> {
    pub resolver: web::Data<Resolver<L>>,
    pub governor: web::Data<AttemptGovernor<A>>,
    pub links: web::Data<LinkService<L>>,
    pub retention: web::Data<RetentionService<L, A>>,
    pub verifier: web::Data<Arc<dyn CredentialVerifier>>,
}

impl<L, A> Services<L, A>
where
    L: LinkRepositoryTrait + 'static,
    A: AttemptRepositoryTrait + 'static,
{
    pub fn new(
        link_repository: Arc<L>,
        attempt_repository: Arc<A>,
        verifier: Arc<dyn CredentialVerifier>,
        config: &Config,
    ) -> Self {
        let resolver = Resolver::new(
            Arc::clone(&link_repository),
            config.redirect.fallback_location.clone(),
            config.redirect.lookup_timeout(),
        );
        let governor = AttemptGovernor::new(Arc::clone(&attempt_repository), &config.attempts);
        let links = LinkService::new(Arc::clone(&link_repository));
        let retention = RetentionService::new(link_repository, attempt_repository, &config.retention);

        Self {
            resolver: web::Data::new(resolver),
            governor: web::Data::new(governor),
            links: web::Data::new(links),
            retention: web::Data::new(retention),
            verifier: web::Data::new(verifier),
        }
    }

    /// Service Register
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.resolver.clone())
            .app_data(self.governor.clone())
            .app_data(self.links.clone())
            .app_data(self.retention.clone())
            .app_data(self.verifier.clone());
    }
}

impl Services<LinkRepository, AttemptRepository> {
    /// Wires the Postgres-backed repositories
    pub fn build(db: &Database, config: &Config) -> Self {
        let verifier: Arc<dyn CredentialVerifier> =
            Arc::new(StaticPasswordVerifier::new(config.admin.password.clone()));

        Self::new(
            Arc::new(LinkRepository::new(db.clone())),
            Arc::new(AttemptRepository::new(db.clone())),
            verifier,
            config,
        )
    }
}

// Handles are Arc-backed, so cloning never requires L: Clone
impl<L: LinkRepositoryTrait, A: AttemptRepositoryTrait> Clone for Services<L, A> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            governor: self.governor.clone(),
            links: self.links.clone(),
            retention: self.retention.clone(),
            verifier: self.verifier.clone(),
        }
    }
}
