use actix_web::{web, HttpRequest, HttpResponse};

use crate::repositories::LinkRepositoryTrait;
use crate::services::Resolver;

/// Catch-all GET: resolves the last path segment and redirects
///
/// Always answers with a redirect; the visit count write is left running
/// in the background.
pub async fn redirect_handler<L: LinkRepositoryTrait + 'static>(
    req: HttpRequest,
    resolver: web::Data<Resolver<L>>,
) -> HttpResponse {
    let resolution = resolver.resolve(req.path()).await;
    resolution.outcome.into_response()
}
