use actix_web::{
    error::{JsonPayloadError, PathError},
    http::Method,
    web, HttpRequest, HttpResponse, Resource, Responder,
};
use log::debug;

use crate::{
    db::DBHealthStatus,
    errors::AppError,
    handlers::{admin, links, redirect},
    repositories::{AttemptRepositoryTrait, LinkRepositoryTrait},
    types::{AppState, HealthStatus, ResponsePayload},
};

// Handler function for the root route "/"
async fn index() -> impl Responder {
    HttpResponse::Ok().json(ResponsePayload {
        status: 200,
        message: String::from("Link relay is running"),
    })
}

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let db_health = data.db.health_check().await;
    let healthy = matches!(db_health.status, DBHealthStatus::Healthy);

    let status = HealthStatus {
        status: String::from(if healthy { "OK" } else { "DEGRADED" }),
        version: data.version.clone(),
        db_health,
        uptime_seconds: data.start_time.elapsed().as_secs(),
    };

    if healthy {
        HttpResponse::Ok().json(status)
    } else {
        HttpResponse::ServiceUnavailable().json(status)
    }
}

async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed("Method not allowed".to_string()))
}

/// A JSON resource: bare OPTIONS gets an empty 200, unrouted methods a 405
fn json_resource(path: &str) -> Resource {
    web::resource(path)
        .route(web::method(Method::OPTIONS).to(preflight))
        .default_service(web::to(method_not_allowed))
}

fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected JSON body on {}: {}", req.path(), err);
    AppError::Validation("Invalid request body".to_string()).into()
}

fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected path {}: {}", req.path(), err);
    AppError::Validation("Invalid link id".to_string()).into()
}

// Configure all routes. The catch-all redirect must stay last.
pub fn configure_routes<L, A>(cfg: &mut web::ServiceConfig)
where
    L: LinkRepositoryTrait + 'static,
    A: AttemptRepositoryTrait + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));

    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));

    // Customer surface
    cfg.service(json_resource("/api/attempts").route(web::get().to(links::attempts_handler::<A>)));
    cfg.service(json_resource("/api/links").route(web::post().to(links::upsert_handler::<L, A>)));

    // Admin surface
    cfg.service(json_resource("/api/admin/auth").route(web::post().to(admin::auth_handler)));
    cfg.service(
        json_resource("/api/admin/links")
            .route(web::get().to(admin::list_links_handler::<L>))
            .route(web::post().to(admin::create_link_handler::<L>)),
    );
    cfg.service(
        json_resource("/api/admin/links/{id}")
            .route(web::put().to(admin::update_link_handler::<L>))
            .route(web::delete().to(admin::delete_link_handler::<L>)),
    );
    cfg.service(
        json_resource("/api/admin/cleanup").route(web::post().to(admin::cleanup_handler::<L, A>)),
    );

    cfg.service(web::resource("/{tail:.*}").route(web::get().to(redirect::redirect_handler::<L>)));
}
