use std::sync::Arc;

use actix_web::{web, HttpResponse};
use log::warn;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::AppError,
    middleware::AdminGuard,
    models::LinkMutationDto,
    repositories::{AttemptRepositoryTrait, LinkRepositoryTrait},
    services::{CredentialVerifier, LinkService, RetentionService},
};

type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminAuthRequest {
    pub password: String,
}

/// Password check used by the dashboard login form
pub async fn auth_handler(
    body: web::Json<AdminAuthRequest>,
    verifier: web::Data<Arc<dyn CredentialVerifier>>,
) -> HttpResponse {
    if verifier.verify(&body.password) {
        HttpResponse::Ok().json(json!({ "success": true }))
    } else {
        warn!("Failed admin login attempt");
        HttpResponse::Unauthorized().json(json!({
            "success": false,
            "error": "Invalid password",
        }))
    }
}

pub async fn list_links_handler<L: LinkRepositoryTrait + 'static>(
    _admin: AdminGuard,
    links: web::Data<LinkService<L>>,
) -> Result<HttpResponse> {
    let (links, stats) = links.list_with_stats().await?;
    Ok(HttpResponse::Ok().json(json!({
        "links": links,
        "stats": stats,
    })))
}

pub async fn create_link_handler<L: LinkRepositoryTrait + 'static>(
    _admin: AdminGuard,
    dto: web::Json<LinkMutationDto>,
    links: web::Data<LinkService<L>>,
) -> Result<HttpResponse> {
    let link = links.create(dto.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "link": link,
    })))
}

pub async fn update_link_handler<L: LinkRepositoryTrait + 'static>(
    _admin: AdminGuard,
    id: web::Path<Uuid>,
    dto: web::Json<LinkMutationDto>,
    links: web::Data<LinkService<L>>,
) -> Result<HttpResponse> {
    let link = links.update(&id.into_inner(), dto.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "link": link,
    })))
}

pub async fn delete_link_handler<L: LinkRepositoryTrait + 'static>(
    _admin: AdminGuard,
    id: web::Path<Uuid>,
    links: web::Data<LinkService<L>>,
) -> Result<HttpResponse> {
    links.delete(&id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// Runs the retention sweep on demand
pub async fn cleanup_handler<L, A>(
    _admin: AdminGuard,
    retention: web::Data<RetentionService<L, A>>,
) -> Result<HttpResponse>
where
    L: LinkRepositoryTrait + 'static,
    A: AttemptRepositoryTrait + 'static,
{
    let report = retention.sweep().await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "deletedCount": report.deleted_links,
        "deletedAttempts": report.deleted_attempts,
    })))
}
