use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};
use serde_json::json;

use crate::{
    errors::{AppError, BudgetedError},
    models::{LinkMutationDto, UpsertAction},
    repositories::{AttemptRepositoryTrait, LinkRepositoryTrait},
    services::{AttemptGovernor, LinkService},
    utils::client_id,
};

type Result<T> = std::result::Result<T, BudgetedError>;

/// Remaining attempt budget for the calling client
pub async fn attempts_handler<A: AttemptRepositoryTrait + 'static>(
    req: HttpRequest,
    governor: web::Data<AttemptGovernor<A>>,
) -> Result<HttpResponse> {
    let client = client_id(&req);
    let snapshot = governor
        .peek(&client)
        .await
        .map_err(|e| BudgetedError::new(e, governor.budget()))?;

    Ok(HttpResponse::Ok().json(snapshot))
}

/// Customer create-or-update. The attempt is counted before the body is
/// even looked at, so malformed submissions still consume budget.
pub async fn upsert_handler<L, A>(
    req: HttpRequest,
    body: web::Bytes,
    governor: web::Data<AttemptGovernor<A>>,
    links: web::Data<LinkService<L>>,
) -> Result<HttpResponse>
where
    L: LinkRepositoryTrait + 'static,
    A: AttemptRepositoryTrait + 'static,
{
    let client = client_id(&req);
    let decision = governor
        .admit(&client)
        .await
        .map_err(|e| BudgetedError::new(e, 0))?;

    if !decision.allowed {
        info!("Rejected link submission from {}: budget exhausted", client);
        return Err(BudgetedError::new(
            AppError::TooManyAttempts("Too many attempts".to_string()),
            0,
        ));
    }
    let remaining = decision.remaining;

    let dto: LinkMutationDto = serde_json::from_slice(&body).map_err(|e| {
        debug!("Unreadable link submission from {}: {}", client, e);
        BudgetedError::new(
            AppError::Validation("Invalid request body".to_string()),
            remaining,
        )
    })?;

    let (action, short_code) = links
        .upsert_for_customer(dto)
        .await
        .map_err(|e| BudgetedError::new(e, remaining))?;

    let mut response = match action {
        UpsertAction::Created => HttpResponse::Created(),
        UpsertAction::Updated => HttpResponse::Ok(),
    };
    Ok(response.json(json!({
        "success": true,
        "action": action,
        "shortCode": short_code,
        "remaining": remaining,
    })))
}
