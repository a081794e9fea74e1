use std::sync::Arc;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use log::{error, warn};

use crate::errors::AppError;
use crate::services::CredentialVerifier;

pub const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

/// Extractor that only succeeds for requests carrying a valid admin secret
#[derive(Debug)]
pub struct AdminGuard;

impl FromRequest for AdminGuard {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<AdminGuard, AppError> {
    let Some(verifier) = req.app_data::<web::Data<Arc<dyn CredentialVerifier>>>() else {
        error!("No credential verifier registered");
        return Err(AppError::Config(
            "Credential verifier not configured".to_string(),
        ));
    };

    let secret = req
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if verifier.verify(secret) {
        Ok(AdminGuard)
    } else {
        warn!("Rejected admin request to {}", req.path());
        Err(AppError::Unauthorized("Unauthorized".to_string()))
    }
}
