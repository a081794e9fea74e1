mod admin_auth;
mod request_logger;

pub use admin_auth::{AdminGuard, ADMIN_PASSWORD_HEADER};
pub use request_logger::RequestLogger;
