use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::db::{Database, DatabaseHealth};

#[derive(Serialize, Deserialize)]
pub struct ResponsePayload {
    pub status: i32,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub db_health: DatabaseHealth,
    pub uptime_seconds: u64,
}

// Shared state for the system routes
pub struct AppState {
    pub start_time: Instant,
    pub db: Database,
    pub version: String,
}
