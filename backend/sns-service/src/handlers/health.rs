/// Liveness and readiness probes
use crate::config::SERVICE_NAME;
use crate::storage::ObjectStorage;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

pub struct HealthState {
    db_pool: PgPool,
    storage: Arc<dyn ObjectStorage>,
}

impl HealthState {
    pub fn new(db_pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { db_pool, storage }
    }

    async fn check_postgres(&self) -> Result<(), String> {
        let mut conn = db_pool::acquire_with_metrics(&self.db_pool, SERVICE_NAME)
            .await
            .map_err(|e| e.to_string())?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn check_storage(&self) -> Result<(), String> {
        self.storage.health_check().await.map_err(|e| e.to_string())
    }
}

#[derive(Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

impl ComponentCheck {
    fn from_result(result: Result<(), String>, started: Instant, ok_message: &str) -> Self {
        let latency_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => Self {
                status: ComponentStatus::Healthy,
                message: ok_message.to_string(),
                latency_ms,
            },
            Err(message) => Self {
                status: ComponentStatus::Unhealthy,
                message,
                latency_ms,
            },
        }
    }
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    checks: HashMap<&'static str, ComponentCheck>,
    timestamp: String,
}

/// GET /health
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health/ready
pub async fn readiness(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let started = Instant::now();
    let postgres = state.check_postgres().await;
    checks.insert(
        "postgresql",
        ComponentCheck::from_result(postgres, started, "PostgreSQL connection successful"),
    );

    let started = Instant::now();
    let storage = state.check_storage().await;
    checks.insert(
        "object_storage",
        ComponentCheck::from_result(storage, started, "Bucket reachable"),
    );

    let ready = checks
        .values()
        .all(|check| check.status == ComponentStatus::Healthy);
    let response = ReadinessResponse {
        ready,
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        tracing::warn!("readiness check failed");
        HttpResponse::ServiceUnavailable().json(response)
    }
}
