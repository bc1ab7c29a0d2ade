use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sns_service::handlers::{self, health::HealthState};
use sns_service::storage::ObjectStorage;
use sns_service::{middleware, AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// SNS Service
///
/// Serves the `/api` JSON endpoints plus `/health`, `/health/ready` and
/// `/metrics`. Configuration comes from the environment (see `config.rs`).
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Local development convenience; absent in deployed environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            anyhow::bail!("failed to load configuration: {e}");
        }
    };

    tracing::info!("Starting sns-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let verifier = Arc::new(
        config
            .auth
            .verifier()
            .map_err(anyhow::Error::msg)
            .context("failed to initialize token verifier")?,
    );
    tracing::info!(verifier = ?verifier, "token verification configured");

    config.database.pool.log_config();
    let db_pool = db_pool::create_pool(config.database.pool.clone())
        .await
        .context("failed to create database pool")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("failed to run database migrations")?;
        tracing::info!("database migrations applied");
    }

    let storage: Arc<dyn ObjectStorage> = Arc::new(s3_utils::connect(config.storage.clone()).await);

    let app_state = web::Data::new(AppState::postgres(
        db_pool.clone(),
        storage.clone(),
        config.upload,
    ));
    let health_state = web::Data::new(HealthState::new(db_pool, storage));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let verifier = verifier.clone();
        App::new()
            .app_data(app_state.clone())
            .app_data(health_state.clone())
            .wrap(middleware::MetricsMiddleware)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(sns_service::metrics::serve_metrics))
            .route("/health", web::get().to(handlers::health::liveness))
            .route("/health/ready", web::get().to(handlers::health::readiness))
            .configure(move |cfg| handlers::configure_routes(cfg, verifier))
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {bind_address}"))?
    .shutdown_timeout(30)
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("sns-service shut down");
    Ok(())
}

/// `LOG_FORMAT=json` switches to structured output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
