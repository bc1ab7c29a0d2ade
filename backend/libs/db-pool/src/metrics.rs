//! Pool gauges and acquisition metrics

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use std::time::Instant;

lazy_static::lazy_static! {
    static ref POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "sns_db_pool_connections",
        "Pool connections by state (idle, in_use, max)",
        &["service", "state"]
    ).expect("sns_db_pool_connections registers once");

    static ref ACQUIRE_SECONDS: HistogramVec = register_histogram_vec!(
        "sns_db_pool_acquire_seconds",
        "Latency of explicit connection checkouts",
        &["service"],
        vec![0.001, 0.005, 0.025, 0.1, 0.5, 2.0, 10.0]
    ).expect("sns_db_pool_acquire_seconds registers once");

    static ref ACQUIRE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "sns_db_pool_acquire_failures_total",
        "Failed connection checkouts by reason",
        &["service", "reason"]
    ).expect("sns_db_pool_acquire_failures_total registers once");
}

/// Point-in-time view of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolSnapshot {
    pub idle: i64,
    pub in_use: i64,
    pub max: i64,
}

impl PoolSnapshot {
    pub fn of(pool: &PgPool) -> Self {
        Self::from_counts(
            pool.size(),
            pool.num_idle(),
            pool.options().get_max_connections(),
        )
    }

    fn from_counts(size: u32, idle: usize, max: u32) -> Self {
        let idle = idle as i64;
        Self {
            idle,
            in_use: (size as i64 - idle).max(0),
            max: max as i64,
        }
    }
}

pub(crate) fn publish_snapshot(pool: &PgPool, service: &str) {
    let snapshot = PoolSnapshot::of(pool);
    for (state, value) in [
        ("idle", snapshot.idle),
        ("in_use", snapshot.in_use),
        ("max", snapshot.max),
    ] {
        POOL_CONNECTIONS
            .with_label_values(&[service, state])
            .set(value);
    }
}

fn failure_reason(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "timeout",
        sqlx::Error::PoolClosed => "closed",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "network",
        _ => "other",
    }
}

/// Check a connection out of the pool, timing it.
///
/// Readiness probes use this so a saturated pool shows up as a failed check
/// and in `sns_db_pool_acquire_failures_total`.
pub async fn acquire_with_metrics(
    pool: &PgPool,
    service: &str,
) -> Result<PoolConnection<Postgres>, sqlx::Error> {
    let started = Instant::now();
    let checkout = pool.acquire().await;
    ACQUIRE_SECONDS
        .with_label_values(&[service])
        .observe(started.elapsed().as_secs_f64());

    checkout.map_err(|err| {
        ACQUIRE_FAILURES
            .with_label_values(&[service, failure_reason(&err)])
            .inc();
        err
    })
}
