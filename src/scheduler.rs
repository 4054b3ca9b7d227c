// src/scheduler.rs
//! Interval loop: pick a topic, run the engine, record (and optionally export)
//! the report. Replaces the cron-style "run every N minutes" controller loop.

use metrics::{counter, gauge};
use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::engine::{Engine, PipelineReport};
use crate::export;
use crate::history::History;
use crate::router::Clock;
use crate::topic::TopicSelector;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerCfg {
    /// Seconds between runs; `None` means run once and exit.
    pub interval_secs: Option<u64>,
    /// Stop after this many runs (unbounded when `None`).
    pub max_runs: Option<u64>,
    /// Fixed RNG seed for reproducible topic picks.
    pub seed: Option<u64>,
}

/// Shared pieces every tick needs.
#[derive(Clone)]
pub struct SchedulerCtx {
    pub engine: Arc<Engine>,
    pub selector: Arc<TopicSelector>,
    pub history: Arc<History>,
    pub clock: Arc<dyn Clock>,
    pub export_dir: Option<PathBuf>,
}

impl SchedulerCtx {
    /// One run: select, route, estimate, record, export.
    pub fn tick(&self, rng: &mut StdRng) -> PipelineReport {
        let now = self.clock.now();
        let report = self.engine.run_with_selector(&self.selector, rng, now);

        if let Some(dir) = &self.export_dir {
            if let Err(e) = export::export_report(dir, &report) {
                counter!("export_errors_total").increment(1);
                warn!(target: "scheduler", error = ?e, "export failed");
            }
        }

        self.history.push(report.clone());
        report
    }
}

/// Seeded when `seed` is set, OS entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Unix seconds for a local wall-clock time. Falls back to the current instant
/// when the local time does not exist (DST gap).
pub fn unix_seconds(local: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|t| t.timestamp())
        .unwrap_or_else(|| Utc::now().timestamp())
}

/// Run ticks every `interval_secs` until `max_runs` is reached (forever if unset).
/// Returns the number of completed runs.
pub async fn run_scheduled(ctx: SchedulerCtx, cfg: SchedulerCfg) -> u64 {
    let mut rng = make_rng(cfg.seed);
    let period = Duration::from_secs(cfg.interval_secs.unwrap_or(60).max(1));
    let mut ticker = tokio::time::interval(period);
    let mut runs = 0u64;

    loop {
        if cfg.max_runs.is_some_and(|max| runs >= max) {
            break;
        }
        ticker.tick().await;

        let report = ctx.tick(&mut rng);
        runs += 1;

        counter!("scheduler_ticks_total").increment(1);
        gauge!("scheduler_last_run_ts").set(unix_seconds(report.generated_at) as f64);

        let stats = ctx.history.stats();
        info!(
            target: "scheduler",
            run = runs,
            topic = %report.topic.topic,
            tier = %report.tier,
            monthly = report.revenue.monthly,
            total_articles = stats.total_articles,
            total_monthly = stats.total_monthly_estimate,
            "scheduled tick"
        );
    }
    runs
}

/// Spawn [`run_scheduled`] on the current runtime.
pub fn spawn_scheduler(ctx: SchedulerCtx, cfg: SchedulerCfg) -> JoinHandle<u64> {
    tokio::spawn(run_scheduled(ctx, cfg))
}
