//! profit-router: binary entrypoint.
//! Loads config, then either runs the pipeline once and prints the report as
//! JSON, or keeps running on an interval when a schedule is configured.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use profit_router::config::AppConfig;
use profit_router::metrics::Metrics;
use profit_router::scheduler::{self, SchedulerCtx};
use profit_router::telemetry::{self, LogFormat};
use profit_router::topic::{load_topics_default, TopicSelector};
use profit_router::{export, History, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    telemetry::init(LogFormat::from_env());

    let metrics = Metrics::init()?;
    let cfg = AppConfig::load_default()?;
    let topics = load_topics_default(cfg.topics_path.as_deref())?;
    info!(target: "profit_router", custom_topics = topics.len(), "starting");

    let ctx = SchedulerCtx {
        engine: Arc::new(cfg.build_engine()),
        selector: Arc::new(TopicSelector::with_topics(topics)),
        history: Arc::new(History::with_capacity(cfg.history_capacity)),
        clock: Arc::new(SystemClock),
        export_dir: cfg.export_dir.clone(),
    };

    if cfg.scheduler.interval_secs.is_some() {
        let runs = scheduler::spawn_scheduler(ctx.clone(), cfg.scheduler.clone()).await?;
        info!(target: "profit_router", runs, "scheduler finished");
        if let Some(dir) = &cfg.export_dir {
            export::export_history(dir, &ctx.history)?;
            metrics.write_to(dir)?;
        }
        println!("{}", serde_json::to_string_pretty(&ctx.history.stats())?);
        return Ok(());
    }

    let mut rng = scheduler::make_rng(cfg.scheduler.seed);
    let report = ctx.tick(&mut rng);
    if let Some(dir) = &cfg.export_dir {
        metrics.write_to(dir)?;
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
