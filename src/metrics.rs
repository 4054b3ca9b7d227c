// src/metrics.rs
//! Prometheus recorder for the binary. The library only records through the
//! `metrics` facade; installing a recorder is the caller's choice.

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the text exposition dump inside the export dir.
pub const METRICS_FILE: &str = "metrics.prom";

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Repeated calls share the
    /// first handle.
    pub fn init() -> Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| -> Result<PrometheusHandle> {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("prometheus: install recorder")?;
                describe();
                Ok(handle)
            })?
            .clone();
        Ok(Self { handle })
    }

    /// Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write the rendered text to `<dir>/metrics.prom`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating export dir {}", dir.display()))?;
        let path = dir.join(METRICS_FILE);
        fs::write(&path, self.render())
            .with_context(|| format!("writing {}", path.display()))?;
        info!(target: "metrics", path = %path.display(), "metrics written");
        Ok(path)
    }
}

fn describe() {
    describe_counter!("router_decisions_total", "Routing decisions by target.");
    describe_counter!("pipeline_runs_total", "Pipeline runs by tier.");
    describe_histogram!("revenue_monthly_estimate", "Unrounded monthly revenue estimates.");
    describe_counter!("scheduler_ticks_total", "Completed scheduler ticks.");
    describe_gauge!("scheduler_last_run_ts", "Unix seconds of the last scheduled run.");
    describe_counter!("export_errors_total", "Failed report exports.");
}
