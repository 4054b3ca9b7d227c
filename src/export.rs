// src/export.rs
//! JSON snapshots of pipeline runs under an `exports/` tree.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::category::Category;
use crate::decision::Target;
use crate::engine::PipelineReport;
use crate::history::{History, HistoryStats};

pub const DEFAULT_EXPORT_DIR: &str = "exports";
const SLUG_MAX: usize = 100;

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug regex"));

#[derive(Debug, Serialize)]
struct RoutingSnapshot<'a> {
    topic: &'a str,
    category: Category,
    score: f64,
    target: Target,
}

#[derive(Debug, Serialize)]
struct RevenueSnapshot {
    monthly: f64,
    weekly: f64,
    daily: f64,
    cpc: f64,
    traffic: u64,
    quality_score: f64,
}

#[derive(Debug, Serialize)]
struct ArticleSnapshot<'a> {
    routing: RoutingSnapshot<'a>,
    revenue: RevenueSnapshot,
    generated_at: NaiveDateTime,
}

impl<'a> From<&'a PipelineReport> for ArticleSnapshot<'a> {
    fn from(r: &'a PipelineReport) -> Self {
        Self {
            routing: RoutingSnapshot {
                topic: &r.topic.topic,
                category: r.topic.category,
                score: r.decision.score,
                target: r.decision.target,
            },
            revenue: RevenueSnapshot {
                monthly: r.revenue.monthly,
                weekly: r.revenue.weekly,
                daily: r.revenue.daily,
                cpc: r.revenue.cpc,
                traffic: r.revenue.traffic,
                quality_score: r.revenue.quality_score,
            },
            generated_at: r.generated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct HistorySnapshot {
    stats: HistoryStats,
    reports: Vec<PipelineReport>,
}

/// Lowercase, non-alphanumeric runs → `-`, trimmed, at most 100 chars.
pub fn slugify(topic: &str) -> String {
    let lower = topic.to_lowercase();
    let slug = RE_NON_ALNUM.replace_all(&lower, "-");
    let slug: String = slug.trim_matches('-').chars().take(SLUG_MAX).collect();
    slug.trim_end_matches('-').to_string()
}

/// First 6 bytes of SHA-256 as hex.
pub fn short_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// `<dir>/articles/<slug>-<hash>.json`
pub fn article_path(dir: &Path, topic: &str) -> PathBuf {
    let slug = slugify(topic);
    let name = if slug.is_empty() {
        format!("{}.json", short_hash(topic))
    } else {
        format!("{slug}-{}.json", short_hash(topic))
    };
    dir.join("articles").join(name)
}

/// Write one report snapshot; returns the written path.
pub fn export_report(dir: &Path, report: &PipelineReport) -> Result<PathBuf> {
    let path = article_path(dir, &report.topic.topic);
    let snapshot = ArticleSnapshot::from(report);
    write_json(&path, &snapshot)?;
    info!(target: "export", path = %path.display(), "exported article snapshot");
    Ok(path)
}

/// Write `<dir>/history.json` with all stored reports and their stats.
pub fn export_history(dir: &Path, history: &History) -> Result<PathBuf> {
    let path = dir.join("history.json");
    let snapshot = HistorySnapshot {
        stats: history.stats(),
        reports: history.snapshot_last_n(history.capacity()),
    };
    write_json(&path, &snapshot)?;
    info!(
        target: "export",
        path = %path.display(),
        reports = snapshot.reports.len(),
        "exported history"
    );
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating export dir {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(value).context("serializing export snapshot")?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}
