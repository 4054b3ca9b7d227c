//! # Revenue Estimator
//!
//! Synthetic ad-revenue projection for a single article.
//!
//! ```text
//! final_cpc = base_cpc(lang, country) × category × words × images × affiliate × quality
//! quality   = min(10, (words + images + affiliate) × 3)
//! traffic   = bracket midpoint selected by quality
//! monthly   = traffic × CTR(0.03) × final_cpc × 30
//! ```
//!
//! Every lookup has a default, so estimation never fails. Traffic uses fixed
//! bracket midpoints; there is no randomness anywhere in this module.
//! Rounding (2 decimals for money, 1 for the quality score) is applied to the
//! output only.

use metrics::histogram;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::category::Category;

/// Assumed click-through rate.
pub const CTR: f64 = 0.03;
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Content features that drive the multipliers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleMetrics {
    pub word_count: u32,
    pub images_count: u32,
    pub affiliate_links_count: u32,
    pub has_audio: bool,
    pub has_video: bool,
    pub has_table_of_contents: bool,
}

/// Per-factor multipliers, reported alongside the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub category: f64,
    pub words: f64,
    pub images: f64,
    pub affiliate: f64,
    pub quality: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueEstimate {
    pub monthly: f64,
    pub weekly: f64,
    pub daily: f64,
    pub cpc: f64,
    pub traffic: u64,
    pub quality_score: f64,
    pub multipliers: Multipliers,
}

/// One traffic bracket: applies when `quality_score >= min_quality`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficBracket {
    pub min_quality: f64,
    pub low: u64,
    pub high: u64,
}

impl TrafficBracket {
    /// Rounds down; never overflows, even at `u64::MAX`.
    pub fn midpoint(&self) -> u64 {
        self.low / 2 + self.high / 2 + (self.low % 2 + self.high % 2) / 2
    }
}

/// Lookup tables and step sizes. Partial TOML tables fall back to defaults
/// field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueTables {
    /// language → country → base CPC.
    pub cpc_rates: HashMap<String, HashMap<String, f64>>,
    pub default_cpc: f64,
    pub category_multipliers: HashMap<String, f64>,
    pub default_category_multiplier: f64,
    pub words_per_unit: f64,
    pub word_multiplier_min: f64,
    pub word_multiplier_max: f64,
    pub per_image: f64,
    pub per_affiliate_link: f64,
    pub audio_bonus: f64,
    pub video_bonus: f64,
    pub toc_bonus: f64,
    /// Checked from the highest `min_quality` down.
    pub traffic_brackets: Vec<TrafficBracket>,
    pub fallback_traffic: u64,
}

impl Default for RevenueTables {
    fn default() -> Self {
        let mut cpc_rates: HashMap<String, HashMap<String, f64>> = HashMap::new();
        for (lang, rows) in [
            ("en", &[("US", 2.50), ("UK", 2.00), ("CA", 1.80), ("AU", 1.70)][..]),
            ("de", &[("DE", 1.80), ("AT", 1.60), ("CH", 2.20)][..]),
            ("fr", &[("FR", 1.50), ("BE", 1.30), ("CH", 1.80), ("CA", 1.40)][..]),
            ("es", &[("ES", 1.20), ("MX", 0.80), ("AR", 0.60), ("CO", 0.70)][..]),
        ] {
            cpc_rates.insert(
                lang.to_string(),
                rows.iter().map(|(c, v)| (c.to_string(), *v)).collect(),
            );
        }

        let category_multipliers = [
            ("technology", 1.5),
            ("business", 1.3),
            ("finance", 1.4),
            ("health", 1.2),
            ("education", 1.1),
            ("lifestyle", 1.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            cpc_rates,
            default_cpc: 1.0,
            category_multipliers,
            default_category_multiplier: 1.0,
            words_per_unit: 1000.0,
            word_multiplier_min: 0.8,
            word_multiplier_max: 1.5,
            per_image: 0.05,
            per_affiliate_link: 0.1,
            audio_bonus: 0.1,
            video_bonus: 0.15,
            toc_bonus: 0.05,
            traffic_brackets: vec![
                TrafficBracket { min_quality: 9.0, low: 10_000, high: 50_000 },
                TrafficBracket { min_quality: 7.0, low: 5_000, high: 20_000 },
                TrafficBracket { min_quality: 5.0, low: 2_000, high: 8_000 },
                TrafficBracket { min_quality: 3.0, low: 1_000, high: 3_000 },
            ],
            fallback_traffic: 1_000,
        }
    }
}

impl RevenueTables {
    /// Drop negative or non-finite rates, fix inverted clamps, and sort the
    /// brackets so the first match is the highest one.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        // Lookups are `language` lowercase, `country` uppercase.
        let mut cpc_rates: HashMap<String, HashMap<String, f64>> = HashMap::new();
        for (lang, rows) in std::mem::take(&mut self.cpc_rates) {
            let entry = cpc_rates.entry(lang.trim().to_ascii_lowercase()).or_default();
            for (country, v) in rows {
                if v.is_finite() && v >= 0.0 {
                    entry.insert(country.trim().to_ascii_uppercase(), v);
                } else {
                    warn!(target: "revenue", language = %lang, country = %country, "dropping invalid cpc rate");
                }
            }
        }
        self.cpc_rates = cpc_rates;
        self.category_multipliers
            .retain(|_, v| v.is_finite() && *v >= 0.0);
        self.category_multipliers = self
            .category_multipliers
            .into_iter()
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v))
            .collect();

        if !(self.words_per_unit.is_finite() && self.words_per_unit > 0.0) {
            warn!(target: "revenue", "invalid words_per_unit, using default");
            self.words_per_unit = d.words_per_unit;
        }
        for (field, default) in [
            (&mut self.word_multiplier_min, d.word_multiplier_min),
            (&mut self.word_multiplier_max, d.word_multiplier_max),
        ] {
            if !field.is_finite() {
                warn!(target: "revenue", value = *field, "non-finite word multiplier bound, using default");
                *field = default;
            }
        }
        if self.word_multiplier_min > self.word_multiplier_max {
            std::mem::swap(&mut self.word_multiplier_min, &mut self.word_multiplier_max);
        }
        for (field, default) in [
            (&mut self.default_cpc, d.default_cpc),
            (&mut self.default_category_multiplier, d.default_category_multiplier),
            (&mut self.per_image, d.per_image),
            (&mut self.per_affiliate_link, d.per_affiliate_link),
            (&mut self.audio_bonus, d.audio_bonus),
            (&mut self.video_bonus, d.video_bonus),
            (&mut self.toc_bonus, d.toc_bonus),
        ] {
            if !(field.is_finite() && *field >= 0.0) {
                warn!(target: "revenue", value = *field, "negative or non-finite rate, using default");
                *field = default;
            }
        }

        self.traffic_brackets
            .retain(|b| b.min_quality.is_finite() && b.low <= b.high);
        self.traffic_brackets
            .sort_by(|a, b| b.min_quality.total_cmp(&a.min_quality));
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RevenueEstimator {
    tables: RevenueTables,
}

static DEFAULT_ESTIMATOR: Lazy<RevenueEstimator> = Lazy::new(RevenueEstimator::default);

/// Estimate with the default tables.
pub fn estimate(
    metrics: &ArticleMetrics,
    category: &str,
    language: &str,
    country: &str,
) -> RevenueEstimate {
    DEFAULT_ESTIMATOR.estimate(metrics, category, language, country)
}

impl RevenueEstimator {
    pub fn new(tables: RevenueTables) -> Self {
        Self {
            tables: tables.sanitized(),
        }
    }

    pub fn tables(&self) -> &RevenueTables {
        &self.tables
    }

    /// Base CPC for `(language, country)`; default when either is unknown.
    pub fn base_cpc(&self, language: &str, country: &str) -> f64 {
        self.tables
            .cpc_rates
            .get(&language.trim().to_ascii_lowercase())
            .and_then(|rows| rows.get(&country.trim().to_ascii_uppercase()))
            .copied()
            .unwrap_or(self.tables.default_cpc)
    }

    pub fn category_multiplier(&self, category: Category) -> f64 {
        self.tables
            .category_multipliers
            .get(category.as_str())
            .copied()
            .unwrap_or(self.tables.default_category_multiplier)
    }

    pub fn word_multiplier(&self, word_count: u32) -> f64 {
        let t = &self.tables;
        (f64::from(word_count) / t.words_per_unit).clamp(t.word_multiplier_min, t.word_multiplier_max)
    }

    pub fn quality_multiplier(&self, m: &ArticleMetrics) -> f64 {
        let t = &self.tables;
        let mut q = 1.0;
        if m.has_audio {
            q += t.audio_bonus;
        }
        if m.has_video {
            q += t.video_bonus;
        }
        if m.has_table_of_contents {
            q += t.toc_bonus;
        }
        q
    }

    /// Traffic for a (full precision) quality score.
    pub fn traffic_for(&self, quality_score: f64) -> u64 {
        self.tables
            .traffic_brackets
            .iter()
            .find(|b| quality_score >= b.min_quality)
            .map(TrafficBracket::midpoint)
            .unwrap_or(self.tables.fallback_traffic)
    }

    pub fn estimate(
        &self,
        metrics: &ArticleMetrics,
        category: &str,
        language: &str,
        country: &str,
    ) -> RevenueEstimate {
        self.estimate_category(metrics, Category::parse(category), language, country)
    }

    pub fn estimate_category(
        &self,
        metrics: &ArticleMetrics,
        category: Category,
        language: &str,
        country: &str,
    ) -> RevenueEstimate {
        let t = &self.tables;

        let base_cpc = self.base_cpc(language, country);
        let category_mult = self.category_multiplier(category);
        let word_mult = self.word_multiplier(metrics.word_count);
        let image_mult = 1.0 + f64::from(metrics.images_count) * t.per_image;
        let affiliate_mult = 1.0 + f64::from(metrics.affiliate_links_count) * t.per_affiliate_link;
        let quality_mult = self.quality_multiplier(metrics);

        let final_cpc =
            base_cpc * category_mult * word_mult * image_mult * affiliate_mult * quality_mult;

        let quality_score = ((word_mult + image_mult + affiliate_mult) * 3.0).min(10.0);
        let traffic = self.traffic_for(quality_score);

        let monthly = traffic as f64 * CTR * final_cpc * DAYS_PER_MONTH;

        histogram!("revenue_monthly_estimate").record(monthly);
        debug!(
            target: "revenue",
            %category, language, country, base_cpc, final_cpc, quality_score, traffic, monthly,
            "estimated revenue"
        );

        RevenueEstimate {
            monthly: round_to(monthly, 2),
            weekly: round_to(monthly / 4.0, 2),
            daily: round_to(monthly / DAYS_PER_MONTH, 2),
            cpc: round_to(final_cpc, 2),
            traffic,
            quality_score: round_to(quality_score, 1),
            multipliers: Multipliers {
                category: round_to(category_mult, 2),
                words: round_to(word_mult, 2),
                images: round_to(image_mult, 2),
                affiliate: round_to(affiliate_mult, 2),
                quality: round_to(quality_mult, 2),
            },
        }
    }
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    (x * p).round() / p
}
