//! # Topic Router
//! Pure scoring that maps `(topic, category, now)` → [`RoutingDecision`].
//!
//! Score = category base (default 5) + topic length bonus (+2 for more than 8
//! words, otherwise +1 for more than 5) + business hours bonus (+1, 9–17)
//! + early-week bonus (+1, Mon/Tue/Wed). A total at or above the threshold
//! (8) routes to `enhanced`, anything below to `basic`.
//!
//! The wall clock is injected, either directly as a `NaiveDateTime` or through
//! a [`Clock`], so every decision is reproducible in tests.

use chrono::{Datelike, Local, NaiveDateTime, Timelike, Weekday};
use metrics::counter;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::category::Category;
use crate::decision::{Reason, ReasonKind, RoutingDecision, Target};
use crate::topic::TopicRecord;

/// Source of "now" for routing.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Tunable routing weights. Every field has a default, so a partial TOML
/// table (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Base score per category name (lowercase).
    pub base_scores: HashMap<String, f64>,
    /// Base score for categories without an entry.
    pub default_base: f64,
    pub threshold: f64,
    pub long_topic_words: usize,
    pub long_topic_bonus: f64,
    pub medium_topic_words: usize,
    pub medium_topic_bonus: f64,
    /// Inclusive hour window.
    pub business_hours_start: u32,
    pub business_hours_end: u32,
    pub business_hours_bonus: f64,
    pub early_week_bonus: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let base_scores = [
            ("finance", 10.0),
            ("business", 9.0),
            ("technology", 8.0),
            ("health", 7.0),
            ("education", 6.0),
            ("lifestyle", 5.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            base_scores,
            default_base: 5.0,
            threshold: 8.0,
            long_topic_words: 8,
            long_topic_bonus: 2.0,
            medium_topic_words: 5,
            medium_topic_bonus: 1.0,
            business_hours_start: 9,
            business_hours_end: 17,
            business_hours_bonus: 1.0,
            early_week_bonus: 1.0,
        }
    }
}

impl RouterConfig {
    /// Replace values that would make routing meaningless with defaults.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();

        if !self.threshold.is_finite() {
            warn!(target: "router", threshold = self.threshold, "non-finite threshold, using default");
            self.threshold = d.threshold;
        }
        if !self.default_base.is_finite() {
            warn!(target: "router", "non-finite default_base, using default");
            self.default_base = d.default_base;
        }
        for (field, default) in [
            (&mut self.long_topic_bonus, d.long_topic_bonus),
            (&mut self.medium_topic_bonus, d.medium_topic_bonus),
            (&mut self.business_hours_bonus, d.business_hours_bonus),
            (&mut self.early_week_bonus, d.early_week_bonus),
        ] {
            if !(field.is_finite() && *field >= 0.0) {
                warn!(target: "router", value = *field, "negative or non-finite bonus, using default");
                *field = default;
            }
        }
        self.base_scores.retain(|k, v| {
            let keep = v.is_finite();
            if !keep {
                warn!(target: "router", category = %k, "dropping non-finite base score");
            }
            keep
        });
        self.base_scores = self
            .base_scores
            .into_iter()
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v))
            .collect();

        if self.business_hours_start > 23 || self.business_hours_end > 23 {
            warn!(target: "router", "business hours out of range, using default window");
            self.business_hours_start = d.business_hours_start;
            self.business_hours_end = d.business_hours_end;
        }
        if self.business_hours_start > self.business_hours_end {
            std::mem::swap(&mut self.business_hours_start, &mut self.business_hours_end);
        }
        if self.medium_topic_words > self.long_topic_words {
            std::mem::swap(&mut self.medium_topic_words, &mut self.long_topic_words);
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Router {
    cfg: RouterConfig,
}

static DEFAULT_ROUTER: Lazy<Router> = Lazy::new(Router::default);

/// Route with the default weights.
pub fn route(topic: &str, category: &str, now: NaiveDateTime) -> RoutingDecision {
    DEFAULT_ROUTER.route(topic, category, now)
}

impl Router {
    pub fn new(cfg: RouterConfig) -> Self {
        Self {
            cfg: cfg.sanitized(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.cfg
    }

    /// Base score for a category, falling back to `default_base`.
    pub fn base_score(&self, category: Category) -> f64 {
        self.cfg
            .base_scores
            .get(category.as_str())
            .copied()
            .unwrap_or(self.cfg.default_base)
    }

    /// Route a raw category string. Unknown categories use the default base.
    pub fn route(&self, topic: &str, category: &str, now: NaiveDateTime) -> RoutingDecision {
        self.route_category(topic, Category::parse(category), now)
    }

    pub fn route_record(&self, record: &TopicRecord, now: NaiveDateTime) -> RoutingDecision {
        self.route_category(&record.topic, record.category, now)
    }

    pub fn route_with_clock(
        &self,
        topic: &str,
        category: &str,
        clock: &dyn Clock,
    ) -> RoutingDecision {
        self.route(topic, category, clock.now())
    }

    pub fn route_category(
        &self,
        topic: &str,
        category: Category,
        now: NaiveDateTime,
    ) -> RoutingDecision {
        let cfg = &self.cfg;
        let mut reasons = Vec::with_capacity(5);

        let base = self.base_score(category);
        let mut score = base;
        reasons.push(Reason::new(
            ReasonKind::Category,
            base,
            format!("category {category} base {base}"),
        ));

        let words = topic.split_whitespace().count();
        let length_bonus = if words > cfg.long_topic_words {
            cfg.long_topic_bonus
        } else if words > cfg.medium_topic_words {
            cfg.medium_topic_bonus
        } else {
            0.0
        };
        if length_bonus > 0.0 {
            score += length_bonus;
            reasons.push(Reason::new(
                ReasonKind::TopicLength,
                length_bonus,
                format!("topic has {words} words (+{length_bonus})"),
            ));
        }

        let hour = now.hour();
        if (cfg.business_hours_start..=cfg.business_hours_end).contains(&hour) {
            score += cfg.business_hours_bonus;
            reasons.push(Reason::new(
                ReasonKind::BusinessHours,
                cfg.business_hours_bonus,
                format!("hour {hour} within business hours (+{})", cfg.business_hours_bonus),
            ));
        }

        let weekday = now.weekday();
        if matches!(weekday, Weekday::Mon | Weekday::Tue | Weekday::Wed) {
            score += cfg.early_week_bonus;
            reasons.push(Reason::new(
                ReasonKind::Weekday,
                cfg.early_week_bonus,
                format!("{weekday} is early week (+{})", cfg.early_week_bonus),
            ));
        }

        let target = if score >= cfg.threshold {
            Target::Enhanced
        } else {
            Target::Basic
        };
        reasons.push(Reason::new(
            ReasonKind::Threshold,
            0.0,
            format!("score {score} vs threshold {} -> {target}", cfg.threshold),
        ));

        counter!("router_decisions_total", "target" => target.as_str()).increment(1);
        debug!(target: "router", %category, words, hour, %weekday, score, %target, "routed topic");

        RoutingDecision {
            target,
            score,
            reasons,
        }
    }
}
