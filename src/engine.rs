//! # Content Engine
//! One pipeline for every tier: route a topic, pick the tier profile, plan the
//! article shape and project its revenue.
//!
//! No I/O. Generation and publishing live outside this crate; the engine only
//! decides *how much* article a topic deserves and what it is expected to earn.

use chrono::{Datelike, NaiveDateTime};
use metrics::counter;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::decision::{RoutingDecision, Tier};
use crate::revenue::{ArticleMetrics, RevenueEstimate, RevenueEstimator};
use crate::router::Router;
use crate::topic::{TopicRecord, TopicSelector};

/// Most affiliate links an article may carry.
pub const MAX_AFFILIATE_LINKS: u32 = 3;

/// Article shape produced by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProfile {
    pub word_count: u32,
    pub images: u32,
    pub affiliate_links: u32,
    pub audio: bool,
    pub video: bool,
    pub table_of_contents: bool,
}

impl TierProfile {
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Basic => Self {
                word_count: 1000,
                images: 2,
                affiliate_links: 1,
                audio: false,
                video: false,
                table_of_contents: true,
            },
            Tier::Enhanced => Self {
                word_count: 1800,
                images: 4,
                affiliate_links: 3,
                audio: true,
                video: false,
                table_of_contents: true,
            },
            Tier::Enterprise => Self {
                word_count: 2500,
                images: 6,
                affiliate_links: 3,
                audio: true,
                video: true,
                table_of_contents: true,
            },
        }
    }

    /// Projected metrics; affiliate links are capped.
    pub fn metrics(&self) -> ArticleMetrics {
        ArticleMetrics {
            word_count: self.word_count,
            images_count: self.images,
            affiliate_links_count: self.affiliate_links.min(MAX_AFFILIATE_LINKS),
            has_audio: self.audio,
            has_video: self.video,
            has_table_of_contents: self.table_of_contents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub language: String,
    pub country: String,
    /// Skip the router's tier and always use this one.
    pub force_tier: Option<Tier>,
    pub basic: TierProfile,
    pub enhanced: TierProfile,
    pub enterprise: TierProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            country: "US".to_string(),
            force_tier: None,
            basic: TierProfile::for_tier(Tier::Basic),
            enhanced: TierProfile::for_tier(Tier::Enhanced),
            enterprise: TierProfile::for_tier(Tier::Enterprise),
        }
    }
}

impl EngineConfig {
    pub fn profile(&self, tier: Tier) -> &TierProfile {
        match tier {
            Tier::Basic => &self.basic,
            Tier::Enhanced => &self.enhanced,
            Tier::Enterprise => &self.enterprise,
        }
    }
}

/// Everything known about one topic after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub topic: TopicRecord,
    pub decision: RoutingDecision,
    pub tier: Tier,
    pub metrics: ArticleMetrics,
    pub revenue: RevenueEstimate,
    pub language: String,
    pub country: String,
    pub generated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    router: Router,
    estimator: RevenueEstimator,
    cfg: EngineConfig,
}

impl Engine {
    pub fn new(router: Router, estimator: RevenueEstimator, cfg: EngineConfig) -> Self {
        Self {
            router,
            estimator,
            cfg,
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn estimator(&self) -> &RevenueEstimator {
        &self.estimator
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Route → tier → plan → estimate for one topic.
    pub fn run_once(&self, topic: TopicRecord, now: NaiveDateTime) -> PipelineReport {
        let decision = self.router.route_record(&topic, now);
        let tier = self.cfg.force_tier.unwrap_or_else(|| decision.tier());
        let metrics = self.cfg.profile(tier).metrics();
        let revenue = self.estimator.estimate_category(
            &metrics,
            topic.category,
            &self.cfg.language,
            &self.cfg.country,
        );

        counter!("pipeline_runs_total", "tier" => tier.to_string()).increment(1);
        info!(
            target: "engine",
            topic = %topic.topic,
            category = %topic.category,
            score = decision.score,
            %tier,
            monthly = revenue.monthly,
            "pipeline run"
        );

        PipelineReport {
            topic,
            decision,
            tier,
            metrics,
            revenue,
            language: self.cfg.language.clone(),
            country: self.cfg.country.clone(),
            generated_at: now,
        }
    }

    /// Pick a topic first, then run.
    pub fn run_with_selector<R: Rng + ?Sized>(
        &self,
        selector: &TopicSelector,
        rng: &mut R,
        now: NaiveDateTime,
    ) -> PipelineReport {
        let topic = selector.pick(rng, now.year());
        self.run_once(topic, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::decision::Target;
    use chrono::NaiveDate;

    fn tuesday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn saturday_night() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap()
    }

    #[test]
    fn enhanced_topic_gets_enhanced_profile() {
        let e = Engine::default();
        let r = e.run_once(
            TopicRecord::new("Stock Market Investing Basics", Category::Finance, 3.1),
            tuesday_morning(),
        );
        assert_eq!(r.decision.target, Target::Enhanced);
        assert_eq!(r.tier, Tier::Enhanced);
        assert_eq!(r.metrics.word_count, 1800);
        assert!(r.metrics.has_audio);
    }

    #[test]
    fn basic_topic_gets_basic_profile() {
        let e = Engine::default();
        let r = e.run_once(
            TopicRecord::new("Cats", Category::Lifestyle, 1.5),
            saturday_night(),
        );
        assert_eq!(r.tier, Tier::Basic);
        assert_eq!(r.metrics, TierProfile::for_tier(Tier::Basic).metrics());
    }

    #[test]
    fn force_tier_overrides_router() {
        let cfg = EngineConfig {
            force_tier: Some(Tier::Enterprise),
            ..EngineConfig::default()
        };
        let e = Engine::new(Router::default(), RevenueEstimator::default(), cfg);
        let r = e.run_once(TopicRecord::new("Cats", Category::Lifestyle, 1.5), saturday_night());
        assert_eq!(r.decision.target, Target::Basic);
        assert_eq!(r.tier, Tier::Enterprise);
        assert!(r.metrics.has_video);
    }

    #[test]
    fn affiliate_links_are_capped() {
        let p = TierProfile {
            affiliate_links: 10,
            ..TierProfile::for_tier(Tier::Enhanced)
        };
        assert_eq!(p.metrics().affiliate_links_count, MAX_AFFILIATE_LINKS);
    }

    #[test]
    fn richer_tiers_never_earn_less() {
        let e = Engine::default();
        let est = |tier| {
            e.estimator()
                .estimate_category(&TierProfile::for_tier(tier).metrics(), Category::Business, "en", "US")
                .monthly
        };
        assert!(est(Tier::Basic) <= est(Tier::Enhanced));
        assert!(est(Tier::Enhanced) <= est(Tier::Enterprise));
    }
}
