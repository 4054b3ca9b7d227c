// tests/pipeline_e2e.rs
//
// Select → route → plan → estimate → history → export, all in-process.

use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use std::fs;

use profit_router::export::{export_history, export_report};
use profit_router::topic::TopicEntry;
use profit_router::{
    Category, Engine, EngineConfig, History, RevenueEstimator, Router, Target, Tier, TierProfile,
    TopicRecord, TopicSelector,
};

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
fn report_tier_follows_routing_decision() {
    let engine = Engine::default();
    let sel = TopicSelector::default();
    let mut rng = StdRng::seed_from_u64(2024);

    for now in [tuesday_morning(), saturday_night()] {
        for _ in 0..50 {
            let r = engine.run_with_selector(&sel, &mut rng, now);
            assert_eq!(r.tier, Tier::from(r.decision.target));
            assert_eq!(r.metrics, TierProfile::for_tier(r.tier).metrics());
            assert_eq!(r.generated_at, now);
            assert!(r.revenue.monthly > 0.0);
        }
    }
}

#[test]
fn year_comes_from_the_clock() {
    let engine = Engine::default();
    let sel = TopicSelector::with_topics(vec![TopicEntry {
        topic: "Passive Income Strategies for {year}".into(),
        category: "business".into(),
    }]);
    let mut rng = StdRng::seed_from_u64(5);
    let found = (0..40)
        .map(|_| engine.run_with_selector(&sel, &mut rng, tuesday_morning()))
        .any(|r| r.topic.topic == "Passive Income Strategies for 2024");
    assert!(found);
}

#[test]
fn german_market_uses_german_cpc() {
    let cfg = EngineConfig {
        language: "de".into(),
        country: "CH".into(),
        ..EngineConfig::default()
    };
    let engine = Engine::new(Router::default(), RevenueEstimator::default(), cfg);
    let us = Engine::default();

    let topic = TopicRecord::new("Cloud Computing Basics", Category::Technology, 2.0);
    let de = engine.run_once(topic.clone(), tuesday_morning());
    let en = us.run_once(topic, tuesday_morning());

    assert_eq!(de.country, "CH");
    assert!(de.revenue.cpc < en.revenue.cpc);
}

#[test]
fn history_and_exports_round_out_a_batch() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::default();
    let history = History::with_capacity(100);

    let topics = [
        ("How to Make Money Online Fast Today", Category::Finance),
        ("Cats", Category::Lifestyle),
        ("Mental Health at Work", Category::Health),
    ];
    for (t, c) in topics {
        let report = engine.run_once(TopicRecord::new(t, c, 2.0), saturday_night());
        let path = export_report(dir.path(), &report).unwrap();

        let v: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["routing"]["topic"], t);
        assert_eq!(v["routing"]["category"], c.as_str());
        assert_eq!(v["routing"]["target"], report.decision.target.as_str());
        for key in ["monthly", "weekly", "daily", "cpc", "traffic", "quality_score"] {
            assert!(v["revenue"].get(key).is_some(), "missing revenue.{key}");
        }

        history.push(report);
    }

    let stats = history.stats();
    assert_eq!(stats.total_articles, 3);
    // Saturday night: only finance (10) clears the threshold
    assert!((stats.enhanced_share - 1.0 / 3.0).abs() < 1e-9);

    let hist_path = export_history(dir.path(), &history).unwrap();
    let v: Value = serde_json::from_str(&fs::read_to_string(hist_path).unwrap()).unwrap();
    assert_eq!(v["stats"]["total_articles"], 3);
    assert_eq!(v["stats"]["per_category"]["finance"], 1);
    assert_eq!(v["reports"].as_array().unwrap().len(), 3);
    assert_eq!(v["reports"][0]["decision"]["target"], Target::Enhanced.as_str());
}
