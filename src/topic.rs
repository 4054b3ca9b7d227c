// src/topic.rs
//! Topic records, the random topic selector and topic list loading.

use anyhow::{anyhow, Context, Result};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::category::Category;

pub const ENV_TOPICS_PATH: &str = "PROFIT_TOPICS_PATH";

/// Share of picks that come from the high-profit list.
const HIGH_PROFIT_SHARE: f64 = 0.7;
const CPC_MIN: f64 = 1.5;
const CPC_MAX: f64 = 4.0;

const TOPIC_MIN_CHARS: usize = 2;
const TOPIC_MAX_CHARS: usize = 200;

/// A topic to write about. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub topic: String,
    pub category: Category,
    pub estimated_cpc: f64,
}

impl TopicRecord {
    pub fn new(topic: impl Into<String>, category: Category, estimated_cpc: f64) -> Self {
        Self {
            topic: topic.into(),
            category,
            estimated_cpc,
        }
    }
}

/// Checks a topic title: 2..=200 characters after trimming.
pub fn validate_topic(topic: &str) -> Result<()> {
    let n = topic.trim().chars().count();
    if n < TOPIC_MIN_CHARS {
        return Err(anyhow!("topic too short ({n} chars, min {TOPIC_MIN_CHARS})"));
    }
    if n > TOPIC_MAX_CHARS {
        return Err(anyhow!("topic too long ({n} chars, max {TOPIC_MAX_CHARS})"));
    }
    Ok(())
}

const HIGH_PROFIT_TOPICS: &[&str] = &[
    "How to Make Money Online in {year}: Complete Guide",
    "Passive Income Strategies for {year}",
    "Affiliate Marketing: Complete Beginner's Guide",
    "YouTube Monetization Mastery",
    "WordPress Blogging for Profit",
    "Digital Product Creation Guide",
    "Email Marketing for Beginners",
    "Social Media Monetization Strategies",
    "Stock Market Investing Basics",
    "Real Estate Investing Online",
];

const TEMPLATES: &[&str] = &[
    "The Complete Guide to {kw}",
    "{kw}: Everything You Need to Know",
    "How to Master {kw} in {year}",
    "{kw} Best Practices and Strategies",
];

fn default_keywords() -> Vec<(Category, Vec<String>)> {
    let raw: [(Category, &[&str]); 5] = [
        (
            Category::Technology,
            &["AI", "Programming", "Cybersecurity", "Blockchain", "Cloud Computing"],
        ),
        (
            Category::Business,
            &["Marketing", "Entrepreneurship", "Finance", "E-commerce", "Startups"],
        ),
        (
            Category::Finance,
            &["Investing", "Personal Finance", "Cryptocurrency", "Stock Market", "Budgeting"],
        ),
        (
            Category::Health,
            &["Fitness", "Nutrition", "Mental Health", "Wellness", "Medical"],
        ),
        (
            Category::Education,
            &["Online Learning", "Skills Development", "Certifications", "Study Tips"],
        ),
    ];
    raw.into_iter()
        .map(|(c, kws)| (c, kws.iter().map(|s| s.to_string()).collect()))
        .collect()
}

/// Picks topics either from a fixed list or by filling title templates with
/// category keywords.
#[derive(Debug, Clone)]
pub struct TopicSelector {
    /// High-profit titles; `{year}` is substituted at pick time.
    high_profit: Vec<TopicRecordTemplate>,
    keywords: Vec<(Category, Vec<String>)>,
}

#[derive(Debug, Clone)]
struct TopicRecordTemplate {
    title: String,
    category: Category,
}

impl Default for TopicSelector {
    fn default() -> Self {
        Self {
            high_profit: HIGH_PROFIT_TOPICS
                .iter()
                .map(|t| TopicRecordTemplate {
                    title: t.to_string(),
                    category: Category::Business,
                })
                .collect(),
            keywords: default_keywords(),
        }
    }
}

impl TopicSelector {
    /// Selector whose fixed list is replaced by `topics` (keywords keep defaults).
    /// An empty list keeps the built-in titles.
    pub fn with_topics(topics: Vec<TopicEntry>) -> Self {
        let mut sel = Self::default();
        if !topics.is_empty() {
            sel.high_profit = topics
                .into_iter()
                .map(|e| TopicRecordTemplate {
                    title: e.topic,
                    category: Category::parse(&e.category),
                })
                .collect();
        }
        sel
    }

    pub fn len(&self) -> usize {
        self.high_profit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.high_profit.is_empty()
    }

    /// Pick a topic. `year` fills `{year}` placeholders.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R, year: i32) -> TopicRecord {
        let from_list = rng.random::<f64>() < HIGH_PROFIT_SHARE;

        let (topic, category) = match (from_list, self.high_profit.choose(rng)) {
            (true, Some(t)) => (fill(&t.title, None, year), t.category),
            _ => self.templated(rng, year),
        };

        let cpc = rng.random_range(CPC_MIN..=CPC_MAX);
        TopicRecord::new(topic, category, round2(cpc))
    }

    fn templated<R: Rng + ?Sized>(&self, rng: &mut R, year: i32) -> (String, Category) {
        let Some((category, keywords)) = self.keywords.choose(rng) else {
            return ("Online Business Ideas".to_string(), Category::Business);
        };
        let kw = keywords.choose(rng).map(String::as_str).unwrap_or("Business");
        let template = TEMPLATES.choose(rng).copied().unwrap_or(TEMPLATES[0]);
        (fill(template, Some(kw), year), *category)
    }
}

fn fill(template: &str, keyword: Option<&str>, year: i32) -> String {
    let mut s = template.replace("{year}", &year.to_string());
    if let Some(kw) = keyword {
        s = s.replace("{kw}", kw);
    }
    s
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/* ----------------------------
Topic list files (TOML or JSON)
---------------------------- */

/// One entry of a topic list file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicEntry {
    pub topic: String,
    #[serde(default = "default_entry_category")]
    pub category: String,
}

fn default_entry_category() -> String {
    "general".to_string()
}

/// Load a topic list from an explicit path. Supports TOML or JSON.
pub fn load_topics_from(path: &Path) -> Result<Vec<TopicEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading topics from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_topics(&content, ext.as_str())
        .with_context(|| format!("parsing topics from {}", path.display()))
}

/// Load topics using env var + fallbacks:
/// 1) $PROFIT_TOPICS_PATH
/// 2) `fallback` (usually from the config file), if it exists
/// 3) empty list (built-in titles are used)
pub fn load_topics_default(fallback: Option<&Path>) -> Result<Vec<TopicEntry>> {
    if let Ok(p) = std::env::var(ENV_TOPICS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_topics_from(&pb);
        }
        return Err(anyhow!("{ENV_TOPICS_PATH} points to non-existent path"));
    }
    match fallback {
        Some(p) if p.exists() => load_topics_from(p),
        _ => Ok(Vec::new()),
    }
}

fn parse_topics(s: &str, hint_ext: &str) -> Result<Vec<TopicEntry>> {
    if hint_ext == "toml" {
        return parse_toml(s);
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    parse_toml(s).map_err(|_| anyhow!("unsupported topic list format"))
}

fn parse_toml(s: &str) -> Result<Vec<TopicEntry>> {
    #[derive(Deserialize)]
    struct TomlTopics {
        topics: Vec<TopicEntry>,
    }
    let v: TomlTopics = toml::from_str(s)?;
    Ok(clean_list(v.topics))
}

fn parse_json(s: &str) -> Result<Vec<TopicEntry>> {
    let v: Vec<TopicEntry> = serde_json::from_str(s)?;
    Ok(clean_list(v))
}

/// Trim, validate and dedup (by title, first occurrence wins).
fn clean_list(items: Vec<TopicEntry>) -> Vec<TopicEntry> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let topic = it.topic.trim().to_string();
        if topic.is_empty() {
            continue;
        }
        if let Err(e) = validate_topic(&topic) {
            warn!(target: "topics", %topic, error = %e, "skipping invalid topic");
            continue;
        }
        if seen.insert(topic.clone()) {
            out.push(TopicEntry {
                topic,
                category: it.category.trim().to_ascii_lowercase(),
            });
        }
    }
    out
}
