//! history.rs: bounded in-memory ledger of pipeline runs plus aggregate stats.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::category::Category;
use crate::decision::Target;
use crate::engine::PipelineReport;

const MAX_CAPACITY: usize = 10_000;

/// Aggregate view over the stored reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_articles: usize,
    pub total_monthly_estimate: f64,
    pub avg_monthly_estimate: f64,
    /// Share of reports routed to `enhanced`, 0..=1.
    pub enhanced_share: f64,
    pub per_category: BTreeMap<Category, usize>,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<PipelineReport>>,
    cap: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(1_000)
    }
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Store a report, evicting the oldest ones past capacity.
    pub fn push(&self, report: PipelineReport) {
        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(report);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<PipelineReport> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn stats(&self) -> HistoryStats {
        let v = self.inner.lock().expect("history mutex poisoned");
        let total_articles = v.len();
        if total_articles == 0 {
            return HistoryStats::default();
        }

        let mut per_category = BTreeMap::new();
        let mut total = 0.0;
        let mut enhanced = 0usize;
        for r in v.iter() {
            total += r.revenue.monthly;
            if r.decision.target == Target::Enhanced {
                enhanced += 1;
            }
            *per_category.entry(r.topic.category).or_insert(0) += 1;
        }

        HistoryStats {
            total_articles,
            total_monthly_estimate: round2(total),
            avg_monthly_estimate: round2(total / total_articles as f64),
            enhanced_share: enhanced as f64 / total_articles as f64,
            per_category,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::topic::TopicRecord;
    use chrono::NaiveDate;

    fn report(topic: &str, category: Category) -> PipelineReport {
        let now = NaiveDate::from_ymd_opt(2024, 1, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Engine::default().run_once(TopicRecord::new(topic, category, 2.0), now)
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let h = History::with_capacity(2);
        h.push(report("first topic", Category::Health));
        h.push(report("second topic", Category::Health));
        h.push(report("third topic", Category::Health));
        let last = h.snapshot_last_n(10);
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].topic.topic, "second topic");
        assert_eq!(last[1].topic.topic, "third topic");
    }

    #[test]
    fn stats_aggregate_revenue_and_categories() {
        let h = History::default();
        let a = report("Budgeting for Families", Category::Finance);
        let b = report("Cats", Category::Lifestyle);
        let expected_total = a.revenue.monthly + b.revenue.monthly;
        h.push(a);
        h.push(b);

        let s = h.stats();
        assert_eq!(s.total_articles, 2);
        assert!((s.total_monthly_estimate - expected_total).abs() < 0.01);
        assert!((s.avg_monthly_estimate - expected_total / 2.0).abs() < 0.01);
        assert_eq!(s.per_category.get(&Category::Finance), Some(&1));
        assert_eq!(s.per_category.get(&Category::Lifestyle), Some(&1));
    }

    #[test]
    fn empty_stats_are_zero() {
        assert_eq!(History::default().stats(), HistoryStats::default());
    }
}
