// src/lib.rs
//! Topic routing and revenue estimation for an SEO content pipeline.
//!
//! ```text
//! TopicSelector ──► Router ──► Tier profile ──► RevenueEstimator
//!                                   │
//!                                   └─► PipelineReport ──► History / export
//! ```
//!
//! Router and estimator are pure and total; only config, topic files and
//! export touch the filesystem.

pub mod category;
pub mod config;
pub mod decision;
pub mod engine;
pub mod export;
pub mod history;
pub mod metrics;
pub mod revenue;
pub mod router;
pub mod scheduler;
pub mod telemetry;
pub mod topic;

// ---- Re-exports for stable public API ----
pub use crate::category::Category;
pub use crate::config::AppConfig;
pub use crate::decision::{Reason, ReasonKind, RoutingDecision, Target, Tier};
pub use crate::engine::{Engine, EngineConfig, PipelineReport, TierProfile};
pub use crate::history::{History, HistoryStats};
pub use crate::revenue::{estimate, ArticleMetrics, RevenueEstimate, RevenueEstimator, RevenueTables};
pub use crate::router::{route, Clock, FixedClock, Router, RouterConfig, SystemClock};
pub use crate::topic::{TopicRecord, TopicSelector};
