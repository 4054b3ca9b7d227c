//! decision.rs: routing verdict, pipeline tier and explainability reasons.
//!
//! The router emits a [`RoutingDecision`]; the engine turns its [`Target`]
//! into a [`Tier`] that selects the generation profile.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which generation pipeline a topic is sent through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Basic,
    Enhanced,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Basic => "basic",
            Target::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generation profile tier. `Enterprise` is only reachable through an explicit
/// override; the router itself never emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Basic,
    Enhanced,
    Enterprise,
}

impl From<Target> for Tier {
    fn from(t: Target) -> Self {
        match t {
            Target::Basic => Tier::Basic,
            Target::Enhanced => Tier::Enhanced,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Basic => "basic",
            Tier::Enhanced => "enhanced",
            Tier::Enterprise => "enterprise",
        })
    }
}

/// Which scoring rule produced a reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    Category,
    TopicLength,
    BusinessHours,
    Weekday,
    Threshold,
}

/// One line of the score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub message: String,
    /// Points this rule added to the total (0 for the threshold line).
    pub points: f64,
    pub kind: ReasonKind,
}

impl Reason {
    pub fn new(kind: ReasonKind, points: f64, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            points,
            kind,
        }
    }
}

/// Router output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub target: Target,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<Reason>,
}

impl RoutingDecision {
    pub fn new(target: Target, score: f64) -> Self {
        Self {
            target,
            score,
            reasons: Vec::new(),
        }
    }

    /// Adds one reason (builder style).
    pub fn with_reason(mut self, reason: Reason) -> Self {
        self.reasons.push(reason);
        self
    }

    pub fn is_enhanced(&self) -> bool {
        self.target == Target::Enhanced
    }

    pub fn tier(&self) -> Tier {
        self.target.into()
    }
}
