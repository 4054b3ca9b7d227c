//! # Content categories
//! Closed set of categories a topic can be tagged with.
//!
//! Parsing never fails: anything outside the known set falls into
//! [`Category::General`], which carries no entry in the routing or revenue
//! tables and therefore always resolves to the table defaults.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Finance,
    Business,
    Technology,
    Health,
    Education,
    Lifestyle,
    General,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Finance,
        Category::Business,
        Category::Technology,
        Category::Health,
        Category::Education,
        Category::Lifestyle,
        Category::General,
    ];

    /// Case-insensitive, whitespace-tolerant. Unknown input maps to `General`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "finance" => Category::Finance,
            "business" => Category::Business,
            "technology" | "tech" => Category::Technology,
            "health" => Category::Health,
            "education" => Category::Education,
            "lifestyle" => Category::Lifestyle,
            _ => Category::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Finance => "finance",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Health => "health",
            Category::Education => "education",
            Category::Lifestyle => "lifestyle",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(Category::parse(" Finance "), Category::Finance);
        assert_eq!(Category::parse("TECHNOLOGY"), Category::Technology);
        assert_eq!(Category::parse("tech"), Category::Technology);
    }

    #[test]
    fn unknown_falls_back_to_general() {
        assert_eq!(Category::parse("gardening"), Category::General);
        assert_eq!(Category::parse(""), Category::General);
    }

    #[test]
    fn display_matches_serde_name() {
        for c in Category::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c));
        }
    }
}
