// src/review/mod.rs — Review data model: attributes, scores, display bands

pub mod parser;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

pub use parser::{decode_review, parse_review_response};

/// Highest score any known prompt revision asks for.
pub const MAX_SCORE: f64 = 10.0;

/// Score and comment for one evaluated attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewParameter {
    pub score: f64,
    pub comment: String,
}

impl ReviewParameter {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.score)
    }
}

/// A decoded review: named attributes in the order the model emitted them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutfitReview {
    attributes: Vec<(String, ReviewParameter)>,
}

impl OutfitReview {
    /// Build from ordered entries. Later duplicates of a name are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ReviewParameter)>) -> Self {
        let mut attributes: Vec<(String, ReviewParameter)> = Vec::new();
        for (name, param) in entries {
            if !attributes.iter().any(|(n, _)| *n == name) {
                attributes.push((name, param));
            }
        }
        Self { attributes }
    }

    /// Stand-in shown when no review is available yet.
    pub fn placeholder() -> Self {
        Self::from_entries(["fit", "color", "readiness"].into_iter().map(|name| {
            (
                name.to_string(),
                ReviewParameter {
                    score: 0.0,
                    comment: "N/A".into(),
                },
            )
        }))
    }

    pub fn get(&self, name: &str) -> Option<&ReviewParameter> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReviewParameter)> {
        self.attributes.iter().map(|(n, p)| (n.as_str(), p))
    }

    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Serializes to the canonical `{"parameters": {...}}` shape, order intact.
impl Serialize for OutfitReview {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Parameters<'a>(&'a [(String, ReviewParameter)]);

        impl Serialize for Parameters<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (name, param) in self.0 {
                    map.serialize_entry(name, param)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("parameters", &Parameters(&self.attributes))?;
        map.end()
    }
}

/// Which attribute layout a review must follow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReviewSchema {
    /// Any attribute names, wrapped in `parameters` (legacy top-level objects accepted).
    #[default]
    Open,
    /// Exactly these attribute names, in any order.
    Fixed(Vec<String>),
}

impl ReviewSchema {
    /// `{fit, color, step_out_readiness}` with 0–5 half-point scores.
    pub fn step_out_readiness() -> Self {
        Self::Fixed(vec![
            "fit".into(),
            "color".into(),
            "step_out_readiness".into(),
        ])
    }

    /// `{fit, color, texture}` with 1–10 integer scores.
    pub fn texture() -> Self {
        Self::Fixed(vec!["fit".into(), "color".into(), "texture".into()])
    }
}

/// Display band for a 0–5 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score >= 4.5 {
            Self::Excellent
        } else if score >= 3.5 {
            Self::Good
        } else if score >= 2.5 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
