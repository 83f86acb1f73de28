//! Precomputed external-catalog matches.
//!
//! The scoring itself happens elsewhere; this module only reads its gap
//! report and exposes the best candidate per ingredient string.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::ontology::FdcCandidate;
use crate::store::read_json;

#[derive(Deserialize)]
struct GapReport {
    #[serde(default)]
    needs_review: Vec<GapItem>,
    #[serde(default)]
    no_match: Vec<GapItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GapItem {
    ingredient: String,
    best_candidate: Option<String>,
    candidate_category: Option<String>,
    score: Option<Score>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Score {
    Number(f64),
    Text(String),
}

impl Score {
    fn value(&self) -> Option<f64> {
        match self {
            Score::Number(n) => Some(*n),
            Score::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Lowercase ingredient string -> best external candidate.
#[derive(Debug, Clone, Default)]
pub struct CandidateOracle {
    candidates: HashMap<String, FdcCandidate>,
}

impl CandidateOracle {
    /// Load the gap report. The file is required.
    pub fn load(path: &Path) -> Result<Self> {
        let report: GapReport = read_json(path)?;
        let mut oracle = Self::default();

        for item in report.needs_review.into_iter().chain(report.no_match) {
            let Some(description) = item.best_candidate.filter(|d| !d.is_empty()) else {
                continue;
            };
            let Some(score) = item.score.as_ref().and_then(Score::value) else {
                tracing::warn!(
                    ingredient = %item.ingredient,
                    "Candidate has no usable score, skipping"
                );
                continue;
            };
            oracle.insert(
                &item.ingredient,
                FdcCandidate {
                    description,
                    category: item.candidate_category,
                    match_score: score,
                },
            );
        }

        tracing::debug!(candidates = oracle.len(), "Loaded external candidates");
        Ok(oracle)
    }

    pub fn insert(&mut self, ingredient: &str, candidate: FdcCandidate) {
        self.candidates.insert(ingredient.to_lowercase(), candidate);
    }

    /// Candidate for an ingredient string, matched case-insensitively.
    pub fn get(&self, ingredient: &str) -> Option<&FdcCandidate> {
        self.candidates.get(&ingredient.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
