//! Heuristic confidence scoring over generated text.
//!
//! The score is an advisory signal feeding the escalation decision; it is
//! not a correctness measure and never gates generation itself.

use serde::{Deserialize, Serialize};

/// Capability trait for scoring generated text.
///
/// Implementations must be pure and deterministic, returning a value in
/// [0, 1]. The coordinator is polymorphic over this seam so alternative
/// scoring strategies can be substituted without touching it.
pub trait ConfidenceScorer: Send + Sync {
    fn score(&self, text: &str) -> f32;
}

/// Tunable constants of the [`HeuristicScorer`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Character length at which the length contribution saturates
    pub length_target: f32,
    /// Maximum contribution of the length term
    pub length_weight: f32,
    /// Contribution per detected bulleted line
    pub bullet_bonus: f32,
    /// Cap on the total bullet contribution
    pub bullet_cap: f32,
    /// Flat bonus when the text carries a fenced code block
    pub code_bonus: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            length_target: 600.0,
            length_weight: 0.7,
            bullet_bonus: 0.05,
            bullet_cap: 0.3,
            code_bonus: 0.05,
        }
    }
}

/// Default scoring strategy: longer, more structured responses score
/// higher. Length scales linearly up to the target, bulleted lines add a
/// capped bonus, and a fenced code block adds a flat bonus.
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    weights: ScoreWeights,
}

impl HeuristicScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    fn bullet_lines(text: &str) -> usize {
        // A bullet is a line break followed directly by a marker, so the
        // first line never counts.
        text.split('\n')
            .skip(1)
            .filter(|line| line.starts_with(['-', '*', '\u{2022}']))
            .count()
    }

    fn has_fenced_code(text: &str) -> bool {
        text.matches("```").count() >= 2
    }
}

impl ConfidenceScorer for HeuristicScorer {
    fn score(&self, text: &str) -> f32 {
        let w = &self.weights;
        let length = text.len() as f32;

        let length_term = (length / w.length_target * w.length_weight).min(w.length_weight);
        let bullet_term = (Self::bullet_lines(text) as f32 * w.bullet_bonus).min(w.bullet_cap);
        let code_term = if Self::has_fenced_code(text) {
            w.code_bonus
        } else {
            0.0
        };

        (length_term + bullet_term + code_term).clamp(0.0, 1.0)
    }
}
