use std::sync::Arc;

use crate::models::{NewsEvent, ScoredEvent, SentimentCategory, SentimentScore};
use crate::services::lexicon::{tokenize, Lexicon};

/// Normalization constant for the compound score: S / sqrt(S^2 + ALPHA)
const ALPHA: f64 = 15.0;

/// Scalar applied to a weight preceded by a negation
const NEGATION_SCALAR: f64 = -0.74;

/// How many tokens back negations and boosters are looked for
const MODIFIER_WINDOW: usize = 3;

/// Booster shift is damped with distance from the word it modifies
const BOOSTER_DISTANCE_SCALE: [f64; MODIFIER_WINDOW] = [1.0, 0.95, 0.9];

/// Category boundaries, intervals closed on the right
const NEGATIVE_UPPER: f64 = -0.2;
const NEUTRAL_UPPER: f64 = 0.2;

/// Map a compound score to its category.
/// Negative = [-1, -0.2], Neutral = (-0.2, 0.2], Positive = (0.2, 1]
pub fn categorize(compound: f64) -> SentimentCategory {
    if compound <= NEGATIVE_UPPER {
        SentimentCategory::Negative
    } else if compound <= NEUTRAL_UPPER {
        SentimentCategory::Neutral
    } else {
        SentimentCategory::Positive
    }
}

/// Rule-based scorer over an immutable [`Lexicon`].
///
/// Clones share the same tables.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: Arc<Lexicon>,
}

impl LexiconScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Score a text blob.
    ///
    /// Returns compound in [-1, 1] and positive/negative/neutral shares that sum to 1.
    /// Text without any scoreable token is fully neutral.
    pub fn score(&self, text: &str) -> SentimentScore {
        let tokens = tokenize(text);

        let mut weights: Vec<f64> = Vec::new();
        let mut neutral_tokens = 0usize;
        let mut i = 0;

        while i < tokens.len() {
            if let Some((span, weight)) = self.lexicon.match_phrase(&tokens, i) {
                weights.push(self.apply_modifiers(&tokens, i, weight));
                i += span;
                continue;
            }

            let token = &tokens[i];
            if !self.lexicon.is_stopword(token) {
                match self.lexicon.word_weight(token) {
                    Some(weight) => weights.push(self.apply_modifiers(&tokens, i, weight)),
                    None => neutral_tokens += 1,
                }
            }
            i += 1;
        }

        build_score(&weights, neutral_tokens)
    }

    /// Adjust a weight for negations and boosters in the tokens before `start`.
    fn apply_modifiers(&self, tokens: &[String], start: usize, weight: f64) -> f64 {
        let mut adjusted = weight;
        let mut negated = false;

        for distance in 1..=MODIFIER_WINDOW.min(start) {
            let previous = &tokens[start - distance];

            if self.lexicon.is_negation(previous) {
                negated = true;
            } else if let Some(shift) = self.lexicon.booster(previous) {
                let shift = shift * BOOSTER_DISTANCE_SCALE[distance - 1];
                adjusted += if weight < 0.0 { -shift } else { shift };
            }
        }

        if negated {
            adjusted *= NEGATION_SCALAR;
        }
        adjusted
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::default()))
    }
}

fn build_score(weights: &[f64], neutral_tokens: usize) -> SentimentScore {
    let sum: f64 = weights.iter().sum();
    let compound = if sum == 0.0 {
        0.0
    } else {
        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    };

    let positive_mass: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    let negative_mass: f64 = weights.iter().filter(|w| **w < 0.0).map(|w| w.abs()).sum();
    // a weight cancelled to exactly zero by its modifiers counts as neutral
    let zeroed = weights.iter().filter(|w| **w == 0.0).count();
    let neutral_mass = (neutral_tokens + zeroed) as f64;

    let total = positive_mass + negative_mass + neutral_mass;
    let (positive, negative, neutral) = if total > 0.0 {
        (positive_mass / total, negative_mass / total, neutral_mass / total)
    } else {
        (0.0, 0.0, 1.0)
    };

    SentimentScore {
        compound,
        positive,
        negative,
        neutral,
        category: categorize(compound),
    }
}

/// Score one event's title + description.
pub fn score_event(scorer: &LexiconScorer, event: &NewsEvent) -> ScoredEvent {
    let content = event.content();
    let score = scorer.score(&content);
    ScoredEvent {
        event: event.clone(),
        content,
        score,
    }
}

/// Score every event independently, keeping input order. Duplicates are scored twice.
pub fn score_events(scorer: &LexiconScorer, events: &[NewsEvent]) -> Vec<ScoredEvent> {
    events.iter().map(|e| score_event(scorer, e)).collect()
}
