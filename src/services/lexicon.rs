//! Word and phrase tables used by the lexicon scorer.
//!
//! Weights follow the usual valence scale of rule-based scorers: roughly -4.0
//! (extremely negative) to +4.0 (extremely positive). The base table covers general
//! English plus common news vocabulary; the financial overrides are higher-magnitude
//! entries that win over the base table and may span several words.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::errors::AppError;

const BASE_LEXICON: &[(&str, f64)] = &[
    // positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("strong", 2.3),
    ("stronger", 2.1),
    ("best", 3.2),
    ("better", 1.9),
    ("gain", 2.4),
    ("gains", 1.8),
    ("gained", 1.6),
    ("growth", 1.6),
    ("grow", 1.4),
    ("grows", 1.3),
    ("profit", 1.9),
    ("profits", 1.9),
    ("profitable", 1.9),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("wins", 2.7),
    ("won", 2.7),
    ("beat", 1.6),
    ("beats", 1.5),
    ("exceeded", 1.6),
    ("exceed", 1.4),
    ("surge", 1.8),
    ("surges", 1.8),
    ("surged", 1.7),
    ("soar", 2.2),
    ("soars", 2.2),
    ("soared", 2.1),
    ("rally", 1.7),
    ("rallies", 1.6),
    ("rise", 1.0),
    ("rises", 1.0),
    ("rising", 1.0),
    ("boost", 1.7),
    ("boosts", 1.6),
    ("improve", 1.9),
    ("improved", 2.1),
    ("improves", 1.8),
    ("improvement", 2.0),
    ("innovative", 1.9),
    ("innovation", 1.6),
    ("opportunity", 1.8),
    ("opportunities", 1.6),
    ("optimistic", 2.3),
    ("optimism", 2.5),
    ("positive", 2.6),
    ("confident", 2.2),
    ("confidence", 2.3),
    ("benefit", 2.0),
    ("benefits", 1.6),
    ("reward", 2.1),
    ("rewarding", 2.4),
    ("dividend", 0.9),
    ("record", 0.5),
    ("robust", 1.4),
    ("solid", 1.5),
    ("stable", 1.2),
    ("recovery", 1.4),
    ("recover", 1.3),
    ("rebound", 1.5),
    ("upbeat", 2.0),
    ("impressive", 2.3),
    ("outstanding", 3.0),
    ("remarkable", 2.4),
    ("breakthrough", 2.2),
    ("expand", 1.0),
    ("expands", 1.0),
    ("expansion", 1.1),
    ("launch", 0.6),
    ("approve", 1.7),
    ("approved", 1.8),
    ("approval", 1.5),
    ("agreement", 1.1),
    ("partnership", 1.2),
    ("praise", 2.6),
    ("favorable", 2.1),
    ("happy", 2.7),
    ("love", 3.2),
    ("like", 1.5),
    ("support", 1.7),
    ("supports", 1.5),
    ("secure", 1.4),
    ("safe", 1.9),
    ("healthy", 1.7),
    ("lead", 0.9),
    ("leading", 1.0),
    ("top", 0.8),
    ("upside", 1.5),
    ("increase", 1.1),
    ("increases", 1.1),
    ("increased", 1.1),
    ("high", 0.4),
    ("higher", 0.6),
    ("showcase", 0.8),
    ("resolve", 1.6),
    ("resolved", 1.7),
    // negative
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("weak", -1.9),
    ("weaker", -1.8),
    ("weakness", -1.8),
    ("loss", -1.3),
    ("losses", -1.7),
    ("lose", -1.7),
    ("loses", -1.6),
    ("lost", -1.3),
    ("decline", -1.3),
    ("declines", -1.2),
    ("declined", -1.3),
    ("drop", -1.1),
    ("drops", -1.1),
    ("dropped", -1.2),
    ("fall", -1.3),
    ("falls", -1.3),
    ("fell", -1.4),
    ("plunge", -2.2),
    ("plunges", -2.2),
    ("plunged", -2.2),
    ("crash", -2.7),
    ("crashes", -2.6),
    ("collapse", -2.6),
    ("slump", -1.9),
    ("slumps", -1.9),
    ("tumble", -1.8),
    ("tumbles", -1.8),
    ("miss", -1.2),
    ("misses", -1.1),
    ("missed", -1.3),
    ("fail", -2.5),
    ("fails", -2.2),
    ("failed", -2.3),
    ("failure", -2.3),
    ("risk", -1.1),
    ("risks", -1.1),
    ("risky", -1.4),
    ("concern", -1.2),
    ("concerns", -1.2),
    ("worry", -1.9),
    ("worries", -1.7),
    ("fear", -2.2),
    ("fears", -2.0),
    ("uncertain", -1.2),
    ("uncertainty", -1.4),
    ("scrutiny", -1.4),
    ("investigation", -1.3),
    ("probe", -1.2),
    ("lawsuit", -1.8),
    ("sue", -1.6),
    ("sued", -1.7),
    ("fraud", -3.2),
    ("scandal", -2.8),
    ("penalty", -2.0),
    ("fine", 0.8),
    ("fined", -1.6),
    ("layoffs", -2.0),
    ("layoff", -2.0),
    ("cut", -1.1),
    ("cuts", -1.2),
    ("recall", -1.5),
    ("recalls", -1.5),
    ("delay", -1.3),
    ("delays", -1.3),
    ("delayed", -1.3),
    ("debt", -1.5),
    ("bankruptcy", -3.0),
    ("bankrupt", -3.0),
    ("default", -1.6),
    ("crisis", -3.1),
    ("recession", -2.4),
    ("volatile", -1.2),
    ("volatility", -0.8),
    ("negative", -2.7),
    ("pessimistic", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("issue", -0.8),
    ("issues", -0.8),
    ("trouble", -1.7),
    ("troubled", -2.0),
    ("warn", -1.4),
    ("warns", -1.4),
    ("warning", -1.4),
    ("threat", -2.4),
    ("threaten", -2.1),
    ("threatens", -2.1),
    ("hurt", -2.4),
    ("hurts", -2.1),
    ("damage", -2.2),
    ("damaged", -1.9),
    ("downturn", -1.8),
    ("downside", -1.5),
    ("low", -1.1),
    ("lower", -1.2),
    ("decrease", -1.2),
    ("decreased", -1.2),
    ("hate", -2.7),
    ("sad", -2.1),
    ("angry", -2.3),
    ("panic", -2.7),
    ("disappoint", -2.3),
    ("disappointing", -2.2),
    ("disappointed", -1.9),
    ("dispute", -1.7),
    ("violation", -2.2),
    ("breach", -2.0),
    ("hack", -1.8),
    ("hacked", -2.0),
    ("shortage", -1.6),
    ("struggle", -2.0),
    ("struggles", -1.8),
    ("resign", -1.1),
    ("resigns", -1.1),
    ("sell-off", -1.8),
    ("selloff", -1.8),
];

/// Domain entries that take precedence over the base table. Multi-word entries are
/// matched as a whole and replace the weights of the words they contain.
pub const FINANCIAL_OVERRIDES: &[(&str, f64)] = &[
    ("upgraded", 3.0),
    ("downgraded", -3.0),
    ("exceeds expectations", 3.5),
    ("misses expectations", -3.5),
    ("bullish", 2.5),
    ("bearish", -2.5),
    ("outperform", 2.0),
    ("underperform", -2.0),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nothing", "nobody", "nowhere",
    "without", "cannot", "cant", "dont", "doesnt", "didnt", "isnt", "wasnt", "arent",
    "werent", "wont", "wouldnt", "shouldnt", "couldnt", "hasnt", "havent", "hadnt",
];

/// Intensity shift applied to the next weighted word, positive boosts, negative dampens.
const BOOSTERS: &[(&str, f64)] = &[
    ("very", 0.293),
    ("extremely", 0.293),
    ("highly", 0.293),
    ("hugely", 0.293),
    ("incredibly", 0.293),
    ("really", 0.293),
    ("sharply", 0.293),
    ("significantly", 0.293),
    ("substantially", 0.293),
    ("strongly", 0.293),
    ("massively", 0.293),
    ("deeply", 0.293),
    ("most", 0.293),
    ("more", 0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
    ("marginally", -0.293),
    ("barely", -0.293),
    ("hardly", -0.293),
    ("partly", -0.293),
    ("less", -0.293),
    ("little", -0.293),
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "to", "in", "on", "at", "by", "for",
    "with", "from", "as", "is", "are", "was", "were", "be", "been", "being", "it", "its",
    "this", "that", "these", "those", "has", "have", "had", "will", "would", "shall",
    "into", "about", "over", "after", "before", "than", "then", "so", "such", "their",
    "they", "them", "he", "she", "his", "her", "we", "our", "you", "your", "i", "me", "my",
    "do", "does", "did", "which", "who", "whom", "what", "when", "where", "while", "also",
];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[a-z0-9]+(?:['\-][a-z0-9]+)*").unwrap())
}

/// Lowercase word tokens of `text`. Apostrophes inside words are dropped so that
/// "isn't" and "isnt" are the same token; hyphenated words stay whole.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().replace('\'', ""))
        .collect()
}

/// Immutable scoring tables. Built once, then shared read-only by every scorer.
#[derive(Debug, Clone)]
pub struct Lexicon {
    words: HashMap<String, f64>,
    // (tokens, weight), longest phrases first
    phrases: Vec<(Vec<String>, f64)>,
    boosters: HashMap<String, f64>,
    negations: Vec<String>,
    stopwords: Vec<String>,
}

impl Lexicon {
    /// Base table plus the given overrides.
    pub fn new<S: AsRef<str>>(overrides: &[(S, f64)]) -> Self {
        let mut words: HashMap<String, f64> = BASE_LEXICON
            .iter()
            .map(|(w, v)| (w.to_string(), *v))
            .collect();
        let mut phrases: Vec<(Vec<String>, f64)> = Vec::new();

        for (entry, weight) in overrides {
            let tokens = tokenize(entry.as_ref());
            match tokens.len() {
                0 => continue,
                1 => {
                    words.insert(tokens[0].clone(), *weight);
                }
                _ => {
                    // later entries for the same phrase win
                    phrases.retain(|(existing, _)| *existing != tokens);
                    phrases.push((tokens, *weight));
                }
            }
        }

        phrases.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self {
            words,
            phrases,
            boosters: BOOSTERS.iter().map(|(w, v)| (w.to_string(), *v)).collect(),
            negations: NEGATIONS.iter().map(|w| w.to_string()).collect(),
            stopwords: STOPWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Default financial overrides followed by `extra`; `extra` wins on conflicts.
    pub fn with_extra_overrides(extra: &[(String, f64)]) -> Self {
        let mut all: Vec<(String, f64)> = FINANCIAL_OVERRIDES
            .iter()
            .map(|(p, w)| (p.to_string(), *w))
            .collect();
        all.extend(extra.iter().cloned());
        Self::new(&all)
    }

    pub fn word_weight(&self, token: &str) -> Option<f64> {
        self.words.get(token).copied()
    }

    /// Longest phrase starting at `tokens[start]`, as (token count, weight).
    pub fn match_phrase(&self, tokens: &[String], start: usize) -> Option<(usize, f64)> {
        let rest = &tokens[start..];
        self.phrases
            .iter()
            .find(|(phrase, _)| rest.starts_with(phrase))
            .map(|(phrase, weight)| (phrase.len(), *weight))
    }

    pub fn booster(&self, token: &str) -> Option<f64> {
        self.boosters.get(token).copied()
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.iter().any(|n| n == token)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.iter().any(|s| s == token)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(FINANCIAL_OVERRIDES)
    }
}

#[derive(Debug, Deserialize)]
struct OverrideRow {
    phrase: String,
    weight: String,
}

/// Read extra override entries from a `phrase,weight` CSV file with a header row.
pub fn load_overrides_csv(path: &Path) -> Result<Vec<(String, f64)>, AppError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let mut overrides = Vec::new();
    for (line, row) in reader.deserialize::<OverrideRow>().enumerate() {
        let row = row?;
        let weight: f64 = row.weight.parse().map_err(|_| {
            AppError::Validation(format!(
                "Invalid weight '{}' for '{}' on row {} of {}",
                row.weight,
                row.phrase,
                line + 1,
                path.display()
            ))
        })?;
        if !weight.is_finite() {
            return Err(AppError::Validation(format!(
                "Weight for '{}' must be finite",
                row.phrase
            )));
        }
        overrides.push((row.phrase, weight));
    }

    Ok(overrides)
}
