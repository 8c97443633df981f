//! Lexicon-based headline sentiment.
//!
//! Polarity is the mean score of the lexicon words found in a text, each
//! scaled by a preceding intensifier and damped-and-flipped by a preceding
//! negation. The result is clamped to [-1, 1]; text without lexicon hits
//! scores 0.0.

use crate::domain::news::NewsArticle;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Multiplier applied to a word score preceded by a negation.
const NEGATION_FACTOR: f64 = -0.5;

/// How many tokens back a negation or intensifier may sit.
const MODIFIER_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

/// Strictly above `threshold` is Positive, strictly below `-threshold` is
/// Negative, anything else (boundaries included) is Neutral.
pub fn classify(polarity: f64, threshold: f64) -> SentimentLabel {
    if polarity > threshold {
        SentimentLabel::Positive
    } else if polarity < -threshold {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineSentiment {
    pub title: String,
    pub url: String,
    pub polarity: f64,
    pub label: SentimentLabel,
}

pub struct SentimentAnalyzer {
    words: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        let words = [
            // positive
            ("bullish", 0.8),
            ("surge", 0.7),
            ("rally", 0.7),
            ("soar", 0.8),
            ("gain", 0.5),
            ("profit", 0.6),
            ("growth", 0.6),
            ("rise", 0.5),
            ("jump", 0.6),
            ("climb", 0.5),
            ("increase", 0.5),
            ("improve", 0.5),
            ("outperform", 0.7),
            ("beat", 0.6),
            ("exceed", 0.6),
            ("strong", 0.5),
            ("positive", 0.5),
            ("optimistic", 0.6),
            ("confident", 0.5),
            ("record", 0.6),
            ("upgrade", 0.6),
            ("buy", 0.5),
            ("breakout", 0.6),
            ("recovery", 0.5),
            ("rebound", 0.5),
            ("good", 0.7),
            ("great", 0.8),
            ("excellent", 1.0),
            ("success", 0.6),
            ("win", 0.6),
            ("boost", 0.6),
            ("expand", 0.4),
            ("dividend", 0.3),
            // negative
            ("bearish", -0.8),
            ("crash", -0.9),
            ("plunge", -0.8),
            ("tumble", -0.7),
            ("slump", -0.7),
            ("drop", -0.6),
            ("slip", -0.4),
            ("fall", -0.5),
            ("decline", -0.6),
            ("loss", -0.6),
            ("down", -0.4),
            ("decrease", -0.5),
            ("weak", -0.5),
            ("negative", -0.5),
            ("pessimistic", -0.6),
            ("concern", -0.5),
            ("worry", -0.5),
            ("fear", -0.6),
            ("risk", -0.4),
            ("volatile", -0.3),
            ("uncertainty", -0.5),
            ("miss", -0.6),
            ("disappoint", -0.7),
            ("underperform", -0.6),
            ("downgrade", -0.6),
            ("sell", -0.5),
            ("crisis", -0.8),
            ("warning", -0.5),
            ("trouble", -0.6),
            ("problem", -0.5),
            ("fail", -0.7),
            ("fraud", -0.9),
            ("probe", -0.4),
            ("lawsuit", -0.6),
            ("bad", -0.7),
            ("poor", -0.6),
            ("terrible", -1.0),
        ]
        .into_iter()
        .collect();

        let negations = [
            "not", "no", "never", "neither", "nor", "none", "nothing", "cannot", "cant",
            "don't", "dont", "doesn't", "doesnt", "didn't", "didnt", "won't", "wont",
            "isn't", "isnt", "aren't", "arent", "wasn't", "wasnt", "hardly", "barely",
        ]
        .into_iter()
        .collect();

        let intensifiers = [
            ("very", 1.3),
            ("extremely", 1.5),
            ("highly", 1.3),
            ("significantly", 1.3),
            ("sharply", 1.4),
            ("massively", 1.5),
            ("slightly", 0.5),
            ("somewhat", 0.7),
            ("marginally", 0.5),
        ]
        .into_iter()
        .collect();

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    /// Signed polarity in [-1, 1].
    pub fn polarity(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let mut scores = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(base) = self.lookup(token) else {
                continue;
            };

            let mut score = base;
            let window = &tokens[i.saturating_sub(MODIFIER_WINDOW)..i];
            if let Some(factor) = window
                .iter()
                .rev()
                .find_map(|t| self.intensifiers.get(t.as_str()))
            {
                score *= factor;
            }
            if window.iter().any(|t| self.negations.contains(t.as_str())) {
                score *= NEGATION_FACTOR;
            }
            scores.push(score.clamp(-1.0, 1.0));
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }

    pub fn score_article(&self, article: &NewsArticle, threshold: f64) -> HeadlineSentiment {
        let text = match &article.description {
            Some(desc) if !desc.trim().is_empty() => format!("{} {}", article.title, desc),
            _ => article.title.clone(),
        };
        let polarity = self.polarity(&text);

        HeadlineSentiment {
            title: article.title.clone(),
            url: article.url.clone(),
            polarity,
            label: classify(polarity, threshold),
        }
    }

    pub fn score_articles(
        &self,
        articles: &[NewsArticle],
        threshold: f64,
    ) -> Vec<HeadlineSentiment> {
        articles
            .iter()
            .map(|a| self.score_article(a, threshold))
            .collect()
    }

    /// Exact match first, then common inflection suffixes stripped. A bare
    /// `d` is only stripped after an `e` ("declined"), and a doubled final
    /// consonant is undone ("dropped" -> "drop").
    fn lookup(&self, token: &str) -> Option<f64> {
        if let Some(score) = self.words.get(token) {
            return Some(*score);
        }
        for suffix in ["ing", "ed", "es", "s", "d"] {
            let Some(stem) = token.strip_suffix(suffix) else {
                continue;
            };
            if stem.len() < 3 || (suffix == "d" && !stem.ends_with('e')) {
                continue;
            }
            if let Some(score) = self.words.get(stem) {
                return Some(*score);
            }
            if suffix != "ing" && suffix != "ed" {
                continue;
            }
            // "rising" -> "ris" -> "rise"
            if let Some(score) = self.words.get(format!("{stem}e").as_str()) {
                return Some(*score);
            }
            if let Some(undoubled) = undouble(stem) {
                if let Some(score) = self.words.get(undoubled) {
                    return Some(*score);
                }
            }
        }
        None
    }
}

/// `stem` without its last letter when that letter is a doubled consonant.
fn undouble(stem: &str) -> Option<&str> {
    let mut chars = stem.chars().rev();
    let (last, prev) = (chars.next()?, chars.next()?);
    let doubled = last == prev && last.is_ascii_alphabetic() && !"aeiou".contains(last);
    doubled.then(|| &stem[..stem.len() - 1])
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_thresholds() {
        assert_eq!(classify(0.5, DEFAULT_THRESHOLD), SentimentLabel::Positive);
        assert_eq!(classify(-0.5, DEFAULT_THRESHOLD), SentimentLabel::Negative);
        assert_eq!(classify(0.0, DEFAULT_THRESHOLD), SentimentLabel::Neutral);
    }

    #[test]
    fn classify_boundary_is_exclusive() {
        assert_eq!(classify(0.2, DEFAULT_THRESHOLD), SentimentLabel::Neutral);
        assert_eq!(classify(-0.2, DEFAULT_THRESHOLD), SentimentLabel::Neutral);
        assert_eq!(classify(0.2000001, DEFAULT_THRESHOLD), SentimentLabel::Positive);
    }

    #[test]
    fn label_serializes_as_word() {
        let json = serde_json::to_string(&SentimentLabel::Negative).unwrap();
        assert_eq!(json, "\"Negative\"");
        assert_eq!(SentimentLabel::Positive.to_string(), "Positive");
    }

    #[test]
    fn polarity_of_plain_text_is_zero() {
        let analyzer = SentimentAnalyzer::new();
        assert_eq!(analyzer.polarity("Company schedules annual meeting"), 0.0);
        assert_eq!(analyzer.polarity(""), 0.0);
    }

    #[test]
    fn polarity_positive_headline() {
        let analyzer = SentimentAnalyzer::new();
        let p = analyzer.polarity("Reliance shares surge to record high on strong earnings");
        assert!(p > DEFAULT_THRESHOLD, "polarity {p}");
    }

    #[test]
    fn polarity_negative_headline() {
        let analyzer = SentimentAnalyzer::new();
        let p = analyzer.polarity("Stocks plunge as crisis fears deepen");
        assert!(p < -DEFAULT_THRESHOLD, "polarity {p}");
    }

    #[test]
    fn negation_flips_and_damps() {
        let analyzer = SentimentAnalyzer::new();
        let plain = analyzer.polarity("results were good");
        let negated = analyzer.polarity("results were not good");
        assert!((negated - plain * NEGATION_FACTOR).abs() < 1e-12);
    }

    #[test]
    fn intensifier_scales_score() {
        let analyzer = SentimentAnalyzer::new();
        let plain = analyzer.polarity("a strong quarter");
        let boosted = analyzer.polarity("a very strong quarter");
        assert!(boosted > plain);
    }

    #[test]
    fn inflections_match_stems() {
        let analyzer = SentimentAnalyzer::new();
        assert!(analyzer.polarity("shares surged") > 0.0);
        assert!(analyzer.polarity("prices rising") > 0.0);
        assert!(analyzer.polarity("revenue declines") < 0.0);
        assert!(analyzer.polarity("margins declined") < 0.0);
    }

    #[test]
    fn doubled_consonants_are_undone() {
        let analyzer = SentimentAnalyzer::new();
        assert!(analyzer.polarity("shares dropped") < 0.0);
        assert!(analyzer.polarity("rupee slipped") < 0.0);
        assert!(analyzer.polarity("a winning streak") > 0.0);
        assert_eq!(undouble("dropp"), Some("drop"));
        assert_eq!(undouble("fall"), Some("fal"));
        assert_eq!(undouble("see"), None);
    }

    #[test]
    fn short_stems_do_not_false_match() {
        let analyzer = SentimentAnalyzer::new();
        assert_eq!(analyzer.polarity("wind farm commissioned"), 0.0);
        assert!(analyzer.polarity("team wins contract") > 0.0);
    }

    #[test]
    fn polarity_is_clamped() {
        let analyzer = SentimentAnalyzer::new();
        let p = analyzer.polarity("extremely excellent");
        assert!(p <= 1.0);
        assert!((p - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_article_uses_description() {
        let analyzer = SentimentAnalyzer::new();
        let article = NewsArticle {
            title: "Quarterly update".into(),
            url: "https://example.com/a".into(),
            source: None,
            published_at: None,
            description: Some("Profit growth beat estimates".into()),
        };

        let scored = analyzer.score_article(&article, DEFAULT_THRESHOLD);
        assert_eq!(scored.title, "Quarterly update");
        assert_eq!(scored.url, "https://example.com/a");
        assert_eq!(scored.label, SentimentLabel::Positive);
    }
}
