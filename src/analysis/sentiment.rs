//! Lexicon-based sentiment scoring.

use std::collections::{HashMap, HashSet};

/// Maps text to a polarity in [-1.0, 1.0]; 0.0 for neutral or empty input.
/// Deterministic for identical input.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}

/// Tokens before a sentiment word that a negation still applies to.
const NEGATION_WINDOW: usize = 3;

/// Damping applied when a negation inverts a valence.
const NEGATION_DAMPING: f64 = 0.8;

/// Valence entries: word, score in [-1, 1].
const LEXICON: &[(&str, f64)] = &[
    ("good", 0.7),
    ("great", 0.8),
    ("love", 0.9),
    ("loved", 0.9),
    ("awesome", 0.9),
    ("amazing", 0.9),
    ("excellent", 1.0),
    ("perfect", 1.0),
    ("best", 0.9),
    ("wonderful", 0.9),
    ("beautiful", 0.8),
    ("happy", 0.8),
    ("glad", 0.6),
    ("excited", 0.7),
    ("fun", 0.7),
    ("funny", 0.6),
    ("cool", 0.6),
    ("nice", 0.6),
    ("like", 0.4),
    ("likes", 0.4),
    ("win", 0.6),
    ("won", 0.6),
    ("thanks", 0.5),
    ("thank", 0.5),
    ("lucky", 0.6),
    ("proud", 0.6),
    ("enjoy", 0.7),
    ("enjoyed", 0.7),
    ("bad", -0.7),
    ("terrible", -0.9),
    ("horrible", -0.9),
    ("awful", -0.9),
    ("worst", -1.0),
    ("hate", -0.9),
    ("hated", -0.9),
    ("sad", -0.7),
    ("angry", -0.7),
    ("annoying", -0.6),
    ("annoyed", -0.6),
    ("disappointed", -0.6),
    ("disappointing", -0.6),
    ("sucks", -0.8),
    ("poor", -0.5),
    ("fail", -0.6),
    ("failed", -0.6),
    ("broken", -0.5),
    ("lost", -0.4),
    ("lose", -0.4),
    ("wrong", -0.5),
    ("boring", -0.6),
    ("tired", -0.4),
    ("sick", -0.5),
    ("ugly", -0.7),
    ("dirty", -0.5),
    ("slow", -0.3),
];

/// Words that flip the valence of what follows.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "neither", "cannot", "cant", "dont", "doesnt",
    "didnt", "isnt", "wasnt", "wont", "aint",
];

/// Intensity modifiers: word, multiplier applied to the next valence hit.
const MODIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("really", 1.4),
    ("so", 1.3),
    ("too", 1.3),
    ("extremely", 1.8),
    ("absolutely", 1.7),
    ("totally", 1.5),
    ("super", 1.5),
    ("quite", 1.2),
    ("pretty", 1.2),
    ("somewhat", 0.7),
    ("slightly", 0.5),
    ("barely", 0.4),
];

/// Scorer backed by an embedded valence lexicon with negation handling and
/// intensity modifiers. The final score is the mean valence of matched
/// tokens, clamped to [-1.0, 1.0].
pub struct LexiconScorer {
    lexicon: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
    modifiers: HashMap<&'static str, f64>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
            modifiers: MODIFIERS.iter().copied().collect(),
        }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut hits = 0usize;
        let mut modifier = 1.0;
        let mut negation_active = false;
        let mut tokens_since_negation = 0usize;

        for token in text.split_whitespace() {
            let token = token.to_lowercase();

            if self.negations.contains(token.as_str()) {
                negation_active = true;
                tokens_since_negation = 0;
                continue;
            }

            if let Some(&m) = self.modifiers.get(token.as_str()) {
                modifier = m;
                continue;
            }

            if let Some(&valence) = self.lexicon.get(token.as_str()) {
                let mut score = valence * modifier;
                if negation_active && tokens_since_negation < NEGATION_WINDOW {
                    score = -score * NEGATION_DAMPING;
                }
                total += score;
                hits += 1;
                modifier = 1.0;
            }

            if negation_active {
                tokens_since_negation += 1;
                if tokens_since_negation >= NEGATION_WINDOW {
                    negation_active = false;
                }
            }
        }

        if hits == 0 {
            0.0
        } else {
            (total / hits as f64).clamp(-1.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_scores_zero() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score(""), 0.0);
        assert_eq!(scorer.score("   "), 0.0);
    }

    #[test]
    fn test_neutral_text_scores_zero() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.score("the train leaves at noon"), 0.0);
    }

    #[test]
    fn test_polarity_direction() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("what a great day") > 0.0);
        assert!(scorer.score("this is terrible") < 0.0);
    }

    #[test]
    fn test_negation_flips_valence() {
        let scorer = LexiconScorer::new();
        assert!(scorer.score("not good") < 0.0);
        assert!(scorer.score("never bad") > 0.0);
    }

    #[test]
    fn test_negation_window_expires() {
        let scorer = LexiconScorer::new();
        // Four tokens between the negation and the valence word.
        assert!(scorer.score("not the train from the city good") > 0.0);
    }

    #[test]
    fn test_modifier_amplifies() {
        let scorer = LexiconScorer::new();
        let plain = scorer.score("good");
        let boosted = scorer.score("very good");
        assert!(boosted > plain);
    }

    #[test]
    fn test_bounded_output() {
        let scorer = LexiconScorer::new();
        for text in [
            "extremely excellent absolutely perfect",
            "extremely horrible absolutely worst",
            "love love love hate hate hate",
            "",
        ] {
            let s = scorer.score(text);
            assert!((-1.0..=1.0).contains(&s), "score {s} out of bounds for {text:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let scorer = LexiconScorer::new();
        let text = "really love this beautiful city";
        assert_eq!(scorer.score(text), scorer.score(text));
    }
}
