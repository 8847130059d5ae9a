//! Per-record transformation: one raw post in, one normalized post out.

use std::sync::Arc;

use thiserror::Error;

use super::location::LocationClassifier;
use super::sentiment::SentimentScorer;
use super::text::TextNormalizer;
use crate::models::{NormalizedPost, RawPost};

/// A record that could not be transformed. The batch driver decides whether
/// to skip or abort; skipping is the recommended policy since rows are
/// independent.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("sentiment score {0} outside [-1, 1] for post {1}")]
    ScoreOutOfBounds(f64, u64),
}

/// Orchestrates the three leaves over a single post.
///
/// The scorer sees the *cleaned* text while the classifier sees the
/// *original* location string (it applies its own correction); that
/// asymmetry is intentional and load-bearing for classification behavior.
pub struct RecordTransformer {
    normalizer: TextNormalizer,
    scorer: Arc<dyn SentimentScorer>,
    classifier: LocationClassifier,
}

impl RecordTransformer {
    pub fn new(
        normalizer: TextNormalizer,
        scorer: Arc<dyn SentimentScorer>,
        classifier: LocationClassifier,
    ) -> Self {
        Self {
            normalizer,
            scorer,
            classifier,
        }
    }

    /// Normalize the text, score it, and standardize the location.
    pub fn transform(&self, raw: &RawPost) -> Result<NormalizedPost, TransformError> {
        let text = self.normalizer.normalize(&raw.text);
        let sentiment_score = self.scorer.score(&text);
        if !(-1.0..=1.0).contains(&sentiment_score) {
            return Err(TransformError::ScoreOutOfBounds(sentiment_score, raw.id));
        }
        let location = self.classifier.classify(raw.location.as_deref());

        Ok(NormalizedPost {
            id: raw.id,
            created_at: raw.created_at.clone(),
            author: raw.author.clone(),
            text,
            location,
            coordinates: raw.coordinates,
            retweet_count: raw.retweet_count,
            favorite_count: raw.favorite_count,
            sentiment_score,
        })
    }

    /// Clean a fragment of free text (used for auxiliary columns such as
    /// `hashtags` in the dataset pass).
    pub fn clean_text(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// Score a fragment of already-cleaned text.
    pub fn score_text(&self, cleaned: &str) -> f64 {
        self.scorer.score(cleaned)
    }

    /// Standardize a raw location value.
    pub fn classify_location(&self, raw: Option<&str>) -> String {
        self.classifier.classify(raw)
    }
}
