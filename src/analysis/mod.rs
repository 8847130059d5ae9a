//! Record normalization: text cleaning, spelling correction, sentiment
//! scoring, and location standardization.
//!
//! Every component here is a pure function of its input given fixed
//! injected dependencies; nothing performs I/O or keeps mutable state.

pub mod location;
pub mod sentiment;
pub mod spelling;
pub mod text;
pub mod transformer;

pub use location::{LocationClassifier, UNCLASSIFIED};
pub use sentiment::{LexiconScorer, SentimentScorer};
pub use spelling::{DictionarySpeller, NoopSpeller, Speller};
pub use text::TextNormalizer;
pub use transformer::{RecordTransformer, TransformError};

use std::sync::Arc;

/// Build the default transformer: dictionary speller, lexicon scorer.
pub fn default_transformer() -> RecordTransformer {
    let speller: Arc<dyn Speller> = Arc::new(DictionarySpeller::new());
    RecordTransformer::new(
        TextNormalizer::new(speller.clone()),
        Arc::new(LexiconScorer::new()),
        LocationClassifier::new(speller),
    )
}
