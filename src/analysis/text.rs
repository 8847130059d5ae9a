//! Free-text cleaning for post bodies.

use std::sync::Arc;

use regex::Regex;

use super::spelling::Speller;

/// Strips noise tokens from post text, lowercases, and spell-corrects.
///
/// Stripping order matters: URLs, then mentions, then hashtags, then any
/// remaining character outside the ASCII alphanumeric-and-space set, so the
/// corrector never sees markup noise. Pure: identical input yields
/// identical output for a fixed corrector.
pub struct TextNormalizer {
    url_re: Regex,
    mention_re: Regex,
    hashtag_re: Regex,
    special_re: Regex,
    speller: Arc<dyn Speller>,
}

impl TextNormalizer {
    pub fn new(speller: Arc<dyn Speller>) -> Self {
        Self {
            url_re: Regex::new(r"http\S+").unwrap(),
            mention_re: Regex::new(r"@\S+").unwrap(),
            hashtag_re: Regex::new(r"#\S+").unwrap(),
            special_re: Regex::new(r"[^A-Za-z0-9 ]+").unwrap(),
            speller,
        }
    }

    /// Clean one post body.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.trim().is_empty() {
            return String::new();
        }

        let text = self.url_re.replace_all(raw, "");
        let text = self.mention_re.replace_all(&text, "");
        let text = self.hashtag_re.replace_all(&text, "");
        let text = self.special_re.replace_all(&text, "");
        let text = text.to_lowercase();

        self.speller.correct(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::spelling::{DictionarySpeller, NoopSpeller};

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(Arc::new(NoopSpeller))
    }

    #[test]
    fn test_strips_urls_mentions_hashtags() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Check this out!! http://x.co #cool @bob"),
            "check this out   "
        );
    }

    #[test]
    fn test_strips_adjacent_markup_before_punctuation() {
        let n = normalizer();
        // The URL swallows trailing punctuation as part of its token; the
        // mention and hashtag go before the character class strips the rest.
        assert_eq!(n.normalize("wow @a#b http://t.co/x?q=1."), "wow  ");
    }

    #[test]
    fn test_lowercases_and_drops_unicode() {
        let n = normalizer();
        assert_eq!(n.normalize("Great Day ☀️ in SF!"), "great day  in sf");
    }

    #[test]
    fn test_empty_and_whitespace_short_circuit() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \t\n"), "");
    }

    #[test]
    fn test_correction_runs_last_on_stripped_text() {
        let n = TextNormalizer::new(Arc::new(DictionarySpeller::new()));
        assert_eq!(n.normalize("Teh WEATHER!! http://x.co"), "the weather ");
    }

    #[test]
    fn test_pure_function() {
        let n = TextNormalizer::new(Arc::new(DictionarySpeller::new()));
        let input = "Teh #sunny dya @here";
        assert_eq!(n.normalize(input), n.normalize(input));
    }
}
