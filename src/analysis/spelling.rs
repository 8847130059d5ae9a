//! Spelling correction.
//!
//! The corrector is injected into the text normalizer and location
//! classifier as a capability object, so tests can substitute a no-op or a
//! scripted fake.

use std::collections::HashMap;

use regex::Regex;

/// Deterministic spelling corrector over free text.
pub trait Speller: Send + Sync {
    /// Correct misspelled word tokens in place; everything else (spacing,
    /// punctuation, casing of untouched tokens) is preserved.
    fn correct(&self, text: &str) -> String;
}

/// Corrector that leaves text unchanged. Useful in tests and when spelling
/// correction is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSpeller;

impl Speller for NoopSpeller {
    fn correct(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Frequency-ranked word list the corrector checks candidates against.
const WORD_LIST: &str = include_str!("words.txt");

/// Tokens shorter than this are never corrected; single-letter edits on
/// them are as likely to mangle as to fix.
const MIN_TOKEN_LEN: usize = 3;

/// Dictionary-based corrector.
///
/// Each lowercase alphabetic token absent from the dictionary is replaced
/// by the highest-ranked dictionary word within one edit (delete,
/// transpose, replace, insert); tokens with no such neighbor pass through
/// unchanged. Capitalized and mixed-case tokens are treated as proper
/// nouns and left alone.
pub struct DictionarySpeller {
    ranks: HashMap<&'static str, usize>,
    token_re: Regex,
}

impl DictionarySpeller {
    pub fn new() -> Self {
        let mut ranks = HashMap::new();
        for (rank, word) in WORD_LIST.lines().map(str::trim).enumerate() {
            if !word.is_empty() {
                ranks.entry(word).or_insert(rank);
            }
        }

        Self {
            ranks,
            token_re: Regex::new(r"[A-Za-z]+").unwrap(),
        }
    }

    fn correct_token(&self, token: &str) -> Option<String> {
        if token.len() < MIN_TOKEN_LEN
            || !token.chars().all(|c| c.is_ascii_lowercase())
            || self.ranks.contains_key(token)
        {
            return None;
        }

        let mut best: Option<(usize, String)> = None;
        for candidate in edits1(token) {
            if let Some(&rank) = self.ranks.get(candidate.as_str()) {
                if best.as_ref().map(|(r, _)| rank < *r).unwrap_or(true) {
                    best = Some((rank, candidate));
                }
            }
        }
        best.map(|(_, word)| word)
    }
}

impl Default for DictionarySpeller {
    fn default() -> Self {
        Self::new()
    }
}

impl Speller for DictionarySpeller {
    fn correct(&self, text: &str) -> String {
        self.token_re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let token = &caps[0];
                self.correct_token(token).unwrap_or_else(|| token.to_string())
            })
            .into_owned()
    }
}

/// All strings one edit away from `word` (Norvig-style candidate set).
fn edits1(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();
    let mut out = Vec::with_capacity(n * 54);

    // Deletes
    for i in 0..n {
        let mut s: String = chars[..i].iter().collect();
        s.extend(&chars[i + 1..]);
        out.push(s);
    }
    // Transposes
    for i in 0..n.saturating_sub(1) {
        let mut swapped = chars.clone();
        swapped.swap(i, i + 1);
        out.push(swapped.into_iter().collect());
    }
    // Replaces
    for i in 0..n {
        for c in 'a'..='z' {
            if c != chars[i] {
                let mut replaced = chars.clone();
                replaced[i] = c;
                out.push(replaced.into_iter().collect());
            }
        }
    }
    // Inserts
    for i in 0..=n {
        for c in 'a'..='z' {
            let mut s: String = chars[..i].iter().collect();
            s.push(c);
            s.extend(&chars[i..]);
            out.push(s);
        }
    }

    out
}
