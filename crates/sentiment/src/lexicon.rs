//! Fixed sentiment lexicons.

/// Words that indicate positive sentiment.
pub const POSITIVE_WORDS: [&str; 15] = [
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "fantastic",
    "love",
    "happy",
    "joy",
    "perfect",
    "best",
    "awesome",
    "brilliant",
    "outstanding",
    "superb",
];

/// Words that indicate negative sentiment.
pub const NEGATIVE_WORDS: [&str; 15] = [
    "bad",
    "terrible",
    "awful",
    "hate",
    "sad",
    "angry",
    "disappointed",
    "horrible",
    "worst",
    "disgusting",
    "annoying",
    "frustrating",
    "poor",
    "pathetic",
    "useless",
];

/// A pair of positive/negative indicator lists.
///
/// Entries are matched as substrings of lowercased tokens, so an entry
/// should itself be lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl Lexicon {
    /// Build a lexicon from custom word lists. Entries are lowercased.
    pub fn new<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            positive: positive
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            negative: negative
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether any positive entry occurs inside `token`.
    pub fn is_positive(&self, token: &str) -> bool {
        self.positive.iter().any(|w| token.contains(w.as_str()))
    }

    /// Whether any negative entry occurs inside `token`.
    pub fn is_negative(&self, token: &str) -> bool {
        self.negative.iter().any(|w| token.contains(w.as_str()))
    }

    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    pub fn negative(&self) -> &[String] {
        &self.negative
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(POSITIVE_WORDS, NEGATIVE_WORDS)
    }
}
