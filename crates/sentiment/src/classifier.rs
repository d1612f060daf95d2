//! Lexicon-count sentiment scoring.

use serde::{Deserialize, Serialize};

use crate::lexicon::Lexicon;

/// Confidence reported when no side wins.
pub const NEUTRAL_CONFIDENCE: u8 = 50;

const BASE_CONFIDENCE: f64 = 60.0;
const CONFIDENCE_SPAN: f64 = 35.0;
const MAX_CONFIDENCE: f64 = 95.0;

/// Overall emotional tone of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Capitalized label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }

    /// Lowercase identifier, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub sentiment: Sentiment,
    /// Always 50 or within 60..=95.
    pub confidence: u8,
    pub summary: String,
}

/// Per-side indicator counts for a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndicatorCounts {
    pub positive: usize,
    pub negative: usize,
}

impl IndicatorCounts {
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }
}

/// Scores text against a [`Lexicon`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    lexicon: Lexicon,
}

impl Classifier {
    /// Classifier over the built-in lexicons.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Count tokens matching each side of the lexicon.
    ///
    /// A token that matches both lists counts once on each side.
    pub fn count(&self, text: &str) -> IndicatorCounts {
        let lowered = text.to_lowercase();
        let mut counts = IndicatorCounts::default();
        for token in lowered.split_whitespace() {
            if self.lexicon.is_positive(token) {
                counts.positive += 1;
            }
            if self.lexicon.is_negative(token) {
                counts.negative += 1;
            }
        }
        counts
    }

    /// Classify `text`.
    pub fn classify(&self, text: &str) -> Classification {
        let counts = self.count(text);
        let total = counts.total();

        let (sentiment, winning) = if counts.positive > counts.negative {
            (Sentiment::Positive, counts.positive)
        } else if counts.negative > counts.positive {
            (Sentiment::Negative, counts.negative)
        } else {
            (Sentiment::Neutral, 0)
        };

        let confidence = match sentiment {
            Sentiment::Neutral => NEUTRAL_CONFIDENCE,
            _ => scaled_confidence(winning, total),
        };

        Classification {
            sentiment,
            confidence,
            summary: summarize(sentiment, winning),
        }
    }
}

/// Classify with the built-in lexicons.
pub fn classify(text: &str) -> Classification {
    Classifier::new().classify(text)
}

fn scaled_confidence(winning: usize, total: usize) -> u8 {
    let share = winning as f64 / total as f64;
    (BASE_CONFIDENCE + share * CONFIDENCE_SPAN)
        .min(MAX_CONFIDENCE)
        .round() as u8
}

fn summarize(sentiment: Sentiment, indicators: usize) -> String {
    let plural = if indicators == 1 { "" } else { "s" };
    match sentiment {
        Sentiment::Positive => format!(
            "Positive sentiment detected with {indicators} positive indicator{plural}"
        ),
        Sentiment::Negative => format!(
            "Negative sentiment detected with {indicators} negative indicator{plural}"
        ),
        Sentiment::Neutral => {
            "Neutral sentiment - no strong emotional indicators detected".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn positive_text() {
        let result = classify("This is a great and wonderful day");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.confidence, 95);
        assert_eq!(
            result.summary,
            "Positive sentiment detected with 2 positive indicators"
        );
    }

    #[test]
    fn negative_text() {
        let result = classify("I hate this terrible product");
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.confidence, 95);
    }

    #[test]
    fn no_indicators_is_neutral() {
        let result = classify("The sky is blue");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, 50);
        assert_eq!(
            result.summary,
            "Neutral sentiment - no strong emotional indicators detected"
        );
    }

    #[test]
    fn tie_is_neutral() {
        let result = classify("good but bad");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, 50);
    }

    #[test]
    fn mixed_text_scales_confidence() {
        // 2 positive, 1 negative: 60 + (2/3) * 35 = 83.33
        let result = classify("great food, awesome staff, poor parking");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.confidence, 83);

        // 3 negative, 1 positive: 60 + 0.75 * 35 = 86.25
        let result = classify("awful, sad and useless but happy");
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.confidence, 86);
        assert_eq!(
            result.summary,
            "Negative sentiment detected with 3 negative indicators"
        );
    }

    #[test]
    fn single_indicator_summary_is_singular() {
        let result = classify("Such a HAPPY moment");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(
            result.summary,
            "Positive sentiment detected with 1 positive indicator"
        );
    }

    #[test]
    fn substring_tokens_match() {
        let counts = Classifier::new().count("Amazingly hateful");
        assert_eq!(counts, IndicatorCounts { positive: 1, negative: 1 });
    }

    #[test]
    fn token_matching_both_lists_counts_on_both_sides() {
        let classifier = Classifier::with_lexicon(Lexicon::new(["love"], ["hate"]));
        let counts = classifier.count("lovehate");
        assert_eq!(counts, IndicatorCounts { positive: 1, negative: 1 });
        assert_eq!(classifier.classify("lovehate").sentiment, Sentiment::Neutral);
    }

    #[test]
    fn token_matching_several_entries_counts_once() {
        // "bestgood" contains two positive entries
        let counts = Classifier::new().count("bestgood");
        assert_eq!(counts.positive, 1);
    }

    #[test]
    fn empty_text_is_neutral() {
        let result = classify("   ");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, NEUTRAL_CONFIDENCE);
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    proptest! {
        #[test]
        fn confidence_stays_in_range(text in "[a-zA-Z ]{0,80}") {
            let result = classify(&text);
            prop_assert!(
                result.confidence == 50 || (60..=95).contains(&result.confidence),
                "confidence {} out of range", result.confidence
            );
        }

        #[test]
        fn confidence_in_range_for_lexicon_words(
            words in proptest::collection::vec(
                proptest::sample::select(
                    crate::lexicon::POSITIVE_WORDS
                        .iter()
                        .chain(crate::lexicon::NEGATIVE_WORDS.iter())
                        .copied()
                        .collect::<Vec<_>>()
                ),
                0..12,
            )
        ) {
            let text = words.join(" ");
            let result = classify(&text);
            prop_assert!(result.confidence == 50 || (60..=95).contains(&result.confidence));
        }

        #[test]
        fn classification_is_pure(text in ".{0,120}") {
            prop_assert_eq!(classify(&text), classify(&text));
        }
    }
}
