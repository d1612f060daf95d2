//! Moodscan Sentiment Classifier
//!
//! Stateless, deterministic scoring of plain text against two fixed
//! lexicons. There is no learned model: the same input always yields the
//! same sentiment, confidence, and summary.

pub mod classifier;
pub mod lexicon;

pub use classifier::*;
pub use lexicon::Lexicon;
