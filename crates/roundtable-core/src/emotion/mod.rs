//! Emotional context analysis.
//!
//! - `analyzer`: the [`EmotionAnalyzer`](analyzer::EmotionAnalyzer) trait and
//!   the keyword heuristic used by default

pub mod analyzer;

pub use analyzer::{EmotionAnalyzer, EmotionMarkers, EmotionReading, KeywordEmotionAnalyzer};
