use serde::{Deserialize, Serialize};

use crate::agent::VoiceProvider;

/// Suffix appended when speech text is cut at the character cap.
pub const TRUNCATION_MARKER: &str = "...";

/// One speech-synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub provider: VoiceProvider,
    pub voice_id: String,
    /// Playback speed hint; only some providers honor it.
    pub speed: f64,
}

/// Cut `text` to at most `limit` characters, marking the cut.
///
/// Counts `char`s rather than bytes so multi-byte text is never split
/// inside a code point.
pub fn truncate_for_speech(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_for_speech("hello", 500), "hello");
        let exact = "a".repeat(500);
        assert_eq!(truncate_for_speech(&exact, 500), exact);
    }

    #[test]
    fn test_long_text_cut_at_limit() {
        let long = "b".repeat(501);
        let cut = truncate_for_speech(&long, 500);
        assert_eq!(cut.len(), 503);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_multibyte_text_cut_on_char_boundary() {
        let long = "ї".repeat(600);
        let cut = truncate_for_speech(&long, 500);
        assert_eq!(cut.chars().count(), 503);
    }
}
