//! Emotion analyzer: derives an agent's mood from the tail of the log.
//!
//! The result has two parts. The label is shown next to the agent; the
//! directive (if any) is appended to that agent's next system prompt and
//! never stored in the log.

use std::collections::HashSet;

use roundtable_types::agent::Agent;
use roundtable_types::config::EmotionConfig;
use roundtable_types::conversation::Emotion;
use roundtable_types::message::{Message, Speaker};

/// Outcome of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmotionReading {
    pub emotion: Emotion,
    /// Hint for the next generation request. `None` for label-only moods.
    pub directive: Option<String>,
}

impl EmotionReading {
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Pluggable mood classifier consulted before every generation request.
pub trait EmotionAnalyzer: Send + Sync {
    /// Classify `agent`'s mood from `recent` (the log, oldest first).
    fn analyze(&self, agent: &Agent, recent: &[Message]) -> EmotionReading;
}

/// Marker vocabularies, matched case-insensitively on word boundaries.
#[derive(Debug, Clone)]
pub struct EmotionMarkers {
    pub agreement: Vec<String>,
    pub criticism: Vec<String>,
    pub contrast: Vec<String>,
    pub surprise: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for EmotionMarkers {
    fn default() -> Self {
        Self {
            agreement: owned(&[
                "agree",
                "exactly",
                "good point",
                "you're right",
                "well said",
                "absolutely",
                "згоден",
                "згодна",
                "саме так",
                "слушно",
            ]),
            criticism: owned(&[
                "wrong",
                "nonsense",
                "ridiculous",
                "absurd",
                "naive",
                "foolish",
                "неправий",
                "неправа",
                "нісенітниця",
                "абсурд",
            ]),
            contrast: owned(&[
                "but",
                "however",
                "disagree",
                "on the other hand",
                "although",
                "але",
                "однак",
                "проте",
            ]),
            surprise: owned(&[
                "?",
                "wow",
                "really",
                "unexpected",
                "surprising",
                "невже",
                "справді",
                "ого",
            ]),
        }
    }
}

/// Keyword heuristic over a trailing window of messages.
///
/// Precedence, first match wins: happy, angry, thinking, surprised,
/// neutral.
#[derive(Debug, Clone, Default)]
pub struct KeywordEmotionAnalyzer {
    config: EmotionConfig,
    markers: EmotionMarkers,
}

impl KeywordEmotionAnalyzer {
    pub fn new(config: EmotionConfig) -> Self {
        Self {
            config,
            markers: EmotionMarkers::default(),
        }
    }

    pub fn with_markers(mut self, markers: EmotionMarkers) -> Self {
        self.markers = markers;
        self
    }
}

impl EmotionAnalyzer for KeywordEmotionAnalyzer {
    fn analyze(&self, agent: &Agent, recent: &[Message]) -> EmotionReading {
        let start = recent.len().saturating_sub(self.config.window);
        let window = &recent[start..];
        if window.len() < 2 {
            return EmotionReading::neutral();
        }

        let is_other = |m: &Message| m.speaker != Speaker::System && !m.is_from(&agent.id);
        let Some(latest) = window.iter().rev().find(|m| is_other(m)) else {
            return EmotionReading::neutral();
        };
        let text = latest.content.to_lowercase();
        let other_voices: HashSet<Speaker> =
            window.iter().filter(|m| is_other(m)).map(|m| m.speaker).collect();

        if any_marker(&text, &self.markers.agreement)
            && (has_marker(&text, &agent.name.to_lowercase()) || other_voices.len() == 1)
        {
            return EmotionReading {
                emotion: Emotion::Happy,
                directive: Some(format!(
                    "{} agrees with you. Respond warmly and build on the shared point.",
                    latest.speaker_name
                )),
            };
        }

        if any_marker(&text, &self.markers.criticism) {
            return EmotionReading {
                emotion: Emotion::Angry,
                directive: Some(format!(
                    "{} just criticized your position. Defend it firmly but stay civil.",
                    latest.speaker_name
                )),
            };
        }

        let contrastive = window
            .iter()
            .filter(|m| m.speaker != Speaker::System)
            .filter(|m| any_marker(&m.content.to_lowercase(), &self.markers.contrast))
            .count();
        if contrastive >= self.config.heated_debate_threshold {
            return EmotionReading {
                emotion: Emotion::Thinking,
                directive: Some(
                    "The debate is getting heated. Weigh the opposing arguments carefully before you answer."
                        .to_string(),
                ),
            };
        }

        if any_marker(&text, &self.markers.surprise) {
            return EmotionReading {
                emotion: Emotion::Surprised,
                directive: None,
            };
        }

        EmotionReading::neutral()
    }
}

fn any_marker(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| has_marker(text, m))
}

/// `true` if `marker` occurs in `text` as a whole word (or phrase).
///
/// Boundaries are only enforced on sides where the marker itself starts or
/// ends with an alphanumeric character, so punctuation markers like `?`
/// match anywhere.
fn has_marker(text: &str, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    let check_start = marker.chars().next().is_some_and(char::is_alphanumeric);
    let check_end = marker.chars().last().is_some_and(char::is_alphanumeric);

    text.match_indices(marker).any(|(idx, _)| {
        let before_ok = !check_start
            || text[..idx]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = !check_end
            || text[idx + marker.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::agent::GenerationProvider;

    fn agent(name: &str) -> Agent {
        Agent::new(name, "persona", GenerationProvider::OpenAi)
    }

    fn analyzer() -> KeywordEmotionAnalyzer {
        KeywordEmotionAnalyzer::new(EmotionConfig::default())
    }

    #[test]
    fn test_short_log_is_neutral() {
        let ada = agent("Ada");
        let log = vec![Message::topic("chess")];
        assert_eq!(analyzer().analyze(&ada, &log), EmotionReading::neutral());
    }

    #[test]
    fn test_only_own_messages_is_neutral() {
        let ada = agent("Ada");
        let log = vec![
            Message::topic("chess"),
            Message::from_agent(&ada, "I agree with myself, wow?"),
        ];
        assert_eq!(analyzer().analyze(&ada, &log), EmotionReading::neutral());
    }

    #[test]
    fn test_agreement_from_sole_other_voice_is_happy() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::topic("chess"),
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&bo, "Exactly, well put."),
        ];
        let reading = analyzer().analyze(&ada, &log);
        assert_eq!(reading.emotion, Emotion::Happy);
        assert!(reading.directive.unwrap().contains("Bo"));
    }

    #[test]
    fn test_agreement_needs_name_when_several_voices() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let cy = agent("Cy");
        let log = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&cy, "Endgames matter more."),
            Message::from_agent(&bo, "I agree with that."),
        ];
        assert_eq!(analyzer().analyze(&ada, &log).emotion, Emotion::Neutral);

        let named = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&cy, "Endgames matter more."),
            Message::from_agent(&bo, "I agree with Ada."),
        ];
        assert_eq!(analyzer().analyze(&ada, &named).emotion, Emotion::Happy);
    }

    #[test]
    fn test_custom_markers_replace_vocabulary() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&bo, "Indubitably."),
        ];
        assert_eq!(analyzer().analyze(&ada, &log).emotion, Emotion::Neutral);

        let markers = EmotionMarkers {
            agreement: vec!["indubitably".to_string()],
            ..EmotionMarkers::default()
        };
        let custom = analyzer().with_markers(markers);
        assert_eq!(custom.analyze(&ada, &log).emotion, Emotion::Happy);

        let exactly = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&bo, "Exactly."),
        ];
        assert_eq!(custom.analyze(&ada, &exactly).emotion, Emotion::Neutral);
    }

    #[test]
    fn test_disagree_does_not_count_as_agreement() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&bo, "I disagree."),
        ];
        assert_ne!(analyzer().analyze(&ada, &log).emotion, Emotion::Happy);
    }

    #[test]
    fn test_criticism_is_angry() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&bo, "That is simply wrong."),
        ];
        let reading = analyzer().analyze(&ada, &log);
        assert_eq!(reading.emotion, Emotion::Angry);
        assert!(reading.directive.is_some());
    }

    #[test]
    fn test_contrastive_window_is_thinking() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::from_agent(&ada, "Tactics win games, but strategy wins matches."),
            Message::from_agent(&bo, "However, time trouble decides most games."),
        ];
        let reading = analyzer().analyze(&ada, &log);
        assert_eq!(reading.emotion, Emotion::Thinking);
        assert!(reading.directive.is_some());
    }

    #[test]
    fn test_heated_threshold_is_configurable() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::from_agent(&ada, "Tactics win games, but strategy wins matches."),
            Message::from_agent(&bo, "However, time trouble decides most games."),
        ];
        let strict = KeywordEmotionAnalyzer::new(EmotionConfig {
            window: 5,
            heated_debate_threshold: 3,
        });
        assert_eq!(strict.analyze(&ada, &log).emotion, Emotion::Neutral);
    }

    #[test]
    fn test_question_is_surprised_without_directive() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::from_agent(&bo, "Is that so?"),
        ];
        let reading = analyzer().analyze(&ada, &log);
        assert_eq!(reading.emotion, Emotion::Surprised);
        assert!(reading.directive.is_none());
    }

    #[test]
    fn test_human_interjection_counts_as_other_voice() {
        let ada = agent("Ada");
        let log = vec![
            Message::from_agent(&ada, "Openings matter most."),
            Message::interjection("Nonsense."),
        ];
        assert_eq!(analyzer().analyze(&ada, &log).emotion, Emotion::Angry);
    }

    #[test]
    fn test_only_trailing_window_is_inspected() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let mut log = vec![Message::from_agent(&bo, "That is wrong, Ada.")];
        for _ in 0..5 {
            log.push(Message::from_agent(&ada, "Openings matter most."));
        }
        assert_eq!(analyzer().analyze(&ada, &log), EmotionReading::neutral());
    }

    #[test]
    fn test_ukrainian_markers() {
        let ada = agent("Ada");
        let bo = agent("Bo");
        let log = vec![
            Message::from_agent(&ada, "Дебюти найважливіші."),
            Message::from_agent(&bo, "Саме так!"),
        ];
        assert_eq!(analyzer().analyze(&ada, &log).emotion, Emotion::Happy);
    }

    #[test]
    fn test_has_marker_respects_word_boundaries() {
        assert!(has_marker("i agree.", "agree"));
        assert!(!has_marker("i disagree.", "agree"));
        assert!(!has_marker("butter", "but"));
        assert!(has_marker("really?", "?"));
        assert!(has_marker("well, on the other hand, no", "on the other hand"));
    }
}
