//! Transcript rendering for conversation events.

use std::collections::HashMap;

use console::{Style, style};

use roundtable_types::agent::AgentId;
use roundtable_types::conversation::{ConversationStatus, Emotion};
use roundtable_types::event::{ConversationEvent, Severity};
use roundtable_types::message::{Message, Speaker};

/// Turns [`ConversationEvent`]s into printable lines.
///
/// Remembers each agent's last emotion so it can be shown next to the
/// agent's next line.
#[derive(Debug, Default)]
pub struct TranscriptRenderer {
    emotions: HashMap<AgentId, Emotion>,
}

impl TranscriptRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The line to print for `event`, if any.
    pub fn render(&mut self, event: &ConversationEvent) -> Option<String> {
        match event {
            ConversationEvent::MessageAppended { message, .. } => Some(self.render_message(message)),
            ConversationEvent::StatusChanged { status } => Some(render_status(*status)),
            ConversationEvent::EmotionChanged { agent_id, emotion } => {
                self.emotions.insert(*agent_id, *emotion);
                None
            }
            ConversationEvent::Notice { message, severity } => Some(render_notice(message, *severity)),
            ConversationEvent::GeneratingChanged { .. } | ConversationEvent::SpeakingChanged { .. } => None,
        }
    }

    fn render_message(&self, message: &Message) -> String {
        match message.speaker {
            Speaker::System => format!("\n  {}\n", style(&message.content).dim().italic()),
            Speaker::Human => format!(
                "  {} {}",
                style(format!("{}:", message.speaker_name)).white().bold(),
                message.content
            ),
            Speaker::Agent(id) => {
                let mood = self
                    .emotions
                    .get(&id)
                    .and_then(|e| emotion_marker(*e))
                    .map(|m| format!(" {m}"))
                    .unwrap_or_default();
                format!(
                    "  {}{} {}",
                    hex_style(&message.color).bold().apply_to(&message.speaker_name),
                    mood,
                    message.content
                )
            }
        }
    }
}

fn render_status(status: ConversationStatus) -> String {
    let text = match status {
        ConversationStatus::Running => "(conversation running)",
        ConversationStatus::Paused => "(paused; /resume to continue)",
        ConversationStatus::Idle => "(conversation stopped)",
    };
    format!("  {}", style(text).dim())
}

fn render_notice(message: &str, severity: Severity) -> String {
    let marker = match severity {
        Severity::Info => style("i").cyan().bold(),
        Severity::Warning => style("!").yellow().bold(),
        Severity::Error => style("!").red().bold(),
    };
    format!("  {marker} {message}")
}

fn emotion_marker(emotion: Emotion) -> Option<&'static str> {
    match emotion {
        Emotion::Neutral => None,
        Emotion::Happy => Some("(happy)"),
        Emotion::Angry => Some("(angry)"),
        Emotion::Thinking => Some("(thinking)"),
        Emotion::Surprised => Some("(surprised)"),
    }
}

/// Closest xterm-256 color for a `#RRGGBB` string; cyan when unparsable.
fn hex_style(hex: &str) -> Style {
    match parse_hex(hex) {
        Some((r, g, b)) => Style::new().color256(cube_index(r, g, b)),
        None => Style::new().cyan(),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Index into the 6x6x6 color cube (16..=231).
fn cube_index(r: u8, g: u8, b: u8) -> u8 {
    let level = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}
