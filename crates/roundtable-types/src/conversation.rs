//! Session-level enums: lifecycle status, turn policy, emotion labels,
//! and the ten-step utterance length scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a conversation session.
///
/// - Idle: no loop; `start` is allowed
/// - Running: the turn loop is executing
/// - Paused: suspended between turns; the log is kept and `resume` continues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Idle,
    Running,
    Paused,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Idle => write!(f, "idle"),
            ConversationStatus::Running => write!(f, "running"),
            ConversationStatus::Paused => write!(f, "paused"),
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(ConversationStatus::Idle),
            "running" => Ok(ConversationStatus::Running),
            "paused" => Ok(ConversationStatus::Paused),
            other => Err(format!("invalid conversation status: '{other}'")),
        }
    }
}

/// How the next speaker is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnMode {
    #[default]
    RoundRobin,
    Random,
}

impl fmt::Display for TurnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnMode::RoundRobin => write!(f, "round-robin"),
            TurnMode::Random => write!(f, "random"),
        }
    }
}

impl FromStr for TurnMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round-robin" | "round_robin" | "roundrobin" => Ok(TurnMode::RoundRobin),
            "random" => Ok(TurnMode::Random),
            other => Err(format!("invalid turn mode: '{other}'")),
        }
    }
}

/// Presentation label for an agent's current mood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Neutral,
    Happy,
    Angry,
    Thinking,
    Surprised,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emotion::Neutral => write!(f, "neutral"),
            Emotion::Happy => write!(f, "happy"),
            Emotion::Angry => write!(f, "angry"),
            Emotion::Thinking => write!(f, "thinking"),
            Emotion::Surprised => write!(f, "surprised"),
        }
    }
}

/// Utterance length on a 1..=10 scale (1 = a few words, 10 = exhaustive).
///
/// Out-of-range values are clamped on construction and deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct LengthLevel(u8);

impl LengthLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Output token cap matching the level.
    pub fn max_tokens(&self) -> u32 {
        match self.0 {
            1 => 50,
            2 => 100,
            3 => 150,
            4 => 250,
            5 => 400,
            6 => 600,
            7 => 900,
            8 => 1300,
            9 => 1800,
            _ => 2500,
        }
    }
}

impl Default for LengthLevel {
    fn default() -> Self {
        Self(5)
    }
}

impl From<u8> for LengthLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<LengthLevel> for u8 {
    fn from(level: LengthLevel) -> Self {
        level.0
    }
}
