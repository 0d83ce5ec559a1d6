//! Mutable session state guarded by the orchestrator's mutex.

use std::collections::HashMap;

use chrono::TimeDelta;
use tokio_util::sync::CancellationToken;

use roundtable_types::agent::AgentId;
use roundtable_types::config::ConversationConfig;
use roundtable_types::conversation::{ConversationStatus, Emotion};
use roundtable_types::message::Message;

use crate::turn::TurnSelector;

/// Identity of one driver loop run.
///
/// A loop may act on the session only while its epoch is the session's
/// current epoch and its token has not been cancelled.
#[derive(Debug, Clone)]
pub(crate) struct RunTicket {
    pub epoch: u64,
    pub abort: CancellationToken,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub messages: Vec<Message>,
    pub status: ConversationStatus,
    pub topic: String,
    pub emotions: HashMap<AgentId, Emotion>,
    pub speaking: Option<AgentId>,
    pub generating: bool,
    pub config: ConversationConfig,
    pub selector: TurnSelector,
    pub epoch: u64,
    pub abort: CancellationToken,
    /// A driver loop for the current epoch exists and has not yet exited.
    pub driver_alive: bool,
}

impl SessionState {
    pub fn new(config: ConversationConfig, selector: TurnSelector) -> Self {
        Self {
            messages: Vec::new(),
            status: ConversationStatus::Idle,
            topic: String::new(),
            emotions: HashMap::new(),
            speaking: None,
            generating: false,
            config,
            selector,
            epoch: 0,
            abort: CancellationToken::new(),
            driver_alive: false,
        }
    }

    /// Append to the log, keeping timestamps strictly increasing.
    /// Returns the new message's index.
    pub fn append(&mut self, mut message: Message) -> usize {
        if let Some(last) = self.messages.last() {
            if message.timestamp <= last.timestamp {
                message.timestamp = last.timestamp + TimeDelta::microseconds(1);
            }
        }
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Invalidate the current driver: bump the epoch and cancel its token.
    pub fn invalidate(&mut self) {
        self.abort.cancel();
        self.epoch += 1;
        self.driver_alive = false;
    }

    /// Hand out a ticket for a new driver loop.
    pub fn arm(&mut self) -> RunTicket {
        self.epoch += 1;
        self.abort = CancellationToken::new();
        self.driver_alive = true;
        RunTicket {
            epoch: self.epoch,
            abort: self.abort.clone(),
        }
    }

    /// `ticket`'s loop still owns the session.
    pub fn owns(&self, ticket: &RunTicket) -> bool {
        self.epoch == ticket.epoch && !ticket.abort.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::agent::{Agent, GenerationProvider};

    fn state() -> SessionState {
        SessionState::new(ConversationConfig::default(), TurnSelector::default())
    }

    #[test]
    fn test_append_keeps_timestamps_increasing() {
        let mut state = state();
        let ada = Agent::new("Ada", "logician", GenerationProvider::OpenAi);
        let first = Message::topic("chess");
        let mut second = Message::from_agent(&ada, "x1");
        second.timestamp = first.timestamp;

        assert_eq!(state.append(first), 0);
        assert_eq!(state.append(second), 1);
        assert!(state.messages[1].timestamp > state.messages[0].timestamp);
    }

    #[test]
    fn test_invalidate_revokes_ticket() {
        let mut state = state();
        let ticket = state.arm();
        assert!(state.owns(&ticket));
        assert!(state.driver_alive);

        state.invalidate();
        assert!(!state.owns(&ticket));
        assert!(!state.driver_alive);
        assert!(ticket.abort.is_cancelled());

        let next = state.arm();
        assert!(state.owns(&next));
        assert!(next.epoch > ticket.epoch);
    }
}
