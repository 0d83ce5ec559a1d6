//! Turn selector: picks the next speaker from the eligible roster.
//!
//! Round-robin mode rotates a cursor over the roster; random mode draws
//! uniformly but tries not to hand the floor back to whoever spoke last.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use roundtable_types::agent::{Agent, AgentId};
use roundtable_types::conversation::TurnMode;
use roundtable_types::message::Message;

/// Stateful speaker picker. The only state is the rotation cursor (and the
/// random source).
#[derive(Debug)]
pub struct TurnSelector {
    cursor: usize,
    max_redraws: u32,
    rng: StdRng,
}

impl TurnSelector {
    pub fn new(max_redraws: u32) -> Self {
        Self {
            cursor: 0,
            max_redraws,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic random source, for tests and replays.
    pub fn with_seed(max_redraws: u32, seed: u64) -> Self {
        Self {
            cursor: 0,
            max_redraws,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Rewind the rotation to the first agent.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Pick the next speaker, or `None` when `eligible` is empty.
    ///
    /// `last_message` is the newest log entry; in random mode its author is
    /// avoided while more than one agent is eligible. `max_redraws` caps the
    /// total number of draws, the first one included.
    pub fn select_next(
        &mut self,
        eligible: &[Agent],
        last_message: Option<&Message>,
        mode: TurnMode,
    ) -> Option<Agent> {
        if eligible.is_empty() {
            return None;
        }

        match mode {
            TurnMode::RoundRobin => {
                let idx = self.cursor % eligible.len();
                self.cursor = (idx + 1) % eligible.len();
                Some(eligible[idx].clone())
            }
            TurnMode::Random => {
                let last: Option<AgentId> = last_message.and_then(|m| m.speaker.agent_id());
                let mut idx = self.rng.gen_range(0..eligible.len());
                let mut draws = 1;
                while eligible.len() > 1
                    && Some(eligible[idx].id) == last
                    && draws < self.max_redraws
                {
                    idx = self.rng.gen_range(0..eligible.len());
                    draws += 1;
                }
                Some(eligible[idx].clone())
            }
        }
    }
}

impl Default for TurnSelector {
    fn default() -> Self {
        Self::new(10)
    }
}
