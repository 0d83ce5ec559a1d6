//! Agent roster boundary.
//!
//! The roster is owned by the surrounding application and may change between
//! turns; the orchestrator re-reads it every time it picks a speaker.

use std::sync::{Arc, RwLock};

use roundtable_types::agent::{Agent, eligible_agents};

/// Read access to the current set of agents.
pub trait AgentRoster: Send + Sync {
    /// All configured agents, in display order.
    fn agents(&self) -> Vec<Agent>;

    /// Agents allowed to take a turn right now.
    fn eligible(&self) -> Vec<Agent> {
        eligible_agents(&self.agents())
    }
}

/// Roster shared between an editor and a running conversation.
///
/// Cloning produces a shared view (backed by `Arc<RwLock<...>>`).
#[derive(Debug, Clone, Default)]
pub struct SharedRoster {
    agents: Arc<RwLock<Vec<Agent>>>,
}

impl SharedRoster {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents: Arc::new(RwLock::new(agents)),
        }
    }

    /// Replace the whole roster.
    pub fn replace(&self, agents: Vec<Agent>) {
        *self.agents.write().expect("roster lock poisoned") = agents;
    }

    /// Edit the roster in place.
    pub fn update<F: FnOnce(&mut Vec<Agent>)>(&self, f: F) {
        let mut agents = self.agents.write().expect("roster lock poisoned");
        f(&mut agents);
    }
}

impl AgentRoster for SharedRoster {
    fn agents(&self) -> Vec<Agent> {
        self.agents.read().expect("roster lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_types::agent::GenerationProvider;

    #[test]
    fn test_clone_shares_roster() {
        let roster = SharedRoster::new(vec![Agent::new("Ada", "logician", GenerationProvider::OpenAi)]);
        let view = roster.clone();
        roster.update(|agents| agents.push(Agent::new("Bo", "skeptic", GenerationProvider::Claude)));
        assert_eq!(view.agents().len(), 2);
    }

    #[test]
    fn test_eligible_filters_disabled() {
        let mut bo = Agent::new("Bo", "skeptic", GenerationProvider::Claude);
        bo.enabled = false;
        let roster = SharedRoster::new(vec![Agent::new("Ada", "logician", GenerationProvider::OpenAi), bo]);
        let eligible = roster.eligible();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].name, "Ada");
    }
}
