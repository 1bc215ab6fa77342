use crate::agent::{Agent, AgentId, AgentKind};
use crate::command::CommandError;
use log::debug;

/// Largest population a positive delta may grow a collection to.
pub const MAX_POPULATION: usize = 1_000_000;

/// Outcome of a population delta command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopulationChange {
    pub added: usize,
    pub removed: usize,
}

/// Ordered collection of one kind of agent, oldest first.
#[derive(Debug, Clone)]
pub struct Population {
    kind: AgentKind,
    agents: Vec<Agent>,
    next_id: AgentId,
}

impl Population {
    pub fn new(kind: AgentKind) -> Self {
        Self { kind, agents: Vec::new(), next_id: 0 }
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Applies a signed population delta. Positive values append freshly
    /// spawned agents, negative values evict the oldest agents (never more
    /// than exist), zero does nothing.
    ///
    /// A positive delta that would take the population past
    /// [`MAX_POPULATION`] is rejected before anything is spawned.
    pub fn apply_delta<F>(
        &mut self,
        delta: i64,
        mut spawn: F,
    ) -> Result<PopulationChange, CommandError>
    where
        F: FnMut(AgentId) -> Agent,
    {
        let mut change = PopulationChange::default();
        if delta > 0 {
            let requested = usize::try_from(delta)
                .ok()
                .filter(|&n| self.agents.len().saturating_add(n) <= MAX_POPULATION)
                .ok_or_else(|| CommandError::InvalidDelta(delta.to_string()))?;
            self.agents.reserve(requested);
            for _ in 0..requested {
                let id = self.allocate_id();
                self.agents.push(spawn(id));
                change.added += 1;
            }
        } else if delta < 0 {
            let count = usize::try_from(delta.unsigned_abs())
                .unwrap_or(usize::MAX)
                .min(self.agents.len());
            self.agents.drain(..count);
            change.removed = count;
        }
        if change != PopulationChange::default() {
            debug!(
                "{:?} population delta {}: +{} -{} (now {})",
                self.kind, delta, change.added, change.removed, self.agents.len()
            );
        }
        Ok(change)
    }

    pub fn add_one<F>(&mut self, spawn: F) -> AgentId
    where
        F: FnOnce(AgentId) -> Agent,
    {
        let id = self.allocate_id();
        self.agents.push(spawn(id));
        id
    }

    /// Evicts the oldest agent.
    pub fn remove_one(&mut self) -> Option<Agent> {
        if self.agents.is_empty() {
            None
        } else {
            Some(self.agents.remove(0))
        }
    }

    /// Appends an agent built by the caller, assigning it a fresh id.
    pub fn insert(&mut self, mut agent: Agent) -> AgentId {
        let id = self.allocate_id();
        agent.id = id;
        agent.kind = self.kind;
        self.agents.push(agent);
        id
    }

    /// Removes every agent whose mark is set, keeping the survivors in order,
    /// and returns the removed agents. `marks` is indexed like the collection.
    pub fn retain_unmarked(&mut self, marks: &[bool]) -> Vec<Agent> {
        debug_assert_eq!(marks.len(), self.agents.len());
        let mut removed = Vec::new();
        let mut survivors = Vec::with_capacity(self.agents.len());
        for (idx, agent) in self.agents.drain(..).enumerate() {
            if marks.get(idx).copied().unwrap_or(false) {
                removed.push(agent);
            } else {
                survivors.push(agent);
            }
        }
        self.agents = survivors;
        removed
    }

    pub fn clear(&mut self) {
        self.agents.clear();
    }

    pub fn as_slice(&self) -> &[Agent] {
        &self.agents
    }

    pub fn as_mut_slice(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
