use std::fmt;

use crate::{EntityId, program::Program};

/// The agent capability: a performance score plus the program that decides
/// what the agent does.
pub struct AgentBody<P, A> {
    alive: bool,
    performance: i64,
    program: Box<dyn Program<P, A>>,
}

impl<P, A> AgentBody<P, A> {
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Accumulated score.
    pub fn performance(&self) -> i64 {
        self.performance
    }

    /// Adjusts the score. Meant to be called from an environment's
    /// `execute_action` only.
    pub fn add_performance(&mut self, delta: i64) {
        self.performance += delta;
    }

    pub(crate) fn reset_performance(&mut self) {
        self.performance = 0;
    }

    pub(crate) fn execute(&mut self, percept: P) -> Option<A> {
        self.program.execute(percept)
    }
}

impl<P, A> fmt::Debug for AgentBody<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentBody")
            .field("alive", &self.alive)
            .field("performance", &self.performance)
            .finish_non_exhaustive()
    }
}

/// What an entity is able to do.
#[derive(Debug)]
pub enum Role<P, A> {
    /// An inert object. Never alive.
    Thing,
    Agent(AgentBody<P, A>),
}

/// Any object placeable in an environment.
///
/// `L` is the location type, `P`/`A` the percept and action types of the
/// environment the entity is meant for.
#[derive(Debug)]
pub struct Entity<L, P, A> {
    id: EntityId,
    location: Option<L>,
    role: Role<P, A>,
}

impl<L, P, A> Entity<L, P, A> {
    /// Creates an inert thing with no location.
    pub fn thing(id: EntityId) -> Self {
        Self {
            id,
            location: None,
            role: Role::Thing,
        }
    }

    /// Creates a live agent driven by `program`, with performance 0.
    pub fn agent(id: EntityId, program: impl Program<P, A> + 'static) -> Self {
        Self {
            id,
            location: None,
            role: Role::Agent(AgentBody {
                alive: true,
                performance: 0,
                program: Box::new(program),
            }),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn location(&self) -> Option<&L> {
        self.location.as_ref()
    }

    pub fn set_location(&mut self, location: Option<L>) {
        self.location = location;
    }

    pub fn role(&self) -> &Role<P, A> {
        &self.role
    }

    pub fn is_agent(&self) -> bool {
        matches!(self.role, Role::Agent(_))
    }

    /// True only for agents that have not been killed.
    pub fn is_alive(&self) -> bool {
        match &self.role {
            Role::Agent(body) => body.alive,
            Role::Thing => false,
        }
    }

    /// Marks an agent as no longer alive. There is no way back.
    pub fn kill(&mut self) {
        if let Role::Agent(body) = &mut self.role {
            body.alive = false;
        }
    }

    pub fn as_agent(&self) -> Option<&AgentBody<P, A>> {
        match &self.role {
            Role::Agent(body) => Some(body),
            Role::Thing => None,
        }
    }

    pub fn as_agent_mut(&mut self) -> Option<&mut AgentBody<P, A>> {
        match &mut self.role {
            Role::Agent(body) => Some(body),
            Role::Thing => None,
        }
    }

    /// Performance of an agent, `None` for things.
    pub fn performance(&self) -> Option<i64> {
        self.as_agent().map(|body| body.performance)
    }

    /// Debug description of the entity's internal state. Never affects the
    /// simulation.
    pub fn show_state(&self) -> String {
        match &self.role {
            Role::Agent(body) => body
                .program
                .show_state()
                .unwrap_or_else(|| format!("Agent {} has no state to show", self.id)),
            Role::Thing => format!("Thing {} has no state to show", self.id),
        }
    }

    /// Whether this entity may pick up `thing`. Things never grab.
    pub fn can_grab(&self, thing: &Entity<L, P, A>) -> bool {
        match &self.role {
            Role::Agent(body) => body.program.can_grab(thing.id),
            Role::Thing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestEntity = Entity<u8, u8, u8>;

    #[test]
    fn test_things_are_never_alive() {
        let mut thing = TestEntity::thing(0);
        assert!(!thing.is_alive());
        assert!(!thing.is_agent());
        assert_eq!(thing.performance(), None);
        thing.kill();
        assert!(!thing.is_alive());
    }

    #[test]
    fn test_agents_start_alive_and_can_be_killed() {
        let mut agent = TestEntity::agent(1, |p: u8| Some(p));
        assert!(agent.is_alive());
        assert_eq!(agent.performance(), Some(0));
        agent.kill();
        assert!(!agent.is_alive());
        assert!(agent.is_agent());
    }

    #[test]
    fn test_performance_changes_go_through_the_body() {
        let mut agent = TestEntity::agent(2, |_: u8| None);
        let body = agent.as_agent_mut().unwrap();
        body.add_performance(10);
        body.add_performance(-3);
        assert_eq!(body.performance(), 7);
        assert_eq!(agent.performance(), Some(7));
        agent.as_agent_mut().unwrap().reset_performance();
        assert_eq!(agent.performance(), Some(0));
    }

    #[test]
    fn test_show_state_and_can_grab_defaults() {
        let agent = TestEntity::agent(3, |_: u8| None);
        let thing = TestEntity::thing(4);
        assert_eq!(agent.show_state(), "Agent 3 has no state to show");
        assert_eq!(thing.show_state(), "Thing 4 has no state to show");
        assert!(!agent.can_grab(&thing));
        assert!(!thing.can_grab(&agent));
    }
}
