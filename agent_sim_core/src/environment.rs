use std::fmt::Debug;

use tracing::{debug, error, warn};

use crate::{
    EntityId,
    agent::Entity,
    error::{RegistryError, SimError},
    program::Program,
};

/// Default step budget for [`Environment::run`].
pub const DEFAULT_RUN_STEPS: usize = 1000;

/// Ordered store of every entity in an environment.
///
/// `things` keeps insertion order and unique ids. `agents` holds the ids of
/// the agent entities in the same relative order.
#[derive(Debug)]
pub struct Registry<L, P, A> {
    things: Vec<Entity<L, P, A>>,
    agents: Vec<EntityId>,
    next_entity_id: EntityId,
}

impl<L, P, A> Default for Registry<L, P, A> {
    fn default() -> Self {
        Self {
            things: Vec::new(),
            agents: Vec::new(),
            next_entity_id: 0,
        }
    }
}

impl<L: Clone + Debug, P, A> Registry<L, P, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates an id above every id seen so far. Once `EntityId::MAX` is
    /// handed out it keeps being returned, and adding it again is rejected
    /// as a duplicate.
    pub fn reserve_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        id
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.things.iter().any(|thing| thing.id() == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity<L, P, A>> {
        self.things.iter().find(|thing| thing.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity<L, P, A>> {
        self.things.iter_mut().find(|thing| thing.id() == id)
    }

    /// All entities in insertion order.
    pub fn things(&self) -> &[Entity<L, P, A>] {
        &self.things
    }

    /// Agent ids in insertion order.
    pub fn agent_ids(&self) -> &[EntityId] {
        &self.agents
    }

    pub fn agents(&self) -> impl Iterator<Item = &Entity<L, P, A>> {
        self.things.iter().filter(|thing| thing.is_agent())
    }

    /// `(id, location)` for every entity, used in diagnostics.
    pub fn snapshot(&self) -> Vec<(EntityId, Option<L>)> {
        self.things
            .iter()
            .map(|thing| (thing.id(), thing.location().cloned()))
            .collect()
    }

    /// Done once no agent is alive; an environment without agents is done.
    pub fn is_done(&self) -> bool {
        !self.agents().any(|agent| agent.is_alive())
    }

    /// Registers `entity` at `location`.
    ///
    /// An entity whose id is already registered is rejected and the registry
    /// stays as it was. Agents get their performance reset to 0.
    pub fn insert(
        &mut self,
        mut entity: Entity<L, P, A>,
        location: Option<L>,
    ) -> Result<EntityId, RegistryError<L>> {
        let id = entity.id();
        if self.contains(id) {
            warn!(
                operation = "add",
                entity = id,
                registry = ?self.snapshot(),
                "Can't add the same thing twice"
            );
            return Err(RegistryError::DuplicateEntity { id });
        }

        entity.set_location(location);
        if let Some(body) = entity.as_agent_mut() {
            body.reset_performance();
            self.agents.push(id);
        }
        debug!(entity = id, location = ?entity.location(), agent = entity.is_agent(), "Added entity");
        self.things.push(entity);
        self.next_entity_id = self.next_entity_id.max(id.saturating_add(1));
        Ok(id)
    }

    /// Unregisters the entity with `id` and hands it back.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity<L, P, A>, RegistryError<L>> {
        let Some(index) = self.things.iter().position(|thing| thing.id() == id) else {
            let registry = self.snapshot();
            warn!(
                operation = "remove",
                entity = id,
                registry = ?registry,
                "Thing to be removed is not in the environment"
            );
            return Err(RegistryError::MissingEntity { id, registry });
        };

        let entity = self.things.remove(index);
        self.agents.retain(|agent| *agent != id);
        debug!(entity = id, location = ?entity.location(), "Removed entity");
        Ok(entity)
    }
}

/// Trait implemented by concrete environments.
///
/// An implementation owns a [`Registry`] and supplies `percept` and
/// `execute_action`; registration and the simulation loop are provided.
/// Leaving `percept` or `execute_action` at their defaults is a configuration
/// fault that makes [`Environment::step`] fail with
/// [`SimError::NotImplemented`].
pub trait Environment {
    type Location: Clone + Debug;
    type Percept: Debug;
    type Action: Debug;

    fn registry(&self) -> &Registry<Self::Location, Self::Percept, Self::Action>;

    fn registry_mut(&mut self) -> &mut Registry<Self::Location, Self::Percept, Self::Action>;

    /// The percept `agent` receives in the current world state.
    fn percept(
        &self,
        _agent: &Entity<Self::Location, Self::Percept, Self::Action>,
    ) -> Result<Self::Percept, SimError> {
        Err(SimError::NotImplemented {
            operation: "percept",
        })
    }

    /// Applies `action` for the agent `agent`, updating the world and the
    /// agent's performance. `None` is the undefined action and must have no
    /// effect.
    fn execute_action(
        &mut self,
        _agent: EntityId,
        _action: Option<Self::Action>,
    ) -> Result<(), SimError> {
        Err(SimError::NotImplemented {
            operation: "execute_action",
        })
    }

    /// Location for a thing added without one.
    fn default_location(
        &mut self,
        _thing: &Entity<Self::Location, Self::Percept, Self::Action>,
    ) -> Option<Self::Location> {
        None
    }

    /// Names of the agent kinds meant for this environment. Advisory only.
    fn thing_classes(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn reserve_entity_id(&mut self) -> EntityId {
        self.registry_mut().reserve_entity_id()
    }

    /// Adds `thing` at `location`, or at [`Environment::default_location`]
    /// when none is given.
    fn add(
        &mut self,
        thing: Entity<Self::Location, Self::Percept, Self::Action>,
        location: Option<Self::Location>,
    ) -> Result<EntityId, RegistryError<Self::Location>> {
        if self.registry().contains(thing.id()) {
            return self.registry_mut().insert(thing, location);
        }
        let location = match location {
            Some(location) => Some(location),
            None => self.default_location(&thing),
        };
        self.registry_mut().insert(thing, location)
    }

    /// Wraps `program` in a new agent with a freshly reserved id and adds it.
    fn add_program(
        &mut self,
        program: impl Program<Self::Percept, Self::Action> + 'static,
        location: Option<Self::Location>,
    ) -> Result<EntityId, RegistryError<Self::Location>> {
        let id = self.reserve_entity_id();
        self.add(Entity::agent(id, program), location)
    }

    fn remove(
        &mut self,
        thing: EntityId,
    ) -> Result<Entity<Self::Location, Self::Percept, Self::Action>, RegistryError<Self::Location>>
    {
        self.registry_mut().remove(thing)
    }

    fn is_done(&self) -> bool {
        self.registry().is_done()
    }

    /// Runs one time step: every agent perceives and decides, then every
    /// action is executed in registration order.
    ///
    /// Dead agents are not asked for an action and get the undefined one.
    fn step(&mut self) -> Result<(), SimError> {
        if self.is_done() {
            return Ok(());
        }

        let agent_ids = self.registry().agent_ids().to_vec();
        let mut actions = Vec::with_capacity(agent_ids.len());
        for id in agent_ids {
            let agent = self.registry().get(id).ok_or(SimError::UnknownEntity(id))?;
            if !agent.is_alive() {
                actions.push((id, None));
                continue;
            }
            let percept = self.percept(agent).inspect_err(|err| {
                error!(entity = id, %err, "Failed to compute percept");
            })?;
            debug!(entity = id, ?percept, "Agent perceived");
            let action = self
                .registry_mut()
                .get_mut(id)
                .and_then(|agent| agent.as_agent_mut())
                .ok_or(SimError::NotAnAgent(id))?
                .execute(percept);
            actions.push((id, action));
        }

        for (id, action) in actions {
            debug!(entity = id, ?action, "Executing action");
            self.execute_action(id, action).inspect_err(|err| {
                error!(entity = id, %err, "Failed to execute action");
            })?;
        }
        Ok(())
    }

    /// Runs at most `steps` steps, stopping early once the environment is
    /// done. Returns the number of steps taken.
    fn run(&mut self, steps: usize) -> Result<usize, SimError> {
        for taken in 0..steps {
            if self.is_done() {
                return Ok(taken);
            }
            self.step()?;
        }
        Ok(steps)
    }
}
