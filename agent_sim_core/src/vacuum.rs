//! The four-square vacuum world.
//!
//! Squares A=(0,0), B=(1,0), C=(1,1) and D=(0,1) are each Clean or Dirty.
//! The agent perceives its square and that square's status. Moves go to a
//! fixed target square and cost 1 point; sucking up dirt earns 10.

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    EntityId, Position,
    agent::Entity,
    environment::{Environment, Registry},
    error::SimError,
    map::Grid,
    program::TableDrivenProgram,
    table::LatestPerceptTable,
};

pub const LOC_A: Position = Position { x: 0, y: 0 };
pub const LOC_B: Position = Position { x: 1, y: 0 };
pub const LOC_C: Position = Position { x: 1, y: 1 };
pub const LOC_D: Position = Position { x: 0, y: 1 };

pub const LOCATIONS: [Position; 4] = [LOC_A, LOC_B, LOC_C, LOC_D];

const WIDTH: usize = 2;
const HEIGHT: usize = 2;

/// Performance reward for cleaning a dirty square.
pub const SUCK_REWARD: i64 = 10;
/// Performance cost of any move.
pub const MOVE_COST: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Clean,
    Dirty,
}

/// Directives a vacuum agent can issue. The undefined action is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VacuumAction {
    /// Move to B.
    Right,
    /// Move to C.
    Up,
    /// Move to D.
    Left,
    /// Move to A.
    Down,
    Suck,
}

impl VacuumAction {
    /// Square this action moves to, `None` for `Suck`.
    pub fn target(self) -> Option<Position> {
        match self {
            VacuumAction::Right => Some(LOC_B),
            VacuumAction::Up => Some(LOC_C),
            VacuumAction::Left => Some(LOC_D),
            VacuumAction::Down => Some(LOC_A),
            VacuumAction::Suck => None,
        }
    }
}

/// The agent's location and that location's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VacuumPercept {
    pub location: Position,
    pub status: Status,
}

pub type VacuumEntity = Entity<Position, VacuumPercept, VacuumAction>;

/// The lookup table of the table-driven vacuum agent: suck when dirty,
/// otherwise move on around the cycle A→B→C→D→A.
pub fn vacuum_table() -> LatestPerceptTable<VacuumPercept, VacuumAction> {
    let percept = |location, status| VacuumPercept { location, status };
    LatestPerceptTable::new([
        (percept(LOC_A, Status::Clean), VacuumAction::Right),
        (percept(LOC_A, Status::Dirty), VacuumAction::Suck),
        (percept(LOC_B, Status::Clean), VacuumAction::Up),
        (percept(LOC_B, Status::Dirty), VacuumAction::Suck),
        (percept(LOC_C, Status::Clean), VacuumAction::Left),
        (percept(LOC_C, Status::Dirty), VacuumAction::Suck),
        (percept(LOC_D, Status::Clean), VacuumAction::Down),
        (percept(LOC_D, Status::Dirty), VacuumAction::Suck),
    ])
}

/// Creates an agent running a [`TableDrivenProgram`] over [`vacuum_table`].
pub fn table_driven_vacuum_agent(id: EntityId) -> VacuumEntity {
    Entity::agent(id, TableDrivenProgram::new(vacuum_table()))
}

/// Parses an initial status map: two rows of two whitespace separated
/// tokens, `C` for Clean and `D` for Dirty. Row 0 holds A and B.
pub fn load_statuses_from_string(map_string: &str) -> Result<Grid<Status>, SimError> {
    let lines: Vec<&str> = map_string.trim().lines().collect();
    if lines.is_empty() {
        return Err(SimError::Map("Map string is empty.".to_string()));
    }
    if lines.len() != HEIGHT {
        return Err(SimError::Map(format!(
            "Expected {} rows, found {}",
            HEIGHT,
            lines.len()
        )));
    }

    let mut rows: Vec<Vec<Status>> = Vec::with_capacity(HEIGHT);
    for (y, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != WIDTH {
            return Err(SimError::Map(format!(
                "Inconsistent width at row {}: expected {}, found {}",
                y,
                WIDTH,
                tokens.len()
            )));
        }
        let row = tokens
            .iter()
            .enumerate()
            .map(|(x, token)| match *token {
                "C" => Ok(Status::Clean),
                "D" => Ok(Status::Dirty),
                unknown => Err(SimError::Map(format!(
                    "Unknown map code '{}' at position ({}, {}).",
                    unknown, x, y
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    let grid = Grid::from_generator(WIDTH, HEIGHT, |p| rows[p.y][p.x]);
    Ok(grid)
}

/// The vacuum world, with an injected randomness source used for the
/// initial statuses and default agent placement.
pub struct VacuumEnvironment<R: Rng = StdRng> {
    registry: Registry<Position, VacuumPercept, VacuumAction>,
    status: Grid<Status>,
    rng: R,
}

impl VacuumEnvironment<StdRng> {
    /// A world whose randomness is fully determined by `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> VacuumEnvironment<R> {
    /// Creates a world where each square is Clean or Dirty at random.
    pub fn new(mut rng: R) -> Self {
        let status = Grid::from_generator(WIDTH, HEIGHT, |_| {
            if rng.random::<bool>() {
                Status::Dirty
            } else {
                Status::Clean
            }
        });
        Self {
            registry: Registry::new(),
            status,
            rng,
        }
    }

    /// Creates a world with the given statuses. `rng` is still used for
    /// default placement.
    pub fn with_statuses(status: Grid<Status>, rng: R) -> Result<Self, SimError> {
        if status.width() != WIDTH || status.height() != HEIGHT {
            return Err(SimError::Map(format!(
                "Vacuum world must be {}x{}, got {}x{}",
                WIDTH,
                HEIGHT,
                status.width(),
                status.height()
            )));
        }
        Ok(Self {
            registry: Registry::new(),
            status,
            rng,
        })
    }

    pub fn status(&self, location: Position) -> Option<Status> {
        self.status.get(location).copied()
    }

    pub fn statuses(&self) -> &Grid<Status> {
        &self.status
    }

    pub fn all_clean(&self) -> bool {
        self.status.iter().all(|s| *s == Status::Clean)
    }

    fn agent_location(&self, agent: &VacuumEntity) -> Result<Position, SimError> {
        agent
            .location()
            .copied()
            .filter(|location| self.status.is_valid(*location))
            .ok_or_else(|| SimError::UnknownLocation {
                id: agent.id(),
                location: format!("{:?}", agent.location()),
            })
    }
}

impl<R: Rng> Environment for VacuumEnvironment<R> {
    type Location = Position;
    type Percept = VacuumPercept;
    type Action = VacuumAction;

    fn registry(&self) -> &Registry<Position, VacuumPercept, VacuumAction> {
        &self.registry
    }

    fn registry_mut(&mut self) -> &mut Registry<Position, VacuumPercept, VacuumAction> {
        &mut self.registry
    }

    fn percept(&self, agent: &VacuumEntity) -> Result<VacuumPercept, SimError> {
        let location = self.agent_location(agent)?;
        let status = self.status(location).ok_or(SimError::UnknownLocation {
            id: agent.id(),
            location: location.to_string(),
        })?;
        Ok(VacuumPercept { location, status })
    }

    fn execute_action(
        &mut self,
        agent: EntityId,
        action: Option<VacuumAction>,
    ) -> Result<(), SimError> {
        let Some(action) = action else {
            return Ok(());
        };
        let entity = self
            .registry
            .get(agent)
            .ok_or(SimError::UnknownEntity(agent))?;
        let location = self.agent_location(entity)?;

        let (new_location, reward) = match action.target() {
            Some(target) => (target, -MOVE_COST),
            None => {
                let previous = self.status.set(location, Status::Clean)?;
                let reward = if previous == Status::Dirty {
                    SUCK_REWARD
                } else {
                    0
                };
                (location, reward)
            }
        };

        let entity = self
            .registry
            .get_mut(agent)
            .ok_or(SimError::UnknownEntity(agent))?;
        entity.set_location(Some(new_location));
        let body = entity.as_agent_mut().ok_or(SimError::NotAnAgent(agent))?;
        body.add_performance(reward);
        debug!(
            entity = agent,
            ?action,
            location = %new_location,
            performance = body.performance(),
            "Vacuum action applied"
        );
        Ok(())
    }

    /// Agents start on a random square.
    fn default_location(&mut self, _thing: &VacuumEntity) -> Option<Position> {
        LOCATIONS.choose(&mut self.rng).copied()
    }

    fn thing_classes(&self) -> Vec<&'static str> {
        vec!["TableDrivenVacuumAgent"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;

    fn world(map: &str) -> VacuumEnvironment {
        let statuses = load_statuses_from_string(map).unwrap();
        VacuumEnvironment::with_statuses(statuses, StdRng::seed_from_u64(7)).unwrap()
    }

    #[test]
    fn test_table_covers_every_percept() {
        let table = vacuum_table();
        assert_eq!(table.len(), 8);
        let mut agent = TableDrivenProgram::new(table);
        for location in LOCATIONS {
            let action = agent.execute(VacuumPercept {
                location,
                status: Status::Dirty,
            });
            assert_eq!(action, Some(VacuumAction::Suck));
        }
        let clean = |location| VacuumPercept {
            location,
            status: Status::Clean,
        };
        assert_eq!(agent.execute(clean(LOC_A)), Some(VacuumAction::Right));
        assert_eq!(agent.execute(clean(LOC_B)), Some(VacuumAction::Up));
        assert_eq!(agent.execute(clean(LOC_C)), Some(VacuumAction::Left));
        assert_eq!(agent.execute(clean(LOC_D)), Some(VacuumAction::Down));
    }

    #[test]
    fn test_load_statuses_from_string() {
        let grid = load_statuses_from_string("D C\nC D").unwrap();
        assert_eq!(grid.get(LOC_A), Some(&Status::Dirty));
        assert_eq!(grid.get(LOC_B), Some(&Status::Clean));
        assert_eq!(grid.get(LOC_C), Some(&Status::Dirty));
        assert_eq!(grid.get(LOC_D), Some(&Status::Clean));
    }

    #[test]
    fn test_load_statuses_rejects_bad_maps() {
        assert!(matches!(load_statuses_from_string("  "), Err(SimError::Map(_))));
        assert!(matches!(load_statuses_from_string("C C"), Err(SimError::Map(_))));
        assert!(matches!(
            load_statuses_from_string("C C C\nC C C"),
            Err(SimError::Map(_))
        ));
        assert_eq!(
            load_statuses_from_string("C X\nC C").unwrap_err(),
            SimError::Map("Unknown map code 'X' at position (1, 0).".to_string())
        );
    }

    #[test]
    fn test_with_statuses_rejects_wrong_size() {
        let grid = Grid::from_generator(3, 1, |_| Status::Clean);
        assert!(VacuumEnvironment::with_statuses(grid, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_percept_reports_location_and_status() {
        let mut env = world("D C\nC C");
        let id = env.add(table_driven_vacuum_agent(0), Some(LOC_A)).unwrap();
        let agent = env.registry().get(id).unwrap();
        assert_eq!(
            env.percept(agent).unwrap(),
            VacuumPercept {
                location: LOC_A,
                status: Status::Dirty
            }
        );
    }

    #[test]
    fn test_percept_without_location_fails() {
        let env = world("C C\nC C");
        let agent = table_driven_vacuum_agent(0);
        assert!(matches!(
            env.percept(&agent),
            Err(SimError::UnknownLocation { id: 0, .. })
        ));
    }

    #[test]
    fn test_moves_cost_one_and_go_to_fixed_squares() {
        let mut env = world("C C\nC C");
        let id = env.add(table_driven_vacuum_agent(0), Some(LOC_A)).unwrap();
        for (action, expected) in [
            (VacuumAction::Up, LOC_C),
            (VacuumAction::Left, LOC_D),
            (VacuumAction::Down, LOC_A),
            (VacuumAction::Right, LOC_B),
        ] {
            env.execute_action(id, Some(action)).unwrap();
            assert_eq!(env.registry().get(id).unwrap().location(), Some(&expected));
        }
        assert_eq!(env.registry().get(id).unwrap().performance(), Some(-4));
    }

    #[test]
    fn test_suck_rewards_only_dirt() {
        let mut env = world("D C\nC C");
        let id = env.add(table_driven_vacuum_agent(0), Some(LOC_A)).unwrap();
        env.execute_action(id, Some(VacuumAction::Suck)).unwrap();
        assert_eq!(env.status(LOC_A), Some(Status::Clean));
        assert_eq!(env.registry().get(id).unwrap().performance(), Some(10));
        env.execute_action(id, Some(VacuumAction::Suck)).unwrap();
        assert_eq!(env.registry().get(id).unwrap().performance(), Some(10));
        assert!(env.all_clean());
    }

    #[test]
    fn test_undefined_action_has_no_effect() {
        let mut env = world("D D\nD D");
        let id = env.add(table_driven_vacuum_agent(0), Some(LOC_C)).unwrap();
        env.execute_action(id, None).unwrap();
        let agent = env.registry().get(id).unwrap();
        assert_eq!(agent.location(), Some(&LOC_C));
        assert_eq!(agent.performance(), Some(0));
        assert_eq!(env.status(LOC_C), Some(Status::Dirty));
    }

    #[test]
    fn test_seeded_worlds_are_reproducible() {
        let mut first = VacuumEnvironment::from_seed(42);
        let mut second = VacuumEnvironment::from_seed(42);
        assert_eq!(first.statuses(), second.statuses());
        let a = first.add(table_driven_vacuum_agent(0), None).unwrap();
        let b = second.add(table_driven_vacuum_agent(0), None).unwrap();
        let start = first.registry().get(a).unwrap().location().copied();
        assert!(start.is_some_and(|p| LOCATIONS.contains(&p)));
        assert_eq!(start.as_ref(), second.registry().get(b).unwrap().location());

        first.run(20).unwrap();
        second.run(20).unwrap();
        assert_eq!(first.statuses(), second.statuses());
        assert_eq!(
            first.registry().get(a).unwrap().performance(),
            second.registry().get(b).unwrap().performance()
        );
    }

    #[test]
    fn test_table_agent_cleans_whole_world() {
        let mut env = world("D D\nD D");
        let id = env.add(table_driven_vacuum_agent(0), Some(LOC_A)).unwrap();
        // Suck and move on each of the four squares.
        env.run(8).unwrap();
        assert!(env.all_clean());
        assert_eq!(env.registry().get(id).unwrap().performance(), Some(36));
        assert_eq!(env.registry().get(id).unwrap().location(), Some(&LOC_A));
    }

    #[test]
    fn test_thing_classes() {
        let env = VacuumEnvironment::from_seed(1);
        assert_eq!(env.thing_classes(), vec!["TableDrivenVacuumAgent"]);
    }
}
