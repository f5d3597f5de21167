use std::fmt::Debug;

use crate::{EntityId, map::GridError};

/// Non-fatal anomalies reported by the entity registry.
///
/// The registry is left untouched whenever one of these is returned, so
/// callers are free to log and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError<L: Debug> {
    #[error("Entity {id} is already present in the environment")]
    DuplicateEntity { id: EntityId },
    /// `registry` is the `(id, location)` table at the time of the failure.
    #[error("Entity {id} is not present in the environment; registry: {registry:?}")]
    MissingEntity {
        id: EntityId,
        registry: Vec<(EntityId, Option<L>)>,
    },
}

/// Faults that stop a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// The concrete environment did not provide a required operation.
    #[error("Environment does not implement `{operation}`")]
    NotImplemented { operation: &'static str },
    #[error("Entity {0} is not an agent")]
    NotAnAgent(EntityId),
    #[error("Entity {0} is not registered")]
    UnknownEntity(EntityId),
    #[error("Entity {id} is at unknown location {location}")]
    UnknownLocation { id: EntityId, location: String },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Invalid map: {0}")]
    Map(String),
}
