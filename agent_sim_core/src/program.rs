use std::marker::PhantomData;

use crate::{EntityId, table::ActionTable};

/// Trait defining an agent program: the decision function that maps what the
/// agent has perceived to its next action.
///
/// `&mut self` lets a program keep internal state (e.g. its percept history).
/// `None` is the undefined action and means "do nothing".
pub trait Program<P, A> {
    /// Observes one new percept and decides the next action.
    fn execute(&mut self, percept: P) -> Option<A>;

    /// Describes the program's internal state for debugging.
    fn show_state(&self) -> Option<String> {
        None
    }

    /// Whether the owning agent may pick up the thing `thing`.
    fn can_grab(&self, _thing: EntityId) -> bool {
        false
    }
}

/// Any `FnMut(P) -> Option<A>` can drive an agent directly.
impl<P, A, F> Program<P, A> for F
where
    F: FnMut(P) -> Option<A>,
{
    fn execute(&mut self, percept: P) -> Option<A> {
        self(percept)
    }
}

/// Selects actions by looking up the whole percept sequence in a table.
///
/// The history only ever grows, so the output is a pure function of every
/// percept the program has seen.
#[derive(Debug, Clone)]
pub struct TableDrivenProgram<T, P, A> {
    table: T,
    percepts: Vec<P>,
    _action: PhantomData<fn() -> A>,
}

impl<T, P, A> TableDrivenProgram<T, P, A>
where
    T: ActionTable<P, A>,
{
    pub fn new(table: T) -> Self {
        Self {
            table,
            percepts: Vec::new(),
            _action: PhantomData,
        }
    }

    pub fn percepts(&self) -> &[P] {
        &self.percepts
    }

    pub fn table(&self) -> &T {
        &self.table
    }
}

impl<T, P, A> Program<P, A> for TableDrivenProgram<T, P, A>
where
    T: ActionTable<P, A>,
    P: std::fmt::Debug,
{
    fn execute(&mut self, percept: P) -> Option<A> {
        self.percepts.push(percept);
        self.table.lookup(&self.percepts)
    }

    fn show_state(&self) -> Option<String> {
        Some(format!(
            "{} percepts observed, latest: {:?}",
            self.percepts.len(),
            self.percepts.last()
        ))
    }
}
