use std::{collections::HashMap, hash::Hash};

/// Trait defining an immutable percept-to-action lookup.
///
/// `history` is every percept observed so far, oldest first. A miss is
/// reported as `None`, which programs pass on as the "do nothing" action.
pub trait ActionTable<P, A> {
    fn lookup(&self, history: &[P]) -> Option<A>;
}

/// A table keyed on the complete percept sequence.
///
/// Only exact matches hit: there is no prefix, suffix or wildcard fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerceptSequenceTable<P: Eq + Hash, A> {
    entries: HashMap<Vec<P>, A>,
}

impl<P: Eq + Hash, A: Clone> PerceptSequenceTable<P, A> {
    pub fn new(entries: impl IntoIterator<Item = (Vec<P>, A)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Eq + Hash, A: Clone> ActionTable<P, A> for PerceptSequenceTable<P, A> {
    fn lookup(&self, history: &[P]) -> Option<A> {
        self.entries.get(history).cloned()
    }
}

/// A table keyed only on the most recent percept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestPerceptTable<P: Eq + Hash, A> {
    entries: HashMap<P, A>,
}

impl<P: Eq + Hash, A: Clone> LatestPerceptTable<P, A> {
    pub fn new(entries: impl IntoIterator<Item = (P, A)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Eq + Hash, A: Clone> ActionTable<P, A> for LatestPerceptTable<P, A> {
    fn lookup(&self, history: &[P]) -> Option<A> {
        history.last().and_then(|p| self.entries.get(p)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_table_requires_exact_match() {
        let table = PerceptSequenceTable::new([(vec![1, 2], "go"), (vec![1], "wait")]);
        assert_eq!(table.lookup(&[1]), Some("wait"));
        assert_eq!(table.lookup(&[1, 2]), Some("go"));
        // no fallback to a shorter key
        assert_eq!(table.lookup(&[1, 2, 3]), None);
        assert_eq!(table.lookup(&[2]), None);
        assert_eq!(table.lookup(&[]), None);
    }

    #[test]
    fn test_latest_table_ignores_older_percepts() {
        let table = LatestPerceptTable::new([('a', 1), ('b', 2)]);
        assert_eq!(table.lookup(&['a']), Some(1));
        assert_eq!(table.lookup(&['a', 'z', 'b']), Some(2));
        assert_eq!(table.lookup(&['b', 'z']), None);
        assert_eq!(table.lookup(&[]), None);
        assert_eq!(table.len(), 2);
    }
}
