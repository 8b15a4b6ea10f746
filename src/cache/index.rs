use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Position of an entry in creation order. The sequence number breaks ties
/// between entries created within the same clock tick.
type Rank = (DateTime<Utc>, u64);

/// Cache entries ordered by creation time, oldest first.
///
/// Reads never touch this index, so eviction is FIFO by creation rather than
/// least-recently-used.
#[derive(Debug, Default)]
pub(crate) struct CreationIndex {
    by_rank: BTreeMap<Rank, String>,
    by_name: HashMap<String, Rank>,
    next_seq: u64,
}

impl CreationIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `name` as created at `created_at`, replacing any earlier rank
    pub(crate) fn insert(&mut self, name: String, created_at: DateTime<Utc>) {
        self.remove(&name);
        let rank = (created_at, self.next_seq);
        self.next_seq += 1;
        self.by_rank.insert(rank, name.clone());
        self.by_name.insert(name, rank);
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        match self.by_name.remove(name) {
            Some(rank) => {
                self.by_rank.remove(&rank);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Removes and returns the oldest names until at most `capacity` remain
    pub(crate) fn drain_overflow(&mut self, capacity: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.by_rank.len() > capacity {
            let Some((_, name)) = self.by_rank.pop_first() else {
                break;
            };
            self.by_name.remove(&name);
            evicted.push(name);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + seconds, 0).unwrap()
    }

    #[test]
    fn test_drain_overflow_removes_oldest() {
        let mut index = CreationIndex::new();
        index.insert("c".to_string(), at(3));
        index.insert("a".to_string(), at(1));
        index.insert("b".to_string(), at(2));

        assert_eq!(index.drain_overflow(1), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(index.len(), 1);
        assert!(index.contains("c"));
    }

    #[test]
    fn test_drain_overflow_noop_under_capacity() {
        let mut index = CreationIndex::new();
        index.insert("a".to_string(), at(1));
        assert!(index.drain_overflow(5).is_empty());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_same_timestamp_uses_insertion_order() {
        let mut index = CreationIndex::new();
        let now = at(0);
        for name in ["first", "second", "third"] {
            index.insert(name.to_string(), now);
        }
        assert_eq!(index.drain_overflow(1), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_reinsert_moves_entry_to_newest() {
        let mut index = CreationIndex::new();
        index.insert("a".to_string(), at(1));
        index.insert("b".to_string(), at(2));
        index.insert("a".to_string(), at(1) + Duration::seconds(5));

        assert_eq!(index.len(), 2);
        assert_eq!(index.drain_overflow(1), vec!["b".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut index = CreationIndex::new();
        index.insert("a".to_string(), at(1));
        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert_eq!(index.len(), 0);
        assert!(index.drain_overflow(0).is_empty());
    }
}
