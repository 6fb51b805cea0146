//! The packrat memoization table: a two-level cache keyed by cursor
//! position then by a dense rule id, scoped to one parser instance.

use crate::error::ParseFailure;
use crate::node::Node;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub outcome: Result<Node, ParseFailure>,
    pub end_position: usize,
}

/// Outer slots are indexed by cursor position and grown on demand; each
/// holds one inner slot per rule, sized to `rule_count` on first use at
/// that position. This avoids hashing on the hot path at the cost of
/// some unused slots for rules never attempted at a given position.
#[derive(Debug)]
pub struct MemoCache {
    rule_count: usize,
    positions: Vec<Option<Vec<Option<CacheEntry>>>>,
}

impl MemoCache {
    pub fn new(rule_count: usize) -> Self {
        Self {
            rule_count,
            positions: Vec::new(),
        }
    }

    pub fn get(&self, position: usize, rule_id: usize) -> Option<&CacheEntry> {
        self.positions.get(position)?.as_ref()?.get(rule_id)?.as_ref()
    }

    pub fn set(&mut self, position: usize, rule_id: usize, entry: CacheEntry) {
        if self.positions.len() <= position {
            self.positions.resize_with(position + 1, || None);
        }
        let slots = self.positions[position].get_or_insert_with(|| vec![None; self.rule_count]);
        if slots.len() <= rule_id {
            slots.resize_with(rule_id + 1, || None);
        }
        slots[rule_id] = Some(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corvid_core::SourceLocation;

    fn loc() -> SourceLocation {
        SourceLocation {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    #[test]
    fn miss_on_empty_cache() {
        let cache = MemoCache::new(4);
        assert!(cache.get(0, 0).is_none());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut cache = MemoCache::new(4);
        cache.set(
            2,
            1,
            CacheEntry {
                outcome: Ok(Node::Text("x".into())),
                end_position: 3,
            },
        );
        let entry = cache.get(2, 1).expect("entry present");
        assert_eq!(entry.end_position, 3);
        assert_eq!(entry.outcome.as_ref().unwrap(), &Node::Text("x".into()));
    }

    #[test]
    fn distinct_positions_do_not_collide() {
        use crate::error::ParseError;
        let mut cache = MemoCache::new(2);
        cache.set(
            0,
            0,
            CacheEntry {
                outcome: Err(ParseFailure::Recoverable(ParseError::new("nope", loc()))),
                end_position: 0,
            },
        );
        assert!(cache.get(1, 0).is_none());
    }
}
