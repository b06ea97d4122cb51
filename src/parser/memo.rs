//! Per-parse memo table: one slot per token position, each holding one entry
//! per non-terminal. Slots are allocated on first visit and never evicted.

/// A successful match: its value and the index of the first unconsumed token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step<V> {
    pub value: V,
    pub next: usize,
}

/// A memoized outcome; `None` is a (backtrackable) failure.
pub(crate) type Memo<V> = Option<Step<V>>;

pub(crate) struct MemoTable<V> {
    slots: Vec<Option<Box<[Option<Memo<V>>]>>>,
    width: usize,
}

impl<V> MemoTable<V> {
    /// `positions` includes the one-past-the-end index reached after EOF.
    pub fn new(positions: usize, width: usize) -> Self {
        let mut slots = Vec::with_capacity(positions);
        slots.resize_with(positions, || None);
        Self { slots, width }
    }

    pub fn get(&self, at: usize, non_terminal: usize) -> Option<&Memo<V>> {
        self.slots.get(at)?.as_ref()?[non_terminal].as_ref()
    }

    pub fn insert(&mut self, at: usize, non_terminal: usize, memo: Memo<V>) {
        let width = self.width;
        let slot = self.slots[at].get_or_insert_with(|| {
            (0..width).map(|_| None).collect::<Vec<_>>().into_boxed_slice()
        });
        slot[non_terminal] = Some(memo);
    }

    #[cfg(test)]
    pub fn visited_positions(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_distinguish_failure_from_absence() {
        let mut memo: MemoTable<u32> = MemoTable::new(4, 2);
        assert!(memo.get(0, 0).is_none());
        memo.insert(0, 0, None);
        assert_eq!(memo.get(0, 0), Some(&None));
        assert!(memo.get(0, 1).is_none());
        memo.insert(0, 1, Some(Step { value: 7, next: 2 }));
        assert_eq!(memo.get(0, 1), Some(&Some(Step { value: 7, next: 2 })));
        assert_eq!(memo.visited_positions(), 1);
    }

    #[test]
    fn overwrite_replaces_seeded_entry() {
        let mut memo: MemoTable<u32> = MemoTable::new(2, 1);
        memo.insert(1, 0, None);
        memo.insert(1, 0, Some(Step { value: 1, next: 2 }));
        assert_eq!(memo.get(1, 0), Some(&Some(Step { value: 1, next: 2 })));
        assert!(memo.get(5, 0).is_none());
    }
}
