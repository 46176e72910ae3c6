//! Fixed-capacity transposition table keyed by Zobrist hash.
//!
//! Each key maps to one slot (`key % capacity`). Besides the score bound,
//! an entry remembers the move that produced it so the next visit can
//! search that move first.
//!
//! A slot is overwritten by a result at least as deep as the resident one,
//! or by anything once the resident entry has gone unused for
//! `STALE_AFTER` searches.

use crate::board::Move;

/// How the stored score relates to the true value of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// The node failed high: the value is at least `score`.
    Lower,
    /// The node failed low: the value is at most `score`.
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtEntry {
    pub key: u64,
    /// Remaining depth the score was searched to.
    pub depth: u32,
    pub score: f64,
    pub bound: Bound,
    /// Best or refuting move, if the node had one.
    pub best_move: Option<Move>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TtStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    /// Stores that lost to a deeper, fresher resident.
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    entry: TtEntry,
    /// Search in which the slot was last written or hit.
    touched: u8,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    slots: Vec<Option<Slot>>,
    search: u8,
    stats: TtStats,
}

impl TranspositionTable {
    const STALE_AFTER: u8 = 4;

    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            search: 0,
            stats: TtStats::default(),
        }
    }

    /// Mark the start of a new search; entries untouched for a while lose
    /// their depth protection.
    #[inline]
    pub fn new_generation(&mut self) {
        self.search = self.search.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.search = 0;
        self.stats = TtStats::default();
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    #[inline]
    pub fn stats(&self) -> TtStats {
        self.stats
    }

    #[inline]
    fn slot_of(&self, key: u64) -> usize {
        (key % self.slots.len() as u64) as usize
    }

    pub fn probe(&mut self, key: u64) -> Option<TtEntry> {
        self.stats.probes += 1;
        let search = self.search;
        let idx = self.slot_of(key);
        let slot = self.slots[idx].as_mut().filter(|s| s.entry.key == key)?;
        slot.touched = search;
        self.stats.hits += 1;
        Some(slot.entry)
    }

    pub fn store(&mut self, mut entry: TtEntry) {
        self.stats.stores += 1;
        let idx = self.slot_of(entry.key);
        if let Some(resident) = self.slots[idx] {
            let stale = self.search.wrapping_sub(resident.touched) >= Self::STALE_AFTER;
            if !stale && entry.depth < resident.entry.depth {
                self.stats.rejected += 1;
                return;
            }
            // A fail-low result has no move of its own; keep the old one
            if resident.entry.key == entry.key && entry.best_move.is_none() {
                entry.best_move = resident.entry.best_move;
            }
        }
        self.slots[idx] = Some(Slot {
            entry,
            touched: self.search,
        });
    }
}
