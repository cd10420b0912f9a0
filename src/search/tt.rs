//! Fixed-size transposition table.
//!
//! Open addressing with `hash % capacity` slots and an always-replace policy.
//! Each slot holds two logical entries, one for main-search results and one
//! for quiescence results, so the two kinds never answer each other's
//! queries. A per-entry checksum validates reads; a failed checksum is a
//! miss, which makes the layout safe for a future lock-free sharing scheme
//! without a mutex.

use crate::search::params::{
    CHECKSUM_PRIMES, CHECKSUM_SEED, DEFAULT_TRANSPOSITION_TABLE_CAPACITY,
    MAX_TRANSPOSITION_TABLE_CAPACITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BoundFlag {
    Exact = 0,
    LowerBound = 1,
    UpperBound = 2,
}

impl BoundFlag {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => BoundFlag::LowerBound,
            2 => BoundFlag::UpperBound,
            _ => BoundFlag::Exact,
        }
    }
}

/// What a successful probe returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableProbe {
    pub depth: i32,
    pub score: i32,
    pub flag: BoundFlag,
    pub best_move_index: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct TableEntry {
    hash: u64,
    depth: i32,
    score: i32,
    flag: u8,
    /// Index into the ordered move list at store time; -1 when unknown.
    best_move_index: i32,
    checksum: u32,
}

impl TableEntry {
    const fn vacant() -> Self {
        TableEntry {
            hash: 0,
            depth: 0,
            score: 0,
            flag: 0,
            best_move_index: -1,
            checksum: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    search: TableEntry,
    quiescence: TableEntry,
}

pub struct TranspositionTable {
    buckets: Vec<Bucket>,
}

impl TranspositionTable {
    /// `capacity` is the slot count, clamped to the fixed ceiling. Memory is
    /// committed up front; the table never grows or shrinks.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_TRANSPOSITION_TABLE_CAPACITY);
        TranspositionTable {
            buckets: vec![
                Bucket {
                    search: TableEntry::vacant(),
                    quiescence: TableEntry::vacant(),
                };
                capacity
            ],
        }
    }

    pub fn with_default_capacity() -> Self {
        TranspositionTable::new(DEFAULT_TRANSPOSITION_TABLE_CAPACITY)
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Always-replace insertion into the slot `hash % capacity`.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i32,
        score: i32,
        flag: BoundFlag,
        best_move_index: Option<usize>,
        is_quiescence: bool,
    ) {
        let index = (hash % self.buckets.len() as u64) as usize;
        let best_move_index = best_move_index.map_or(-1, |i| i as i32);
        let entry = TableEntry {
            hash,
            depth,
            score,
            flag: flag as u8,
            best_move_index,
            checksum: checksum(hash, depth, score, flag as u8, best_move_index, is_quiescence),
        };
        let bucket = &mut self.buckets[index];
        if is_quiescence {
            bucket.quiescence = entry;
        } else {
            bucket.search = entry;
        }
    }

    /// A hit requires a matching hash and a verifying checksum; anything else
    /// is a miss.
    pub fn retrieve(&self, hash: u64, is_quiescence: bool) -> Option<TableProbe> {
        let index = (hash % self.buckets.len() as u64) as usize;
        let bucket = &self.buckets[index];
        let entry = if is_quiescence {
            &bucket.quiescence
        } else {
            &bucket.search
        };

        if entry.hash != hash {
            return None;
        }
        let expected = checksum(
            entry.hash,
            entry.depth,
            entry.score,
            entry.flag,
            entry.best_move_index,
            is_quiescence,
        );
        if entry.checksum != expected {
            return None;
        }

        Some(TableProbe {
            depth: entry.depth,
            score: entry.score,
            flag: BoundFlag::from_u8(entry.flag),
            best_move_index: usize::try_from(entry.best_move_index).ok(),
        })
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.search = TableEntry::vacant();
            bucket.quiescence = TableEntry::vacant();
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::with_default_capacity()
    }
}

/// FNV-style fold: seed, then one multiply-and-xor round per field.
fn checksum(
    hash: u64,
    depth: i32,
    score: i32,
    flag: u8,
    best_move_index: i32,
    is_quiescence: bool,
) -> u32 {
    let mut sum = CHECKSUM_SEED ^ (hash as u32) ^ ((hash >> 32) as u32);
    sum = sum.wrapping_mul(CHECKSUM_PRIMES[0]) ^ depth as u32;
    sum = sum.wrapping_mul(CHECKSUM_PRIMES[1]) ^ score as u32;
    sum = sum.wrapping_mul(CHECKSUM_PRIMES[2]) ^ flag as u32;
    sum = sum.wrapping_mul(CHECKSUM_PRIMES[3]) ^ best_move_index as u32;
    sum = sum.wrapping_mul(CHECKSUM_PRIMES[4]) ^ is_quiescence as u32;
    sum
}
