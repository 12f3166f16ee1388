//! Partition strategies: `HashA` and `HashB` route a record to a shard
//! purely from `text`; `MemCollapse` abandons partitioning in favor of an
//! in-memory occurrence count, valid only as the terminal round.

use ahash::AHashMap;
use crossbeam_channel::Sender;

use crate::errors::PipelineError;
use crate::record::{min_unique, DedupEntry, Record};

/// Tagged variant over the three interchangeable dispatch policies.
pub enum PartitionStrategy {
    HashA,
    HashB,
    MemCollapse { map: AHashMap<Vec<u8>, DedupEntry> },
}

impl PartitionStrategy {
    /// Strategy selection is fixed by round: `r=0 -> HashA`, `r=1 -> HashB`,
    /// `r=2 -> MemCollapse`. Anything beyond is `UnsupportedStrategy`.
    pub fn for_round(round: u32) -> Result<Self, PipelineError> {
        match round {
            0 => Ok(Self::HashA),
            1 => Ok(Self::HashB),
            2 => Ok(Self::MemCollapse { map: AHashMap::new() }),
            r => Err(PipelineError::UnsupportedStrategy(r, crate::constants::ROUND_CAP)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HashA => "HashA",
            Self::HashB => "HashB",
            Self::MemCollapse { .. } => "MemCollapse",
        }
    }

    /// Route one record. `HashA`/`HashB` send immediately to a shard queue;
    /// `MemCollapse` only updates its in-memory map.
    pub fn dispatch(
        &mut self,
        text: Vec<u8>,
        pos: u64,
        worker_count: usize,
        queues: &[Sender<Record>],
    ) -> Result<(), PipelineError> {
        match self {
            Self::HashA => send_to(queues, hash_a(&text) as usize % worker_count, Record::new(text, pos)),
            Self::HashB => send_to(queues, hash_b(&text) as usize % worker_count, Record::new(text, pos)),
            Self::MemCollapse { map } => {
                match map.get_mut(&text) {
                    Some(entry) => entry.bump(),
                    None => {
                        map.insert(text, DedupEntry::first_seen(pos));
                    }
                }
                Ok(())
            }
        }
    }

    /// Finalize the round. No-op for the hash strategies; for `MemCollapse`,
    /// emit the single unique-minimum record (if any) to a fixed shard.
    pub fn done(&mut self, queues: &[Sender<Record>]) -> Result<(), PipelineError> {
        if let Self::MemCollapse { map } = self {
            if let Some(record) = min_unique(map) {
                send_to(queues, 0, record)?;
            }
        }
        Ok(())
    }
}

fn send_to(queues: &[Sender<Record>], idx: usize, record: Record) -> Result<(), PipelineError> {
    queues[idx].send(record).map_err(|_| PipelineError::ChannelClosed)
}

/// Multiplicative (DJB-style) hash: `h = h*33 + b`, 64-bit wraparound.
pub fn hash_a(text: &[u8]) -> u64 {
    let mut h: u64 = 0;
    for &b in text {
        h = (h << 5).wrapping_add(h).wrapping_add(b as u64);
    }
    h
}

/// XOR-shift (DEK-style) hash, 64-bit wraparound.
pub fn hash_b(text: &[u8]) -> u64 {
    let mut h: u64 = text.len() as u64;
    for &b in text {
        h = ((h << 5) ^ (h >> 27)) ^ (b as u64);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_a_is_deterministic_and_stable() {
        assert_eq!(hash_a(b"abc"), hash_a(b"abc"));
        assert_ne!(hash_a(b"abc"), hash_a(b"abd"));
    }

    #[test]
    fn hash_b_is_deterministic_and_stable() {
        assert_eq!(hash_b(b"abc"), hash_b(b"abc"));
        assert_ne!(hash_b(b"abc"), hash_b(b"abd"));
    }

    #[test]
    fn hash_a_empty_string_is_zero() {
        assert_eq!(hash_a(b""), 0);
    }

    #[test]
    fn hash_b_empty_string_is_zero() {
        assert_eq!(hash_b(b""), 0);
    }

    #[test]
    fn mem_collapse_picks_min_pos_among_unique() {
        let mut strat = PartitionStrategy::MemCollapse { map: AHashMap::new() };
        let (tx, rx) = crossbeam_channel::bounded::<Record>(8);
        let queues = vec![tx];

        strat.dispatch(b"dup".to_vec(), 1, 1, &queues).unwrap();
        strat.dispatch(b"dup".to_vec(), 2, 1, &queues).unwrap();
        strat.dispatch(b"needle".to_vec(), 3, 1, &queues).unwrap();
        strat.dispatch(b"other".to_vec(), 1, 1, &queues).unwrap();

        strat.done(&queues).unwrap();
        drop(queues);

        let got: Vec<Record> = rx.try_iter().collect();
        assert_eq!(got.len(), 1);
        // "other" (pos 1) and "needle" (pos 3) are both unique; min pos wins.
        assert_eq!(got[0].text, b"other");
        assert_eq!(got[0].pos, 1);
    }

    #[test]
    fn mem_collapse_emits_nothing_when_all_duplicated() {
        let mut strat = PartitionStrategy::MemCollapse { map: AHashMap::new() };
        let (tx, rx) = crossbeam_channel::bounded::<Record>(8);
        let queues = vec![tx];

        strat.dispatch(b"k".to_vec(), 1, 1, &queues).unwrap();
        strat.dispatch(b"k".to_vec(), 2, 1, &queues).unwrap();
        strat.done(&queues).unwrap();
        drop(queues);

        assert!(rx.try_iter().next().is_none());
    }
}
