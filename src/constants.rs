//! Fixed constants from the external interface contract. None of these are
//! configurable — they are part of the pipeline's on-disk and timing contract.

use std::time::Duration;

/// Maximum number of rounds the Mapper will attempt before giving up.
pub const ROUND_CAP: u32 = 3;

/// Buffer flush threshold: a Writer flushes once its buffer exceeds this many records.
pub const FLUSH_THRESHOLD: usize = 10_000;

/// Idle-flush timer: a Writer flushes if no record arrives within this window.
pub const IDLE_FLUSH: Duration = Duration::from_secs(5);

/// Bounded capacity of each per-shard worker queue.
pub const QUEUE_CAPACITY: usize = 10_000;

pub const GIB: u64 = 1 << 30;
