//! Single-threaded: streams each shard file in turn, building a per-file
//! dedup map and folding the file's unique minimum into a running global
//! minimum.
//!
//! A given `text` always lands in exactly one shard file across all rounds
//! (round >= 1 re-partitions an oversized shard by the same `text`-only
//! hash), so a fresh per-file map is equivalent to one global map and avoids
//! holding every shard's keys in memory at once. The running minimum is
//! tracked as `Option<Record>` rather than a `pos == 0` sentinel, since a
//! real position of `0` would otherwise read as "unset".

use std::io::{BufRead, BufReader};
use std::path::Path;


use ahash::AHashMap;

use crate::errors::PipelineError;
use crate::progress::ProgressScope;
use crate::record::{min_unique, DedupEntry, Record};
use crate::util::open_with_backoff;

pub struct Reducer {
    show_progress: bool,
}

impl Reducer {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    /// Stream every shard file in `paths` and return the earliest
    /// exactly-once line across all of them, if any exists.
    pub fn reduce(&self, paths: &[std::path::PathBuf]) -> Result<Option<Record>, PipelineError> {
        let progress = if self.show_progress {
            ProgressScope::count("reduce", paths.len() as u64)
        } else {
            ProgressScope::hidden()
        };

        let mut best: Option<Record> = None;

        for path in paths {
            tracing::info!(path = %path.display(), "reducer scanning shard");
            if let Some(candidate) = reduce_one_file(path)? {
                best = match best {
                    Some(current) if current.pos <= candidate.pos => Some(current),
                    _ => Some(candidate),
                };
            }
            progress.inc(1);
        }
        progress.finish("reduce done");

        Ok(best)
    }
}

fn reduce_one_file(path: &Path) -> Result<Option<Record>, PipelineError> {
    let file = open_with_backoff(path, 5, 20)?;
    let mut reader = BufReader::new(file);

    let mut map: AHashMap<Vec<u8>, DedupEntry> = AHashMap::new();
    let mut buf: Vec<u8> = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        let record = Record::parse_shard_line(&buf, path)?;
        match map.get_mut(&record.text) {
            Some(entry) => entry.bump(),
            None => {
                map.insert(record.text, DedupEntry::first_seen(record.pos));
            }
        }
    }

    Ok(min_unique(&map))
}
