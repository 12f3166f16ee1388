//! Shard-directory bookkeeping: where a worker's file lives, which shard
//! files exceed the size budget, and which shards exist for a given round.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Path of the shard file owned by `worker_idx` for a given round.
/// `round` is folded into the name so rounds never collide on disk.
pub fn shard_path(shard_dir: &Path, round: u32, worker_idx: usize) -> PathBuf {
    shard_dir.join(format!("round-{round}-shard-{worker_idx:04}.txt"))
}

/// Every shard file belonging to `round`, in worker-index order.
pub fn round_shard_paths(shard_dir: &Path, round: u32, worker_count: usize) -> Vec<PathBuf> {
    (0..worker_count).map(|i| shard_path(shard_dir, round, i)).collect()
}

/// Walk `shard_dir` and return every regular file strictly larger than
/// `max_bytes` — these are the shards that need another partitioning round.
pub fn oversized_shards(shard_dir: &Path, max_bytes: u64) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(shard_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let size = fs::metadata(entry.path())?.len();
        if size > max_bytes {
            out.push(entry.path().to_path_buf());
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn shard_path_includes_round_and_worker() {
        let dir = PathBuf::from("/tmp/shards");
        let p = shard_path(&dir, 1, 3);
        assert_eq!(p, dir.join("round-1-shard-0003.txt"));
    }

    #[test]
    fn oversized_shards_respects_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let small = tmp.path().join("small.txt");
        let big = tmp.path().join("big.txt");
        File::create(&small).unwrap().write_all(b"a").unwrap();
        File::create(&big).unwrap().write_all(&vec![0u8; 1024]).unwrap();

        let found = oversized_shards(tmp.path(), 100).unwrap();
        assert_eq!(found, vec![big]);
    }

    #[test]
    fn oversized_shards_empty_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(oversized_shards(tmp.path(), 10).unwrap().is_empty());
    }
}
