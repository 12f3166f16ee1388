//! Per-shard writer thread: buffers records from its queue and flushes to
//! disk on threshold, idle timeout, or queue shutdown.
//!
//! There's no separate stop channel: closing the `Sender` side is enough to
//! make `recv(rx)` return the buffered backlog via `Ok` and only then
//! `Err(RecvError)`, which doubles as the "drain, then final flush" signal.

use std::io::Write as _;
use std::path::PathBuf;
use std::thread::JoinHandle;

use crossbeam_channel::{after, select, Receiver};

use crate::constants::{FLUSH_THRESHOLD, IDLE_FLUSH};
use crate::errors::PipelineError;
use crate::record::Record;
use crate::shard::shard_path;
use crate::util::create_with_backoff;

#[derive(Debug, Default, Clone, Copy)]
pub struct ShardWriterStats {
    pub lines_written: u64,
    pub flush_count: u64,
}

/// Spawn the worker thread owning shard `worker_idx` for `round`. Returns a
/// join handle yielding the final write stats once the queue is drained.
pub fn spawn_shard_writer(
    shard_dir: PathBuf,
    round: u32,
    worker_idx: usize,
    rx: Receiver<Record>,
) -> JoinHandle<Result<ShardWriterStats, PipelineError>> {
    std::thread::Builder::new()
        .name(format!("shard-writer-{round}-{worker_idx}"))
        .spawn(move || run_writer(shard_dir, round, worker_idx, rx))
        .expect("spawn shard writer thread")
}

fn run_writer(
    shard_dir: PathBuf,
    round: u32,
    worker_idx: usize,
    rx: Receiver<Record>,
) -> Result<ShardWriterStats, PipelineError> {
    let path = shard_path(&shard_dir, round, worker_idx);
    let mut buffer: Vec<Record> = Vec::with_capacity(FLUSH_THRESHOLD);
    let mut stats = ShardWriterStats::default();

    loop {
        select! {
            recv(rx) -> msg => match msg {
                Ok(record) => {
                    buffer.push(record);
                    if buffer.len() > FLUSH_THRESHOLD {
                        flush(&path, &mut buffer, &mut stats)?;
                    }
                }
                Err(_) => {
                    // Sender dropped; queue already drained by crossbeam's
                    // Ok-until-empty delivery order.
                    flush(&path, &mut buffer, &mut stats)?;
                    return Ok(stats);
                }
            },
            recv(after(IDLE_FLUSH)) -> _ => {
                flush(&path, &mut buffer, &mut stats)?;
            }
        }
    }
}

fn flush(path: &std::path::Path, buffer: &mut Vec<Record>, stats: &mut ShardWriterStats) -> Result<(), PipelineError> {
    if buffer.is_empty() {
        return Ok(());
    }
    let mut file = create_with_backoff(path, 5, 20)?;
    for record in buffer.iter() {
        file.write_all(&record.to_line())?;
    }
    file.flush()?;
    stats.lines_written += buffer.len() as u64;
    stats.flush_count += 1;
    buffer.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;

    #[test]
    fn writer_flushes_on_shutdown_and_drains_backlog() {
        let tmp = tempfile::tempdir().unwrap();
        let (tx, rx) = crossbeam_channel::bounded(64);
        let handle = spawn_shard_writer(tmp.path().to_path_buf(), 0, 0, rx);

        for i in 0..50u64 {
            tx.send(Record::new(format!("line{i}"), i)).unwrap();
        }
        drop(tx);

        let stats = handle.join().unwrap().unwrap();
        assert_eq!(stats.lines_written, 50);

        let path = shard_path(tmp.path(), 0, 0);
        let contents = std::fs::read(&path).unwrap();
        let lines: Vec<_> = contents.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 50);
        assert_eq!(lines[0], "line0\t0");
    }

    #[test]
    fn writer_flushes_past_threshold_before_shutdown() {
        let tmp = tempfile::tempdir().unwrap();
        let (tx, rx) = crossbeam_channel::bounded(64);
        let handle = spawn_shard_writer(tmp.path().to_path_buf(), 0, 1, rx);

        for i in 0..(FLUSH_THRESHOLD as u64 + 5) {
            tx.send(Record::new("x", i)).unwrap();
        }
        drop(tx);

        let stats = handle.join().unwrap().unwrap();
        assert_eq!(stats.lines_written, FLUSH_THRESHOLD as u64 + 5);
        assert!(stats.flush_count >= 2);
    }
}
