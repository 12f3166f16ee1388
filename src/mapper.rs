//! Adaptively re-partitions the input across up to `ROUND_CAP` rounds until
//! every output shard fits the size budget.
//!
//! Each line is dispatched exactly once per round, and a shard's recorded
//! `pos` is carried forward unchanged rather than being recomputed as a new
//! per-round ordinal.

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::PipelineConfig;
use crate::constants::{QUEUE_CAPACITY, ROUND_CAP};
use crate::errors::PipelineError;
use crate::progress::ProgressScope;
use crate::record::Record;
use crate::shard::oversized_shards;
use crate::strategy::PartitionStrategy;
use crate::util::{open_with_backoff, remove_with_backoff};
use crate::writer::spawn_shard_writer;

#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub rounds_run: u32,
    pub completed: bool,
}

pub struct Mapper<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Mapper<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<MapOutcome, PipelineError> {
        let mut inputs = vec![self.config.input_path.clone()];
        let mut round = 0u32;
        let mut completed = false;

        while round < ROUND_CAP {
            tracing::info!(
                round,
                files = inputs.len(),
                mem_avail = crate::mem::available_memory_fraction(),
                "mapper round begin"
            );
            self.run_round(round, &inputs)?;

            if round > 0 {
                for path in &inputs {
                    remove_with_backoff(path, 5, 20)
                        .map_err(|e| PipelineError::Config(e.to_string()))?;
                }
            }

            let oversized = oversized_shards(&self.config.shard_dir, self.config.max_shard_bytes())?;
            tracing::info!(round, oversized = oversized.len(), "mapper round end");

            if oversized.is_empty() {
                completed = true;
                round += 1;
                break;
            }

            inputs = oversized;
            round += 1;
        }

        Ok(MapOutcome { rounds_run: round, completed })
    }

    /// Run a single round: spin up one writer thread per worker, stream
    /// every input file through the round's strategy, then close the
    /// queues and wait for every writer to drain and exit.
    fn run_round(&self, round: u32, inputs: &[PathBuf]) -> Result<(), PipelineError> {
        let worker_count = self.config.worker_count;
        let mut strategy = PartitionStrategy::for_round(round)?;
        tracing::debug!(round, strategy = strategy.name(), "strategy selected");

        let mut senders: Vec<Sender<Record>> = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);
        for idx in 0..worker_count {
            let (tx, rx): (Sender<Record>, Receiver<Record>) = bounded(QUEUE_CAPACITY);
            senders.push(tx);
            handles.push(spawn_shard_writer(self.config.shard_dir.clone(), round, idx, rx));
        }

        if round == 0 {
            let input = &inputs[0];
            let total_bytes = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0);
            let progress = if self.config.progress {
                ProgressScope::bytes(format!("round {round}"), total_bytes)
            } else {
                ProgressScope::hidden()
            };
            dispatch_fresh_file(input, &mut strategy, worker_count, &senders, &progress)?;
            progress.finish(format!("round {round} dispatched"));
        } else {
            let progress = if self.config.progress {
                ProgressScope::count(format!("round {round}"), inputs.len() as u64)
            } else {
                ProgressScope::hidden()
            };
            for path in inputs {
                dispatch_shard_file(path, &mut strategy, worker_count, &senders)?;
                progress.inc(1);
            }
            progress.finish(format!("round {round} dispatched"));
        }

        strategy.done(&senders)?;
        drop(senders);

        for (idx, handle) in handles.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| PipelineError::WriterPanicked(idx))??;
        }

        Ok(())
    }
}

/// Round 0: the raw input file. Each line becomes a record with a fresh
/// 1-based ordinal position.
fn dispatch_fresh_file(
    path: &Path,
    strategy: &mut PartitionStrategy,
    worker_count: usize,
    senders: &[Sender<Record>],
    progress: &ProgressScope,
) -> Result<(), PipelineError> {
    if !path.exists() {
        return Err(PipelineError::PathMissing(path.to_path_buf()));
    }
    let file = open_with_backoff(path, 5, 20)?;
    let mut reader = BufReader::new(file);
    let mut pos: u64 = 1;
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
        strategy.dispatch(buf.clone(), pos, worker_count, senders)?;
        progress.inc(n as u64);
        pos += 1;
    }
    Ok(())
}

/// Round >= 1: an oversized shard from the previous round. Each line is
/// `"<text>\t<pos>"`; the recorded `pos` is carried forward unchanged.
fn dispatch_shard_file(
    path: &Path,
    strategy: &mut PartitionStrategy,
    worker_count: usize,
    senders: &[Sender<Record>],
) -> Result<(), PipelineError> {
    let file = open_with_backoff(path, 5, 20)?;
    let mut reader = BufReader::new(file);
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
        strategy.dispatch(record.text, record.pos, worker_count, senders)?;
    }
    Ok(())
}
