//! Sequences the map and reduce phases and reports the result.

use walkdir::WalkDir;

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::mapper::{MapOutcome, Mapper};
use crate::reducer::Reducer;
use crate::record::Record;

#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub map_outcome: MapOutcome,
    pub answer: Option<Record>,
}

pub struct Driver<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<PipelineResult, PipelineError> {
        self.config.validate()?;

        let map_outcome = Mapper::new(self.config).run()?;
        tracing::info!(
            rounds = map_outcome.rounds_run,
            completed = map_outcome.completed,
            "mapper finished"
        );

        let shard_files = final_shard_files(&self.config.shard_dir)?;
        let answer = Reducer::new(self.config.progress).reduce(&shard_files)?;

        Ok(PipelineResult { map_outcome, answer })
    }
}

/// Every file left standing in `shard_dir` once the mapper has stopped is
/// part of the final partition: oversized shards are deleted as soon as a
/// later round reprocesses them, so nothing but final output remains.
fn final_shard_files(shard_dir: &std::path::Path) -> Result<Vec<std::path::PathBuf>, PipelineError> {
    let mut files: Vec<_> = WalkDir::new(shard_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    Ok(files)
}
