use std::path::{Path, PathBuf};

use crate::constants::GIB;
use crate::errors::PipelineError;

/// User-facing pipeline configuration with sensible defaults and builder
/// chaining, modeled on the upstream options struct.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub shard_dir: PathBuf,
    pub worker_count: usize,
    pub max_size_gb: u64,
    /// Test/diagnostic escape hatch: force an exact oversize threshold in bytes
    /// instead of the GiB-bucketed one, so tests don't need gigabyte-sized
    /// fixtures to exercise the oversize path.
    max_shard_bytes_override: Option<u64>,
    pub progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            shard_dir: PathBuf::new(),
            worker_count: 8,
            max_size_gb: 1,
            max_shard_bytes_override: None,
            progress: true,
        }
    }
}

impl PipelineConfig {
    pub fn new(input_path: impl AsRef<Path>, shard_dir: impl AsRef<Path>) -> Self {
        Self {
            input_path: input_path.as_ref().to_path_buf(),
            shard_dir: shard_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_worker_count(mut self, n: usize) -> Self {
        self.worker_count = n;
        self
    }

    pub fn with_max_size_gb(mut self, gb: u64) -> Self {
        self.max_size_gb = gb;
        self.max_shard_bytes_override = None;
        self
    }

    pub fn with_max_shard_bytes(mut self, bytes: u64) -> Self {
        self.max_shard_bytes_override = Some(bytes);
        self
    }

    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    pub fn max_shard_bytes(&self) -> u64 {
        self.max_shard_bytes_override.unwrap_or(self.max_size_gb * GIB)
    }

    /// Validate configuration at startup.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.worker_count == 0 {
            return Err(PipelineError::Config("worker_count must be positive".into()));
        }
        if self.max_shard_bytes_override.is_none() && self.max_size_gb == 0 {
            return Err(PipelineError::Config("max_size_gb must be positive".into()));
        }
        if self.input_path.as_os_str().is_empty() {
            return Err(PipelineError::Config("input_path must be set".into()));
        }
        if self.shard_dir.as_os_str().is_empty() {
            return Err(PipelineError::Config("shard_dir must be set".into()));
        }
        if !self.shard_dir.is_dir() {
            return Err(PipelineError::PathMissing(self.shard_dir.clone()));
        }
        Ok(())
    }
}
