use std::path::PathBuf;
use thiserror::Error;

/// Typed failure kinds surfaced to the `Driver`.
///
/// `anyhow::Result` is used at call boundaries to attach file/round context;
/// this enum is what the driver actually matches on to decide exit behavior.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("path does not exist: {0}")]
    PathMissing(PathBuf),

    #[error("round {0} has no partition strategy (round cap is {1})")]
    UnsupportedStrategy(u32, u32),

    #[error("malformed shard line in {path}: {line:?} (expected \"<text>\\t<pos>\")")]
    MalformedShard { path: PathBuf, line: String },

    #[error("shard writer channel closed before shutdown was signaled")]
    ChannelClosed,

    #[error("shard writer thread for worker {0} panicked")]
    WriterPanicked(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
