//! Error types for attribute manipulation and partitioning.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectError>;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("expected exactly one remainder partition, found {0}")]
    RemainderPartitions(usize),

    #[error("unknown partition name: {0}")]
    UnknownPartition(String),
}
