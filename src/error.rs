//! Crate error types for the tig-refinement core (spec §7).

use std::io;
use thiserror::Error;

/// Errors the core can raise.
///
/// Per §7, only [`CoreError::MissingBestEdges`] and
/// [`CoreError::InconsistentTigVector`] are fatal. The remaining variants
/// are never returned from the public passes — they exist so call sites can
/// format a typed value for `log::warn!` and so unit tests can assert the
/// skip behavior precisely.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("best-edges file error at line {line}: {message}")]
    BestEdgesParse { line: usize, message: String },

    #[error("best-edges file is missing or malformed")]
    MissingBestEdges,

    #[error("assembly-graph file error at line {line}: {message}")]
    AssemblyGraphParse { line: usize, message: String },

    #[error("inUnitig({rid}) disagrees with the tig holding it")]
    InconsistentTigVector { rid: u32 },

    #[error("orphan {orphan} targets tombstoned tig {target}")]
    DanglingTarget { orphan: u32, target: u32 },

    #[error("read {rid} has no surviving placement")]
    NoPlacement { rid: u32 },

    #[error("candidate region size {size} outside [{lo}, {hi}] for orphan {orphan}")]
    OversizedRegion {
        orphan: u32,
        size: i64,
        lo: i64,
        hi: i64,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
