// Clippy allows for the whole crate
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::type_complexity)]

//! Tig-refinement core for genome assembly string-graph layout.
//!
//! Given a set of tentative contigs (tigs), an overlap index, and a
//! best-edges graph, this crate runs two cleanup passes over the tig set:
//!
//! - [`dead_ends`]: trims reads off the ends of a tig that have no
//!   supporting best-edge evidence for continuing the layout there.
//! - [`orphans`]: finds small tigs that are better explained as reads
//!   misplaced from a larger tig, and either merges them back in, marks
//!   them as bubbles, or shatters them across their best individual
//!   targets.
//!
//! # Example
//!
//! ```rust,no_run
//! use tig_refine::prelude::*;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let overlaps = OverlapStore::load(BufReader::new(File::open("overlaps.ovb").unwrap())).unwrap();
//! let mut best_edges = BestEdgeGraph::load(BufReader::new(File::open("best.edges").unwrap())).unwrap();
//! let reads = ReadRegistry::new(0);
//! let ag = AssemblyGraph::new();
//! let mut tigs = TigVector::new();
//!
//! drop_dead_ends(&mut tigs, &ag);
//! merge_orphans(&mut tigs, &overlaps, &reads, &mut best_edges, &Config::default());
//! ```

pub mod assembly_graph;
pub mod best_edges;
pub mod config;
pub mod dead_ends;
pub mod error;
pub mod intervals;
pub mod logging;
pub mod orphans;
pub mod overlap;
pub mod parallel;
pub mod placer;
pub mod read;
pub mod tig;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::assembly_graph::{AssemblyGraph, BestPlacement};
    pub use crate::best_edges::{BestEdgeGraph, ReadStatus};
    pub use crate::config::Config;
    pub use crate::dead_ends::{drop_dead_ends, DropDeadSummary};
    pub use crate::error::{CoreError, Result};
    pub use crate::orphans::{merge_orphans, MergeOrphansSummary};
    pub use crate::overlap::{Overlap, OverlapStore};
    pub use crate::read::{ReadId, ReadRegistry};
    pub use crate::tig::{ReadPlacement, Tig, TigClass, TigId, TigVector};
}
