// Clippy allows
#![allow(clippy::too_many_arguments)]

//! Tig-refinement core: CLI front end.
//!
//! Usage: tig-refine <COMMAND> [OPTIONS]

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use tig_refine::assembly_graph::AssemblyGraph;
use tig_refine::best_edges::BestEdgeGraph;
use tig_refine::config::Config;
use tig_refine::dead_ends::drop_dead_ends;
use tig_refine::error::{CoreError, Result};
use tig_refine::orphans::merge_orphans;
use tig_refine::overlap::OverlapStore;
use tig_refine::read::ReadRegistry;
use tig_refine::tig::TigVector;

#[derive(Parser)]
#[command(name = "tig-refine")]
#[command(version)]
#[command(about = "Tig-refinement core: dead-end trimming and orphan resolution for genome assembly layout", long_about = None)]
struct Cli {
    /// Number of worker threads for the orphan resolver's parallel fan-out
    /// (default: number of CPUs).
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    /// Verbosity: repeat for more detail (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write detailed per-decision trace lines to this file, in addition to
    /// the terse status lines on stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trim dead-end reads off the front and back of every tig (spec §4.1).
    DropDeadEnds {
        /// Assembly-graph file: one line per best-placement entry, `rid
        /// best5rid best3rid bestCrid`.
        #[arg(short, long)]
        assembly_graph: PathBuf,

        /// Tig-store input: one line per read placement, `tig_id rid min max
        /// is_reverse anchor`.
        #[arg(short = 'i', long)]
        tigs: PathBuf,
    },

    /// Merge small orphan tigs back into the larger tigs they're most
    /// consistent with (spec §4.2).
    MergeOrphans {
        /// Overlap store (a_iid b_iid aHang bHang flipped erate length).
        #[arg(short, long)]
        overlaps: PathBuf,

        /// Best-edges file, used for the monotone bubble/orphan marks.
        #[arg(short, long)]
        best_edges: PathBuf,

        /// Tig-store input.
        #[arg(short = 'i', long)]
        tigs: PathBuf,

        /// Standard deviations above expected error tolerated when a
        /// placement's erate exceeds `--similarity` (must be >= 1.0).
        #[arg(long, default_value = "6.0")]
        deviation: f64,

        /// Absolute erate cap below which a placement is admissible
        /// regardless of `--deviation` (must be in [0, 1]).
        #[arg(long, default_value = "0.05")]
        similarity: f64,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = tig_refine::logging::init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("failed to initialize logging: {}", e);
        process::exit(1);
    }

    let result = match cli.command {
        Commands::DropDeadEnds { assembly_graph, tigs } => run_drop_dead_ends(tigs, assembly_graph),
        Commands::MergeOrphans {
            overlaps,
            best_edges,
            tigs,
            deviation,
            similarity,
        } => run_merge_orphans(tigs, overlaps, best_edges, deviation, similarity, cli.threads),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Placeholder read registry until a dedicated reads file format is wired
/// in: containment comes from the best-edges file's status word, lengths
/// are not yet needed by the dead-end trimmer.
fn reads_from_best_edges(best_edges: &BestEdgeGraph, max_rid: u32) -> ReadRegistry {
    let mut reads = ReadRegistry::new(max_rid as usize);
    for rid in 1..=max_rid {
        reads.set(rid, 0, best_edges.is_contained(rid));
    }
    reads
}

fn load_tigs(path: &PathBuf) -> Result<TigVector> {
    use std::io::BufRead;
    use tig_refine::tig::ReadPlacement;

    let file = File::open(path)?;
    let mut tv = TigVector::new();
    let mut by_tig: rustc_hash::FxHashMap<u32, Vec<ReadPlacement>> = rustc_hash::FxHashMap::default();
    let mut flags_by_tig: rustc_hash::FxHashMap<u32, String> = rustc_hash::FxHashMap::default();

    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }
        let tig_id: u32 = fields[0].parse().unwrap_or(0);
        let rid: u32 = fields[1].parse().unwrap_or(0);
        let min: i64 = fields[2].parse().unwrap_or(0);
        let max: i64 = fields[3].parse().unwrap_or(0);
        let is_reverse = fields[4] == "1" || fields[4].eq_ignore_ascii_case("true");
        let anchor: u32 = fields[5].parse().unwrap_or(0);
        // Optional 7th column: a 4-char flag word (class letter + R/C/B
        // suggest bits), e.g. "CR--". Consensus bases and per-child delta
        // encoding are outside this core's scope and are not round-tripped.
        if let Some(flags) = fields.get(6) {
            flags_by_tig.insert(tig_id, flags.to_string());
        }
        by_tig
            .entry(tig_id)
            .or_default()
            .push(ReadPlacement::new(rid, min, max, is_reverse, anchor));
    }

    let mut tig_ids: Vec<u32> = by_tig.keys().copied().collect();
    tig_ids.sort_unstable();
    for old_id in tig_ids {
        let new_id = tv.new_tig();
        for p in by_tig.remove(&old_id).unwrap() {
            tv.add_read(new_id, p);
        }
        tv.sort(new_id);
        if let Some(flags) = flags_by_tig.get(&old_id) {
            apply_flags(&mut tv, new_id, flags);
        }
    }

    Ok(tv)
}

fn apply_flags(tv: &mut TigVector, tig_id: u32, flags: &str) {
    use tig_refine::tig::TigClass;
    let chars: Vec<char> = flags.chars().collect();
    let Some(tig) = tv.get_mut(tig_id) else { return };
    tig.class = match chars.first() {
        Some('U') => TigClass::Unassembled,
        Some('B') => TigClass::Bubble,
        _ => TigClass::Contig,
    };
    tig.suggest_repeat = chars.get(1).copied() == Some('R');
    tig.suggest_circular = chars.get(2).copied() == Some('C');
    tig.suggest_bubble = chars.get(3).copied() == Some('B');
}

fn max_rid(tigs: &TigVector) -> u32 {
    tigs.iter_ids()
        .filter_map(|id| tigs.get(id))
        .flat_map(|t| t.placements().iter().map(|p| p.rid))
        .max()
        .unwrap_or(0)
}

fn run_drop_dead_ends(tigs_path: PathBuf, assembly_graph_path: PathBuf) -> Result<()> {
    let ag = AssemblyGraph::load(BufReader::new(File::open(&assembly_graph_path)?))?;
    let mut tigs = load_tigs(&tigs_path)?;

    let summary = drop_dead_ends(&mut tigs, &ag);
    println!(
        "examined {} tigs, split {}, dropped {} front reads, {} back reads",
        summary.tigs_examined, summary.tigs_split, summary.front_reads_dropped, summary.back_reads_dropped
    );
    Ok(())
}

fn run_merge_orphans(
    tigs_path: PathBuf,
    overlaps_path: PathBuf,
    best_edges_path: PathBuf,
    deviation: f64,
    similarity: f64,
    threads: Option<usize>,
) -> Result<()> {
    let mut best_edges = BestEdgeGraph::load(BufReader::new(File::open(&best_edges_path)?))
        .map_err(|_| CoreError::MissingBestEdges)?;
    let overlaps = OverlapStore::load(BufReader::new(File::open(&overlaps_path)?))?;
    let mut tigs = load_tigs(&tigs_path)?;
    let reads = reads_from_best_edges(&best_edges, max_rid(&tigs));
    let config = Config::new(deviation, similarity).with_threads(threads);

    let summary = merge_orphans(&mut tigs, &overlaps, &reads, &mut best_edges, &config);
    println!(
        "{} unique orphans merged ({} reads), {} bubbles ({} reads), {} shattered ({} reads), {} unresolved ({} reads)",
        summary.unique_orphans,
        summary.unique_orphan_reads,
        summary.bubbles,
        summary.bubble_reads,
        summary.shattered_orphans,
        summary.shattered_reads,
        summary.unresolved,
        summary.unresolved_reads,
    );
    Ok(())
}
