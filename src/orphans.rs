//! Orphan Resolver (C8, spec.md §4.2).
//!
//! Restructured into independently callable phase functions — candidate
//! detection, parallel placement, anchoring, interval construction,
//! assignment, verdict — mirroring §4.2.1–§4.2.8, grounded on
//! `AS_BAT_MergeOrphans.C`'s `findPotentialOrphans` / `findOrphanReadPlacements`
//! / `placeAnchor` / `addInitialIntervals` / `saveCorrectlySizedInitialIntervals`
//! / `assignReadsToTargets` / `mergeOrphans`.

use std::collections::HashSet;

use log::warn;
use rustc_hash::FxHashMap;

use crate::best_edges::BestEdgeGraph;
use crate::config::Config;
use crate::intervals::IntervalList;
use crate::overlap::OverlapStore;
use crate::parallel;
use crate::placer::{place_read, OverlapPlacement};
use crate::read::{ReadId, ReadRegistry};
use crate::tig::{ReadPlacement, Tig, TigId, TigVector};

/// A host region an orphan's first and last reads both landed in at
/// approximately the orphan's own size (spec.md §4.2.5).
#[derive(Debug, Clone)]
pub struct CandidatePop {
    pub orphan: TigId,
    pub target: TigId,
    pub bgn: i64,
    pub end: i64,
    pub placed: Vec<OverlapPlacement>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOrphansSummary {
    pub bubbles: usize,
    pub bubble_reads: usize,
    pub unique_orphans: usize,
    pub unique_orphan_reads: usize,
    pub shattered_orphans: usize,
    pub shattered_reads: usize,
    pub unresolved: usize,
    pub unresolved_reads: usize,
}

/// §4.2.1: tigs whose reads are (nearly) entirely covered by overlaps into
/// some other, larger tig.
pub fn find_potential_orphans(
    tigs: &TigVector,
    overlaps: &OverlapStore,
    reads: &ReadRegistry,
) -> FxHashMap<TigId, Vec<TigId>> {
    let mut result = FxHashMap::default();

    for tid in tigs.iter_ids() {
        let tig = tigs.get(tid).unwrap();
        if tig.num_reads() < 2 {
            continue;
        }

        let mut tig_olaps_to: FxHashMap<TigId, u32> = FxHashMap::default();
        let mut tig_coverage = IntervalList::new();

        for rd in tig.placements() {
            if reads.is_contained(rd.rid) {
                continue;
            }

            let mut read_olaps_to: HashSet<TigId> = HashSet::new();

            for ov in overlaps.overlaps_of(rd.rid) {
                let host = tigs.in_unitig(ov.b);
                if host == 0 || host == tid {
                    continue;
                }
                let Some(host_tig) = tigs.get(host) else { continue };
                if host_tig.num_reads() == 1 || host_tig.length() < tig.length() {
                    continue;
                }

                read_olaps_to.insert(host);

                let min = ov.hang_to_min_coord(rd.min, rd.max, !rd.is_reverse);
                let max = ov.hang_to_max_coord(rd.min, rd.max, !rd.is_reverse);
                tig_coverage.add(min, (max - min).max(0));
            }

            for host in read_olaps_to {
                *tig_olaps_to.entry(host).or_insert(0) += 1;
            }
        }

        tig_coverage.merge();

        let n_intervals = tig_coverage.number_of_intervals();
        let bgn_uncovered = if n_intervals > 0 { tig_coverage.lo(0) } else { 0 };
        let end_uncovered = if n_intervals > 0 {
            tig.length() - tig_coverage.hi(n_intervals - 1)
        } else {
            0
        };

        if n_intervals > 10 || (bgn_uncovered > 0 && end_uncovered > 0) {
            continue;
        }

        if !tig_olaps_to.is_empty() {
            let mut hosts: Vec<TigId> = tig_olaps_to.keys().copied().collect();
            hosts.sort_unstable();
            result.insert(tid, hosts);
        }
    }

    result
}

/// Quantile-style admissibility score for placing a read at `[lo, hi]` in
/// `target` given its observed `erate`, relative to the error rates of
/// overlaps anchored by reads already spanning that region. `deviation`
/// standard deviations above the local mean is treated as the cutoff. This
/// is an own interpretation of `overlapConsistentWithTig` — its body isn't
/// part of the retrieved source slice; see DESIGN.md.
fn overlap_consistent_with_tig(target: &Tig, lo: i64, hi: i64, erate: f64, overlaps: &OverlapStore, deviation: f64) -> f64 {
    let local: Vec<f64> = target
        .placements()
        .iter()
        .filter(|p| p.max > lo && p.min < hi)
        .flat_map(|p| overlaps.overlaps_of(p.rid).iter().map(|o| o.erate))
        .collect();

    if local.is_empty() {
        return 0.0;
    }

    let mean = local.iter().sum::<f64>() / local.len() as f64;
    let variance = local.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / local.len() as f64;
    let bound = mean + deviation * variance.sqrt();

    if erate <= bound {
        1.0
    } else {
        0.0
    }
}

/// §4.2.2: parallel per-read placement against every host a read's orphan
/// tig might be popped into.
pub fn find_orphan_read_placements(
    tigs: &TigVector,
    overlaps: &OverlapStore,
    reads: &ReadRegistry,
    potential_orphans: &FxHashMap<TigId, Vec<TigId>>,
    config: &Config,
) -> FxHashMap<ReadId, Vec<OverlapPlacement>> {
    let rids: Vec<ReadId> = reads.ids().collect();

    let results: Vec<(ReadId, Vec<OverlapPlacement>)> = parallel::place_reads_parallel(&rids, config.threads, |rid| {
        let tig_id = tigs.in_unitig(rid);
        if tig_id == 0 || reads.is_contained(rid) {
            return None;
        }
        let hosts = potential_orphans.get(&tig_id)?;

        let mut placements = Vec::new();
        for &host_id in hosts {
            let Some(host_tig) = tigs.get(host_id) else { continue };
            if host_tig.num_reads() <= 1 || potential_orphans.contains_key(&host_id) {
                continue;
            }

            let read_len = reads.len(rid);
            if let Some(p) = place_read(rid, read_len, host_tig, overlaps, 1.0, true) {
                let admissible = p.erate <= config.similarity
                    || overlap_consistent_with_tig(host_tig, p.min(), p.max(), p.erate, overlaps, config.deviation) >= 0.5;
                if admissible {
                    placements.push(p);
                }
            }
        }

        if placements.is_empty() {
            None
        } else {
            Some((rid, placements))
        }
    });

    results.into_iter().collect()
}

/// §4.2.3: both terminal reads of `orphan` must have at least one
/// surviving placement.
pub fn place_anchor(orphan: &Tig, placed: &FxHashMap<ReadId, Vec<OverlapPlacement>>) -> bool {
    let (Some(first), Some(last)) = (orphan.first_read(), orphan.last_read()) else {
        return false;
    };
    let has_placement = |rid: ReadId| placed.get(&rid).map(|v| !v.is_empty()).unwrap_or(false);
    has_placement(first.rid) && has_placement(last.rid)
}

/// §4.2.4: project each candidate placement of the first/last read into a
/// full-orphan-length interval on its host.
fn add_initial_intervals(orphan: &Tig, placed: &FxHashMap<ReadId, Vec<OverlapPlacement>>) -> FxHashMap<TigId, IntervalList> {
    let mut target_intervals: FxHashMap<TigId, IntervalList> = FxHashMap::default();
    let orphan_len = orphan.length();
    let first = orphan.first_read().unwrap();
    let last = orphan.last_read().unwrap();

    if let Some(places) = placed.get(&first.rid) {
        for p in places {
            let il = target_intervals.entry(p.tig_id).or_default();
            if p.is_reverse() == first.is_reverse {
                il.add(p.min(), orphan_len);
            } else {
                il.add(p.max() - orphan_len, orphan_len);
            }
        }
    }

    if let Some(places) = placed.get(&last.rid) {
        for p in places {
            let il = target_intervals.entry(p.tig_id).or_default();
            if p.is_reverse() == last.is_reverse {
                il.add(p.max() - orphan_len, orphan_len);
            } else {
                il.add(p.min(), orphan_len);
            }
        }
    }

    target_intervals
}

fn find_placement_in_interval(
    int_bgn: i64,
    int_end: i64,
    target_id: TigId,
    places: Option<&Vec<OverlapPlacement>>,
) -> Option<(i64, i64)> {
    let places = places?;
    places
        .iter()
        .find(|p| p.tig_id == target_id && int_bgn <= p.min() && p.max() <= int_end)
        .map(|p| (p.min(), p.max()))
}

/// §4.2.5: expand each merged interval by 25% of the orphan's length, and
/// keep it only if both terminal reads land inside at approximately the
/// orphan's own size.
fn save_correctly_sized_initial_intervals(
    orphan: &Tig,
    target: &Tig,
    intervals: &mut IntervalList,
    placed: &FxHashMap<ReadId, Vec<OverlapPlacement>>,
) -> Vec<CandidatePop> {
    let orphan_len = orphan.length() as f64;
    let first = orphan.first_read().unwrap();
    let last = orphan.last_read().unwrap();

    intervals.merge();

    let mut out = Vec::new();
    for (lo, hi) in intervals.iter() {
        let int_bgn = ((lo as f64) - 0.25 * orphan_len).max(0.0) as i64;
        let int_end = (((hi as f64) + 0.25 * orphan_len) as i64).min(target.length());

        let f_pos = find_placement_in_interval(int_bgn, int_end, target.id(), placed.get(&first.rid));
        let l_pos = find_placement_in_interval(int_bgn, int_end, target.id(), placed.get(&last.rid));

        let (Some(f_pos), Some(l_pos)) = (f_pos, l_pos) else { continue };

        let region_min = f_pos.0.min(l_pos.0);
        let region_max = f_pos.1.max(l_pos.1);
        let region_size = (region_max - region_min) as f64;

        if region_size < 0.75 * orphan_len || region_size > 1.25 * orphan_len {
            continue; // OversizedRegion: discard candidate.
        }

        out.push(CandidatePop {
            orphan: orphan.id(),
            target: target.id(),
            bgn: region_min,
            end: region_max,
            placed: Vec::new(),
        });
    }
    out
}

/// §4.2.6: assign each read's placements to whichever candidate pop they
/// fall inside, deduplicating by read id and keeping the lower `erate`.
fn assign_reads_to_targets(orphan: &Tig, placed: &FxHashMap<ReadId, Vec<OverlapPlacement>>, targets: &mut [CandidatePop]) {
    for rp in orphan.placements() {
        let Some(places) = placed.get(&rp.rid) else { continue };
        for p in places {
            for t in targets.iter_mut() {
                if t.target == p.tig_id && p.min() >= t.bgn && p.max() <= t.end {
                    t.placed.push(*p);
                }
            }
        }
    }

    for t in targets.iter_mut() {
        let mut best: FxHashMap<ReadId, OverlapPlacement> = FxHashMap::default();
        for p in t.placed.drain(..) {
            best
                .entry(p.rid)
                .and_modify(|existing| {
                    if p.erate < existing.erate {
                        *existing = p;
                    }
                })
                .or_insert(p);
        }
        t.placed = best.into_values().collect();
    }
}

/// §4.2: the full two-subphase pass, run tig-by-tig in ascending id order.
pub fn merge_orphans(
    tigs: &mut TigVector,
    overlaps: &OverlapStore,
    reads: &ReadRegistry,
    best_edges: &mut BestEdgeGraph,
    config: &Config,
) -> MergeOrphansSummary {
    let mut summary = MergeOrphansSummary::default();

    let potential_orphans = find_potential_orphans(tigs, overlaps, reads);
    if potential_orphans.is_empty() {
        return summary;
    }

    let placed = find_orphan_read_placements(tigs, overlaps, reads, &potential_orphans, config);

    let mut orphan_ids: Vec<TigId> = potential_orphans.keys().copied().collect();
    orphan_ids.sort_unstable();

    for oid in orphan_ids {
        let Some(orphan) = tigs.get(oid) else { continue };

        if !place_anchor(orphan, &placed) {
            continue; // NoPlacement: skip, not an error.
        }

        let target_intervals = add_initial_intervals(orphan, &placed);

        let mut candidate_pops: Vec<CandidatePop> = Vec::new();
        for (host_id, mut il) in target_intervals {
            let Some(host_tig) = tigs.get(host_id) else {
                warn!("orphan {} wants nonexistent tig {}", oid, host_id); // DanglingTarget
                continue;
            };
            let orphan_ref = tigs.get(oid).unwrap();
            candidate_pops.extend(save_correctly_sized_initial_intervals(orphan_ref, host_tig, &mut il, &placed));
        }

        if candidate_pops.is_empty() {
            continue;
        }

        let orphan_ref = tigs.get(oid).unwrap();
        assign_reads_to_targets(orphan_ref, &placed, &mut candidate_pops);

        let n_reads = orphan_ref.num_reads();
        let first_rid = orphan_ref.first_read().unwrap().rid;
        let last_rid = orphan_ref.last_read().unwrap().rid;

        let mut n_orphan = 0usize;
        let mut n_bubble = 0usize;
        let mut orphan_target_idx = 0usize;

        for (idx, c) in candidate_pops.iter().enumerate() {
            let placed_n = c.placed.len();
            let terminal_n = c.placed.iter().filter(|p| p.rid == first_rid || p.rid == last_rid).count();

            if placed_n == n_reads {
                n_orphan += 1;
                orphan_target_idx = idx;
            } else if terminal_n == 2 {
                n_bubble += 1;
            }
        }

        if n_orphan == 0 && n_bubble == 0 {
            summary.unresolved += 1;
            summary.unresolved_reads += n_reads;
            continue;
        }

        if n_orphan == 0 {
            summary.bubbles += 1;
            summary.bubble_reads += n_reads;
            if let Some(t) = tigs.get_mut(oid) {
                t.suggest_bubble = true;
            }
            let rids: Vec<ReadId> = tigs.get(oid).unwrap().placements().iter().map(|p| p.rid).collect();
            for rid in rids {
                best_edges.set_bubble(rid);
            }
            continue;
        }

        if n_orphan == 1 {
            summary.unique_orphans += 1;
            summary.unique_orphan_reads += n_reads;

            let target_id = candidate_pops[orphan_target_idx].target;
            let moves = candidate_pops[orphan_target_idx].placed.clone();
            for p in &moves {
                tigs.add_read(target_id, ReadPlacement::new(p.rid, p.min(), p.max(), p.is_reverse(), 0));
                best_edges.set_orphan(p.rid);
            }
            tigs.delete(oid);
            continue;
        }

        // n_orphan > 1: shatter each read to its own best non-orphan target.
        summary.shattered_orphans += 1;
        summary.shattered_reads += n_reads;

        let rids: Vec<ReadId> = tigs.get(oid).unwrap().placements().iter().map(|p| p.rid).collect();
        for rid in rids {
            if let Some(places) = placed.get(&rid) {
                let best = places
                    .iter()
                    .filter(|p| p.tig_id != oid)
                    .min_by(|a, b| a.erate.partial_cmp(&b.erate).unwrap());
                if let Some(p) = best {
                    tigs.add_read(p.tig_id, ReadPlacement::new(p.rid, p.min(), p.max(), p.is_reverse(), 0));
                    best_edges.set_orphan(p.rid);
                }
            }
        }
        tigs.delete(oid);
    }

    // §4.2.8: re-sort every non-singleton tig.
    for tid in tigs.iter_ids().collect::<Vec<_>>() {
        if tigs.get(tid).map(|t| t.num_reads()).unwrap_or(0) > 1 {
            tigs.sort(tid);
        }
    }

    summary
}
