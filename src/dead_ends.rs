//! Dead-End Trimmer (C7, spec.md §4.1).
//!
//! Grounded directly on `AS_BAT_DropDeadEnds.C`'s `findNextRead` /
//! `dropDeadFirstRead` / `dropDeadEnds`.

use log::{debug, info, warn};

use crate::assembly_graph::AssemblyGraph;
use crate::read::ReadId;
use crate::tig::{ReadPlacement, Tig, TigClass, TigId, TigVector};

/// Counts accumulated across one `drop_dead_ends` run, surfaced to the
/// driver for reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropDeadSummary {
    pub tigs_examined: usize,
    pub tigs_split: usize,
    pub front_reads_dropped: usize,
    pub back_reads_dropped: usize,
}

/// Find the next read after `start_idx` that either dovetail-extends past
/// `fn`'s reach, or is positionally contained inside the read that follows
/// it (spec.md §4.1.2). Purely positional: no registry lookup.
pub fn find_next_read(tig: &Tig, start_idx: usize) -> Option<usize> {
    let placements = tig.placements();
    let fn_p = placements.get(start_idx)?;

    let mut j = start_idx + 1;
    while j < placements.len() {
        let nn = &placements[j];

        if fn_p.max < nn.max {
            return Some(j);
        }

        if let Some(next) = placements.get(j + 1) {
            if next.min < nn.max {
                return Some(j);
            }
        }

        j += 1;
    }

    None
}

/// Decide whether the first read of `tig` is a dead end. Returns the read
/// id to drop, or `0` to keep (spec.md §4.1.3).
pub fn drop_dead_first_read(tig: &Tig, ag: &AssemblyGraph) -> ReadId {
    let fn_p = match tig.first_read() {
        Some(p) => *p,
        None => return 0,
    };

    let sn_idx = match find_next_read(tig, 0) {
        Some(i) => i,
        None => return 0, // step 1: no next read, keep.
    };
    let sn_p = tig.placements()[sn_idx];

    let fn_forward_placements = ag.get_forward(fn_p.rid);
    if fn_forward_placements.is_empty() {
        debug!("read {} has no best placements; deferring to sn evidence", fn_p.rid);
    }
    let fn_forward = !fn_p.is_reverse;
    for bp in fn_forward_placements {
        if bp.best_c != 0 {
            return 0; // step 2: contained elsewhere, keep.
        }
        let out_edge = if fn_forward { bp.best5 } else { bp.best3 };
        if out_edge != 0 {
            return 0; // step 2: fn has its own outgoing evidence, keep.
        }
    }

    // step 4: consult sn's best placements.
    let sn_forward = !sn_p.is_reverse;
    for bp in ag.get_forward(sn_p.rid) {
        if bp.best_c != 0 && bp.best_c != fn_p.rid {
            return fn_p.rid; // sn is contained in something other than fn.
        }
        let out_edge = if sn_forward { bp.best5 } else { bp.best3 };
        if out_edge != 0 && out_edge != fn_p.rid {
            return fn_p.rid; // sn's outgoing edge points elsewhere.
        }
    }

    0 // step 5: sn's only evidence points back at fn, keep.
}

/// Run the Dead-End Trimmer over every eligible tig (spec.md §4.1.1,
/// §4.1.4). Tigs with fewer than two reads or flagged `Unassembled` are
/// never touched (spec.md §8 boundary behaviours).
pub fn drop_dead_ends(tigs: &mut TigVector, ag: &AssemblyGraph) -> DropDeadSummary {
    let mut summary = DropDeadSummary::default();
    let candidates: Vec<TigId> = tigs.iter_ids().collect();

    for tid in candidates {
        let Some(tig) = tigs.get(tid) else { continue };
        if tig.num_reads() < 2 || tig.class == TigClass::Unassembled {
            continue;
        }
        summary.tigs_examined += 1;

        let fn_rid = drop_dead_first_read(tig, ag);

        tigs.reverse_complement(tid);
        let ln_rid = drop_dead_first_read(tigs.get(tid).unwrap(), ag);
        tigs.reverse_complement(tid);

        if fn_rid == 0 && ln_rid == 0 {
            continue;
        }
        if fn_rid == ln_rid {
            // fn == ln != 0: the excised read spans the whole tig (spec.md
            // §4.1.4, §8 S2). Leave it alone.
            continue;
        }

        info!("tig {} split: fn={} ln={}", tid, fn_rid, ln_rid);
        split_tig(tigs, tid, fn_rid, ln_rid, &mut summary);
    }

    summary
}

fn split_tig(tigs: &mut TigVector, original: TigId, fn_rid: ReadId, ln_rid: ReadId, summary: &mut DropDeadSummary) {
    let Some(tig) = tigs.get(original) else {
        warn!("tig {} vanished before split could run", original);
        return;
    };
    let placements: Vec<ReadPlacement> = tig.placements().to_vec();

    let has_middle = placements.iter().any(|p| p.rid != fn_rid && p.rid != ln_rid);

    let fn_tig = (fn_rid != 0).then(|| tigs.new_tig());
    let middle_tig = has_middle.then(|| tigs.new_tig());
    let ln_tig = (ln_rid != 0).then(|| tigs.new_tig());

    for p in placements {
        let dest = if fn_rid != 0 && p.rid == fn_rid {
            fn_tig
        } else if ln_rid != 0 && p.rid == ln_rid {
            ln_tig
        } else {
            middle_tig
        };
        if let Some(dest_id) = dest {
            tigs.add_read(dest_id, p);
        }
    }

    for id in [fn_tig, middle_tig, ln_tig].into_iter().flatten() {
        tigs.sort(id);
    }

    tigs.delete(original);

    summary.tigs_split += 1;
    if fn_tig.is_some() {
        summary.front_reads_dropped += 1;
    }
    if ln_tig.is_some() {
        summary.back_reads_dropped += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly_graph::BestPlacement;

    fn build_tig(tv: &mut TigVector, placements: &[(ReadId, i64, i64, ReadId)]) -> TigId {
        let t = tv.new_tig();
        for &(rid, min, max, anchor) in placements {
            tv.add_read(t, ReadPlacement::new(rid, min, max, false, anchor));
        }
        tv.sort(t);
        t
    }

    /// S1: tig [A@0-1000, B@500-1500, C@1000-2000]; A has no best edges at
    /// all; B has best5 = C. Expected split into {[A]} and
    /// {[B@0-1000, C@500-1500]}.
    #[test]
    fn test_s1_dead_end_at_head() {
        let mut tv = TigVector::new();
        let t = build_tig(&mut tv, &[(1, 0, 1000, 0), (2, 500, 1500, 1), (3, 1000, 2000, 2)]);

        let mut ag = AssemblyGraph::new();
        // B (read 2) is forward and has best5 = C (read 3).
        ag.push_forward(2, BestPlacement::new(3, 0, 0));

        let summary = drop_dead_ends(&mut tv, &ag);

        assert_eq!(summary.tigs_split, 1);
        assert_eq!(tv.num_tigs(), 2);

        let mut found_singleton = false;
        let mut found_pair = false;
        for id in tv.iter_ids() {
            let tig = tv.get(id).unwrap();
            if tig.num_reads() == 1 {
                assert_eq!(tig.first_read().unwrap().rid, 1);
                found_singleton = true;
            } else if tig.num_reads() == 2 {
                assert_eq!(tig.first_read().unwrap().rid, 2);
                assert_eq!(tig.first_read().unwrap().min, 0);
                assert_eq!(tig.last_read().unwrap().rid, 3);
                found_pair = true;
            }
        }
        assert!(found_singleton && found_pair);
        assert!(tv.get(t).is_none());
    }

    /// S2: [X@0-5000, Y@100-200], X contained spanning; expect unchanged.
    #[test]
    fn test_s2_spanning_singleton_preserved() {
        let mut tv = TigVector::new();
        let t = build_tig(&mut tv, &[(1, 0, 5000, 0), (2, 100, 200, 1)]);

        let ag = AssemblyGraph::new();

        let summary = drop_dead_ends(&mut tv, &ag);

        assert_eq!(summary.tigs_split, 0);
        assert_eq!(tv.num_tigs(), 1);
        assert_eq!(tv.get(t).unwrap().num_reads(), 2);
    }

    #[test]
    fn test_singleton_tig_never_touched() {
        let mut tv = TigVector::new();
        let t = build_tig(&mut tv, &[(1, 0, 1000, 0)]);

        let ag = AssemblyGraph::new();
        let summary = drop_dead_ends(&mut tv, &ag);

        assert_eq!(summary.tigs_examined, 0);
        assert_eq!(tv.get(t).unwrap().num_reads(), 1);
    }

    #[test]
    fn test_unassembled_tig_never_touched() {
        let mut tv = TigVector::new();
        let t = build_tig(&mut tv, &[(1, 0, 1000, 0), (2, 900, 1900, 1)]);
        tv.get_mut(t).unwrap().class = TigClass::Unassembled;

        let ag = AssemblyGraph::new();
        let summary = drop_dead_ends(&mut tv, &ag);

        assert_eq!(summary.tigs_examined, 0);
    }

    #[test]
    fn test_keep_when_fn_has_outgoing_edge() {
        let mut tv = TigVector::new();
        build_tig(&mut tv, &[(1, 0, 1000, 0), (2, 900, 1900, 1)]);

        let mut ag = AssemblyGraph::new();
        ag.push_forward(1, BestPlacement::new(2, 0, 0));

        let summary = drop_dead_ends(&mut tv, &ag);
        assert_eq!(summary.tigs_split, 0);
    }

    #[test]
    fn test_fixed_point_property() {
        let mut tv = TigVector::new();
        build_tig(&mut tv, &[(1, 0, 1000, 0), (2, 500, 1500, 1), (3, 1000, 2000, 2)]);

        let mut ag = AssemblyGraph::new();
        ag.push_forward(2, BestPlacement::new(3, 0, 0));

        drop_dead_ends(&mut tv, &ag);
        let second_run = drop_dead_ends(&mut tv, &ag);

        assert_eq!(second_run.tigs_split, 0);
    }

    /// No following placement at all: `fn` neither dovetails past `nn` nor
    /// is `nn` positionally contained, so there is nothing to return.
    #[test]
    fn test_find_next_read_skips_isolated_contained() {
        let mut tv = TigVector::new();
        let t = build_tig(&mut tv, &[(1, 0, 1000, 0), (2, 100, 200, 1)]);

        let tig = tv.get(t).unwrap();
        assert_eq!(find_next_read(tig, 0), None);
    }

    /// `nn` (read 2) is positionally contained: the read after it (read 3)
    /// starts before `nn`'s `max`, so `nn` is returned even though `fn`
    /// doesn't dovetail past it.
    #[test]
    fn test_find_next_read_takes_non_isolated_contained() {
        let mut tv = TigVector::new();
        let t = build_tig(&mut tv, &[(1, 0, 1000, 0), (2, 100, 200, 1), (3, 150, 1200, 2)]);

        let tig = tv.get(t).unwrap();
        assert_eq!(find_next_read(tig, 0), Some(1));
    }
}
