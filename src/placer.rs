//! Read Placer (C6): a pure function mapping a candidate read plus the
//! overlaps it has to reads already in a tig into a tig-frame placement.
//!
//! Grounded on `placeReadUsingOverlaps(..., placeRead_noExtend)` (referenced,
//! body not included in the retrieved source slice — see DESIGN.md for the
//! resulting hang-projection design decision this module builds on).

use crate::overlap::{Overlap, OverlapStore};
use crate::read::ReadId;
use crate::tig::{Tig, TigId};

/// A candidate placement of a read into a tig. Orientation is sign-encoded
/// in `bgn`/`end`: `bgn > end` means the read is placed reverse-complemented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapPlacement {
    pub rid: ReadId,
    pub tig_id: TigId,
    pub bgn: i64,
    pub end: i64,
    pub erate: f64,
    pub f_coverage: f64,
}

impl OverlapPlacement {
    pub fn is_reverse(&self) -> bool {
        self.bgn > self.end
    }

    pub fn min(&self) -> i64 {
        self.bgn.min(self.end)
    }

    pub fn max(&self) -> i64 {
        self.bgn.max(self.end)
    }
}

/// Place `rid` into `tig` using whichever already-placed read gives the
/// lowest-error-rate overlap. Returns `None` if `rid` has no overlap to any
/// read currently in `tig`, or (when `no_extend` is set) if the only
/// candidate placement would fall outside `tig`'s current span — the policy
/// the Orphan Resolver's target-interval search uses so candidate regions
/// are bounded by the tig being searched, not grown by it.
pub fn place_read(
    rid: ReadId,
    read_len: u32,
    tig: &Tig,
    store: &OverlapStore,
    max_erate: f64,
    no_extend: bool,
) -> Option<OverlapPlacement> {
    let mut best: Option<(i64, i64, bool, f64)> = None;

    for anchor in tig.placements() {
        for ov in store.overlaps_of(anchor.rid) {
            if ov.b != rid || ov.erate > max_erate {
                continue;
            }

            let candidate = project(ov, anchor.min, anchor.max, anchor.is_reverse);
            let is_better = match best {
                None => true,
                Some((_, _, _, best_erate)) => ov.erate < best_erate,
            };
            if is_better {
                best = Some((candidate.0, candidate.1, candidate.2, ov.erate));
            }
        }
    }

    let (min, max, is_reverse, erate) = best?;

    if no_extend && (min < 0 || max > tig.length()) {
        return None;
    }

    let placed_len = (max - min).max(0) as f64;
    let f_coverage = if read_len > 0 {
        (placed_len / read_len as f64).min(1.0)
    } else {
        0.0
    };

    let (bgn, end) = if is_reverse { (max, min) } else { (min, max) };

    Some(OverlapPlacement {
        rid,
        tig_id: tig.id(),
        bgn,
        end,
        erate,
        f_coverage,
    })
}

/// Project the overlap's `b` read into tig-frame coordinates given the
/// already-placed `a` read's span and orientation.
fn project(ov: &Overlap, a_min: i64, a_max: i64, a_is_reverse: bool) -> (i64, i64, bool) {
    let a_is_forward = !a_is_reverse;
    let min = ov.hang_to_min_coord(a_min, a_max, a_is_forward);
    let max = ov.hang_to_max_coord(a_min, a_max, a_is_forward);
    let is_reverse = a_is_reverse ^ ov.flipped;
    (min, max, is_reverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tig::{ReadPlacement, TigVector};

    fn ov(a: ReadId, b: ReadId, a_hang: i32, b_hang: i32, flipped: bool, erate: f64) -> Overlap {
        Overlap { a, b, a_hang, b_hang, flipped, erate, length: 100 }
    }

    #[test]
    fn test_place_forward_extends_tig() {
        let mut tv = TigVector::new();
        let t = tv.new_tig();
        tv.add_read(t, ReadPlacement::new(1, 0, 100, false, 0));

        let mut store = OverlapStore::new();
        store.add(ov(1, 2, 80, 20, false, 0.02));

        let tig = tv.get(t).unwrap();
        let placement = place_read(2, 100, tig, &store, 0.05, false).unwrap();

        assert!(!placement.is_reverse());
        assert_eq!(placement.min(), 80);
        assert_eq!(placement.max(), 120);
    }

    #[test]
    fn test_place_flipped_read_is_reverse() {
        let mut tv = TigVector::new();
        let t = tv.new_tig();
        tv.add_read(t, ReadPlacement::new(1, 0, 100, false, 0));

        let mut store = OverlapStore::new();
        store.add(ov(1, 2, 80, 20, true, 0.02));

        let tig = tv.get(t).unwrap();
        let placement = place_read(2, 100, tig, &store, 0.05, false).unwrap();

        assert!(placement.is_reverse());
    }

    #[test]
    fn test_no_overlap_returns_none() {
        let mut tv = TigVector::new();
        let t = tv.new_tig();
        tv.add_read(t, ReadPlacement::new(1, 0, 100, false, 0));

        let store = OverlapStore::new();
        let tig = tv.get(t).unwrap();

        assert!(place_read(2, 100, tig, &store, 0.05, false).is_none());
    }

    #[test]
    fn test_erate_above_threshold_rejected() {
        let mut tv = TigVector::new();
        let t = tv.new_tig();
        tv.add_read(t, ReadPlacement::new(1, 0, 100, false, 0));

        let mut store = OverlapStore::new();
        store.add(ov(1, 2, 80, 20, false, 0.20));

        let tig = tv.get(t).unwrap();
        assert!(place_read(2, 100, tig, &store, 0.05, false).is_none());
    }

    #[test]
    fn test_no_extend_rejects_out_of_bounds() {
        let mut tv = TigVector::new();
        let t = tv.new_tig();
        tv.add_read(t, ReadPlacement::new(1, 0, 100, false, 0));

        let mut store = OverlapStore::new();
        // bHang extends 50bp past the tig's current end (100).
        store.add(ov(1, 2, 80, 50, false, 0.02));

        let tig = tv.get(t).unwrap();
        assert!(place_read(2, 100, tig, &store, 0.05, true).is_none());
        assert!(place_read(2, 100, tig, &store, 0.05, false).is_some());
    }

    #[test]
    fn test_lowest_erate_wins_among_multiple_anchors() {
        let mut tv = TigVector::new();
        let t = tv.new_tig();
        tv.add_read(t, ReadPlacement::new(1, 0, 100, false, 0));
        tv.add_read(t, ReadPlacement::new(3, 90, 190, false, 1));

        let mut store = OverlapStore::new();
        store.add(ov(1, 2, 80, 20, false, 0.10));
        store.add(ov(3, 2, 80, 20, false, 0.01));

        let tig = tv.get(t).unwrap();
        let placement = place_read(2, 100, tig, &store, 0.20, false).unwrap();

        assert_eq!(placement.erate, 0.01);
    }
}
