//! Tig Model (C5): tentative contigs as ordered sets of read placements.
//!
//! Mirrors the shape of `tgTig`/`tgPosition` (tombstoned storage, anchor-aware
//! placement ordering, classification flags) generalized down to the reads-only
//! case the Dead-End Trimmer and Orphan Resolver operate on.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::read::ReadId;

pub type TigId = u32;

/// `_suggestRepeat`/`_suggestCircular`/`_suggestBubble` plus the 2-bit
/// `_class` field from the on-disk tig record (tgTig.H). Neither C7 nor C8
/// mutate `class` itself; they only ever set `suggest_bubble` (spec.md §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TigClass {
    Unassembled,
    Bubble,
    Contig,
}

impl Default for TigClass {
    fn default() -> Self {
        TigClass::Contig
    }
}

/// One read's placement within a tig, in tig-frame coordinates.
///
/// `anchor` is the read id that was already in the tig when this placement
/// was added (`0` for a tig's first read) — it breaks ties in [`Tig::sort`]
/// between two placements that begin at the same coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPlacement {
    pub rid: ReadId,
    pub min: i64,
    pub max: i64,
    pub is_reverse: bool,
    pub anchor: ReadId,
}

impl ReadPlacement {
    pub fn new(rid: ReadId, min: i64, max: i64, is_reverse: bool, anchor: ReadId) -> Self {
        Self { rid, min, max, is_reverse, anchor }
    }
}

impl PartialOrd for ReadPlacement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadPlacement {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.min.cmp(&other.min) {
            Ordering::Equal => {
                if self.anchor == other.rid {
                    // `other` placed `self`; `other` must sort first.
                    Ordering::Greater
                } else if other.anchor == self.rid {
                    Ordering::Less
                } else {
                    self.max.cmp(&other.max).then(self.rid.cmp(&other.rid))
                }
            }
            ord => ord,
        }
    }
}

/// A tentative contig: an ordered path of read placements.
#[derive(Debug, Clone, Default)]
pub struct Tig {
    id: TigId,
    placements: Vec<ReadPlacement>,
    pub class: TigClass,
    pub suggest_repeat: bool,
    pub suggest_circular: bool,
    pub suggest_bubble: bool,
}

impl Tig {
    fn new(id: TigId) -> Self {
        Self {
            id,
            placements: Vec::new(),
            class: TigClass::default(),
            suggest_repeat: false,
            suggest_circular: false,
            suggest_bubble: false,
        }
    }

    pub fn id(&self) -> TigId {
        self.id
    }

    pub fn num_reads(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn placements(&self) -> &[ReadPlacement] {
        &self.placements
    }

    pub fn first_read(&self) -> Option<&ReadPlacement> {
        self.placements.first()
    }

    pub fn last_read(&self) -> Option<&ReadPlacement> {
        self.placements.last()
    }

    /// Total span of this tig, assuming placements are normalized
    /// (`first.min == 0` after [`Tig::sort`]).
    pub fn length(&self) -> i64 {
        self.placements.iter().map(|p| p.max).max().unwrap_or(0)
    }

    fn add(&mut self, placement: ReadPlacement) {
        self.placements.push(placement);
    }

    /// Sort placements into anchor-aware coordinate order, then normalize so
    /// the leftmost placement's `min` becomes `0` (spec.md §8: "the new
    /// tig's first placement's min coordinate becomes 0").
    pub fn sort(&mut self) {
        self.placements.sort();
        if let Some(shift) = self.placements.first().map(|p| p.min) {
            if shift != 0 {
                for p in &mut self.placements {
                    p.min -= shift;
                    p.max -= shift;
                }
            }
        }
    }

    /// Flip every placement end-for-end within this tig's current span, and
    /// flip each placement's orientation. Does not touch `anchor` (still the
    /// same read id). Re-sorting afterwards is a no-op: the result is already
    /// normalized because the tig's total length maps `0 -> length`.
    pub fn reverse_complement(&mut self) {
        let len = self.length();
        for p in &mut self.placements {
            let (new_min, new_max) = (len - p.max, len - p.min);
            p.min = new_min;
            p.max = new_max;
            p.is_reverse = !p.is_reverse;
        }
        self.placements.sort();
    }
}

/// Tombstoned storage for tigs: ids are never reused, and `in_unitig(rid)`
/// gives the inverse index from read to owning tig (spec.md §3).
#[derive(Debug, Clone, Default)]
pub struct TigVector {
    // Index 0 is an unused sentinel.
    tigs: Vec<Option<Tig>>,
    in_unitig: FxHashMap<ReadId, TigId>,
}

impl TigVector {
    pub fn new() -> Self {
        Self {
            tigs: vec![None],
            in_unitig: FxHashMap::default(),
        }
    }

    /// Allocate a new, empty tig and return its id.
    pub fn new_tig(&mut self) -> TigId {
        let id = self.tigs.len() as TigId;
        self.tigs.push(Some(Tig::new(id)));
        id
    }

    pub fn get(&self, tig_id: TigId) -> Option<&Tig> {
        self.tigs.get(tig_id as usize).and_then(|t| t.as_ref())
    }

    pub fn get_mut(&mut self, tig_id: TigId) -> Option<&mut Tig> {
        self.tigs.get_mut(tig_id as usize).and_then(|t| t.as_mut())
    }

    /// Append a read placement to `tig_id` and update the inverse index.
    pub fn add_read(&mut self, tig_id: TigId, placement: ReadPlacement) {
        let rid = placement.rid;
        if let Some(tig) = self.get_mut(tig_id) {
            tig.add(placement);
            self.in_unitig.insert(rid, tig_id);
        }
    }

    /// `inUnitig(rid) -> tig-id | 0` (spec.md §3).
    #[inline]
    pub fn in_unitig(&self, rid: ReadId) -> TigId {
        self.in_unitig.get(&rid).copied().unwrap_or(0)
    }

    /// Tombstone `tig_id`: its slot becomes `None` forever, and every read it
    /// held is removed from the inverse index.
    pub fn delete(&mut self, tig_id: TigId) {
        if let Some(Some(tig)) = self.tigs.get(tig_id as usize) {
            for p in tig.placements() {
                if self.in_unitig.get(&p.rid).copied() == Some(tig_id) {
                    self.in_unitig.remove(&p.rid);
                }
            }
        }
        if let Some(slot) = self.tigs.get_mut(tig_id as usize) {
            *slot = None;
        }
    }

    /// Ascending order, skipping tombstoned slots — the fixed traversal
    /// order both C7 and C8 rely on.
    pub fn iter_ids(&self) -> impl Iterator<Item = TigId> + '_ {
        (1..self.tigs.len() as TigId).filter(move |&id| self.get(id).is_some())
    }

    pub fn num_tigs(&self) -> usize {
        self.iter_ids().count()
    }

    /// Total reads held across all live tigs (for the conservation
    /// invariant, spec.md §8).
    pub fn total_reads(&self) -> usize {
        self.iter_ids().map(|id| self.get(id).unwrap().num_reads()).sum()
    }

    pub fn sort(&mut self, tig_id: TigId) {
        if let Some(tig) = self.get_mut(tig_id) {
            tig.sort();
        }
    }

    pub fn reverse_complement(&mut self, tig_id: TigId) {
        if let Some(tig) = self.get_mut(tig_id) {
            tig.reverse_complement();
        }
    }
}
