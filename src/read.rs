//! Read Registry (C1): immutable read identities, lengths, and containment.
//!
//! Read `0` is reserved as "none" (spec.md §3); valid reads occupy
//! `1..=num_reads`.

/// Opaque read identifier. `0` means "none".
pub type ReadId = u32;

/// Per-read immutable facts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadInfo {
    pub len: u32,
    pub contained: bool,
}

/// Immutable table of read identities, lengths, and containment flags.
#[derive(Debug, Clone, Default)]
pub struct ReadRegistry {
    // Index 0 is an unused sentinel so `ReadId` can index directly.
    reads: Vec<ReadInfo>,
}

impl ReadRegistry {
    /// Build a registry for `num_reads` reads, all initially zero-length and
    /// not contained.
    pub fn new(num_reads: usize) -> Self {
        Self {
            reads: vec![ReadInfo { len: 0, contained: false }; num_reads + 1],
        }
    }

    /// Build a registry from a 1-indexed list of `(len, contained)` pairs.
    pub fn from_reads(reads: impl IntoIterator<Item = (u32, bool)>) -> Self {
        let mut table = vec![ReadInfo { len: 0, contained: false }];
        table.extend(
            reads
                .into_iter()
                .map(|(len, contained)| ReadInfo { len, contained }),
        );
        Self { reads: table }
    }

    pub fn set(&mut self, rid: ReadId, len: u32, contained: bool) {
        let idx = rid as usize;
        if idx >= self.reads.len() {
            self.reads.resize(idx + 1, ReadInfo { len: 0, contained: false });
        }
        self.reads[idx] = ReadInfo { len, contained };
    }

    #[inline]
    pub fn len(&self, rid: ReadId) -> u32 {
        self.reads.get(rid as usize).map(|r| r.len).unwrap_or(0)
    }

    #[inline]
    pub fn is_contained(&self, rid: ReadId) -> bool {
        self.reads.get(rid as usize).map(|r| r.contained).unwrap_or(false)
    }

    /// Number of reads, excluding the reserved sentinel at index 0.
    pub fn num_reads(&self) -> usize {
        self.reads.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.num_reads() == 0
    }

    /// Iterate all valid read ids, `1..=num_reads`.
    pub fn ids(&self) -> impl Iterator<Item = ReadId> {
        1..=(self.num_reads() as ReadId)
    }
}
