//! Best-Edge Graph (C3) and the best-edges-file external interface (§6).

use rustc_hash::FxHashMap;
use std::io::BufRead;

use crate::error::{CoreError, Result};
use crate::read::ReadId;

/// Per-read diagnostic flags loaded from the best-edges file's 5-character
/// `CIGLS` status word (spec.md §6, glossary).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStatus {
    pub contained: bool,
    pub ignored: bool,
    pub cov_gap: bool,
    pub lopsided: bool,
    pub spur: bool,
}

impl ReadStatus {
    fn parse(word: &str) -> Self {
        let chars: Vec<char> = word.chars().collect();
        let flag = |i: usize, letter: char| chars.get(i).copied() == Some(letter);
        Self {
            contained: flag(0, 'C'),
            ignored: flag(1, 'I'),
            cov_gap: flag(2, 'G'),
            lopsided: flag(3, 'L'),
            spur: flag(4, 'S'),
        }
    }
}

/// A read's best-5'/best-3' edge, mutual-best marker, and status.
#[derive(Debug, Clone, Default)]
struct BestEdgeRecord {
    status: ReadStatus,
    mutual_best: bool,
    best5: ReadId,
    best3: ReadId,
}

/// C3: per-read best 5'/3' overlap choices and diagnostic status bits,
/// plus the monotonic bubble/orphan marks the orphan resolver writes back.
#[derive(Debug, Clone, Default)]
pub struct BestEdgeGraph {
    records: FxHashMap<ReadId, BestEdgeRecord>,
    bubble: FxHashMap<ReadId, bool>,
    orphan: FxHashMap<ReadId, bool>,
}

impl BestEdgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_edges(&mut self, rid: ReadId, status: ReadStatus, mutual_best: bool, best5: ReadId, best3: ReadId) {
        self.records.insert(
            rid,
            BestEdgeRecord {
                status,
                mutual_best,
                best5,
                best3,
            },
        );
    }

    #[inline]
    pub fn is_contained(&self, rid: ReadId) -> bool {
        self.records.get(&rid).map(|r| r.status.contained).unwrap_or(false)
    }

    pub fn status(&self, rid: ReadId) -> ReadStatus {
        self.records.get(&rid).map(|r| r.status).unwrap_or_default()
    }

    pub fn is_mutual_best(&self, rid: ReadId) -> bool {
        self.records.get(&rid).map(|r| r.mutual_best).unwrap_or(false)
    }

    /// `bestEdgeExists(rid, threePrime)` (spec.md §4.4).
    #[inline]
    pub fn best_edge_exists(&self, rid: ReadId, three_prime: bool) -> bool {
        match self.records.get(&rid) {
            Some(r) if three_prime => r.best3 != 0,
            Some(r) => r.best5 != 0,
            None => false,
        }
    }

    pub fn best5(&self, rid: ReadId) -> ReadId {
        self.records.get(&rid).map(|r| r.best5).unwrap_or(0)
    }

    pub fn best3(&self, rid: ReadId) -> ReadId {
        self.records.get(&rid).map(|r| r.best3).unwrap_or(0)
    }

    /// Mark `rid` as part of a bubble. Idempotent and monotone: once set,
    /// never cleared (spec.md §5, §8).
    pub fn set_bubble(&mut self, rid: ReadId) {
        self.bubble.insert(rid, true);
    }

    pub fn is_bubble(&self, rid: ReadId) -> bool {
        self.bubble.get(&rid).copied().unwrap_or(false)
    }

    /// Mark `rid` as having been merged as an orphan. Idempotent and
    /// monotone.
    pub fn set_orphan(&mut self, rid: ReadId) {
        self.orphan.insert(rid, true);
    }

    pub fn is_orphan(&self, rid: ReadId) -> bool {
        self.orphan.get(&rid).copied().unwrap_or(false)
    }

    /// Parse the whitespace-separated best-edges file format (spec.md §6).
    ///
    /// Each line: `rid len status [M|-] best5rid best5flags best3rid
    /// best3flags`. The mutual-best marker is optional; when the token
    /// immediately following `status` is not `M` or `-`, it is treated as
    /// `best5rid` directly and every subsequent field shifts one column
    /// left relative to the marker-present layout.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let mut graph = Self::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return Err(CoreError::BestEdgesParse {
                    line: lineno + 1,
                    message: format!("expected at least 6 fields, got {}", fields.len()),
                });
            }

            let rid: ReadId = fields[0].parse().map_err(|_| CoreError::BestEdgesParse {
                line: lineno + 1,
                message: format!("invalid rid '{}'", fields[0]),
            })?;
            let status = ReadStatus::parse(fields[2]);

            let (mutual_best, best5, best3) = if fields[3] == "M" || fields[3] == "-" {
                if fields.len() < 8 {
                    return Err(CoreError::BestEdgesParse {
                        line: lineno + 1,
                        message: "marker present but not enough fields for best5/best3".into(),
                    });
                }
                let best5 = parse_rid(fields[4], lineno)?;
                let best3 = parse_rid(fields[6], lineno)?;
                (fields[3] == "M", best5, best3)
            } else {
                if fields.len() < 7 {
                    return Err(CoreError::BestEdgesParse {
                        line: lineno + 1,
                        message: "not enough fields for shifted best5/best3 layout".into(),
                    });
                }
                let best5 = parse_rid(fields[3], lineno)?;
                let best3 = parse_rid(fields[5], lineno)?;
                (false, best5, best3)
            };

            graph.set_edges(rid, status, mutual_best, best5, best3);
        }

        Ok(graph)
    }
}

fn parse_rid(field: &str, lineno: usize) -> Result<ReadId> {
    field.parse().map_err(|_| CoreError::BestEdgesParse {
        line: lineno + 1,
        message: format!("invalid read id '{}'", field),
    })
}
