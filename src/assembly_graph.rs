//! Assembly Graph (C4): per-read forward list of [`BestPlacement`] records
//! consulted by the Dead-End Trimmer (spec.md §3, §4.1).

use rustc_hash::FxHashMap;
use std::io::BufRead;

use crate::error::{CoreError, Result};
use crate::read::ReadId;

/// `{ best5, best3, bestC }`: any field `0` means "none". `best_c != 0`
/// denotes "this read is contained in `best_c`".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestPlacement {
    pub best5: ReadId,
    pub best3: ReadId,
    pub best_c: ReadId,
}

impl BestPlacement {
    pub fn new(best5: ReadId, best3: ReadId, best_c: ReadId) -> Self {
        Self { best5, best3, best_c }
    }
}

/// For each read, the set of forward-directed [`BestPlacement`] records used
/// by the Dead-End Trimmer. Multiple entries per read are allowed (spec.md
/// §3: "BestPlacement (per-read, forward list, multiple entries allowed)").
#[derive(Debug, Clone, Default)]
pub struct AssemblyGraph {
    forward: FxHashMap<ReadId, Vec<BestPlacement>>,
}

impl AssemblyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_forward(&mut self, rid: ReadId, placement: BestPlacement) {
        self.forward.entry(rid).or_default().push(placement);
    }

    pub fn set_forward(&mut self, rid: ReadId, placements: Vec<BestPlacement>) {
        self.forward.insert(rid, placements);
    }

    /// `AG->getForward(rid)` — empty slice if `rid` has no entries.
    #[inline]
    pub fn get_forward(&self, rid: ReadId) -> &[BestPlacement] {
        self.forward.get(&rid).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Parse the whitespace-separated assembly-graph file format (spec.md
    /// §6): `rid best5rid best3rid bestCrid` per line, `0` meaning "none".
    /// A read may appear on more than one line — each line appends another
    /// [`BestPlacement`] to that read's forward list (spec.md §3: "multiple
    /// entries allowed").
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let mut graph = Self::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 4 {
                return Err(CoreError::AssemblyGraphParse {
                    line: lineno + 1,
                    message: format!("expected 4 fields, got {}", fields.len()),
                });
            }

            let parse = |field: &str| -> Result<ReadId> {
                field.parse().map_err(|_| CoreError::AssemblyGraphParse {
                    line: lineno + 1,
                    message: format!("invalid read id '{}'", field),
                })
            };

            let rid = parse(fields[0])?;
            let best5 = parse(fields[1])?;
            let best3 = parse(fields[2])?;
            let best_c = parse(fields[3])?;

            graph.push_forward(rid, BestPlacement::new(best5, best3, best_c));
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_read_has_no_placements() {
        let ag = AssemblyGraph::new();
        assert!(ag.get_forward(5).is_empty());
    }

    #[test]
    fn test_push_and_get() {
        let mut ag = AssemblyGraph::new();
        ag.push_forward(1, BestPlacement::new(2, 0, 0));
        ag.push_forward(1, BestPlacement::new(0, 3, 0));

        assert_eq!(ag.get_forward(1).len(), 2);
        assert_eq!(ag.get_forward(1)[0].best5, 2);
        assert_eq!(ag.get_forward(1)[1].best3, 3);
    }

    #[test]
    fn test_contained_marker() {
        let placement = BestPlacement::new(0, 0, 9);
        assert_eq!(placement.best_c, 9);
    }

    #[test]
    fn test_load_from_text() {
        let text = "1 2 0 0\n2 0 3 0\n# comment\n\n1 0 0 5\n";
        let graph = AssemblyGraph::load(text.as_bytes()).unwrap();

        assert_eq!(graph.get_forward(1).len(), 2);
        assert_eq!(graph.get_forward(1)[0].best5, 2);
        assert_eq!(graph.get_forward(1)[1].best_c, 5);
        assert_eq!(graph.get_forward(2)[0].best3, 3);
    }

    #[test]
    fn test_load_malformed_line_errors() {
        let text = "1 2 0\n";
        assert!(AssemblyGraph::load(text.as_bytes()).is_err());
    }
}
