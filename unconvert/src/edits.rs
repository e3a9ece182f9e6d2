//! Edit sets: the removals found in each file.

use crate::error::Result;
use crate::fix::Edit;
use crate::source::Span;
use serde::{Deserialize, Serialize, Serializer};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// The deletions that remove one redundant conversion.
///
/// Ordered by the offset of the conversion's opening parenthesis, which is
/// also where diagnostics point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Removal {
    /// Offset of the conversion's `(`.
    pub lparen: usize,
    /// One or two deleted ranges.
    pub edits: SmallVec<[Edit; 2]>,
}

impl Removal {
    /// Removal that deletes only the type, keeping the argument's
    /// parentheses. Anything between the argument and `)`, such as a
    /// trailing comma, goes too.
    #[must_use]
    pub fn keep_parens(call_start: usize, lparen: usize, arg_end: usize, rparen: usize) -> Self {
        let mut edits = SmallVec::new();
        edits.push(Edit::delete(call_start, lparen));
        if arg_end < rparen {
            edits.push(Edit::delete(arg_end, rparen));
        }
        Self { lparen, edits }
    }

    /// Removal that leaves only the argument: deletes the type with `(`,
    /// and everything from the end of the argument through `)`.
    #[must_use]
    pub fn strip_parens(call_start: usize, lparen: usize, arg: Span, rparen: usize) -> Self {
        let mut edits = SmallVec::new();
        edits.push(Edit::delete(call_start, arg.start));
        edits.push(Edit::delete(arg.end, rparen + 1));
        Self { lparen, edits }
    }
}

/// Removals keyed by file path.
///
/// A path reported with no removals stays as an empty entry so that it vetoes
/// every other report of the same path, earlier or later. Empty entries are
/// invisible to the accessors, to equality and to the JSON encoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditSet {
    #[serde(serialize_with = "serialize_non_empty")]
    files: BTreeMap<PathBuf, BTreeSet<Removal>>,
}

fn serialize_non_empty<S: Serializer>(
    files: &BTreeMap<PathBuf, BTreeSet<Removal>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(files.iter().filter(|(_, removals)| !removals.is_empty()))
}

impl PartialEq for EditSet {
    fn eq(&self, other: &Self) -> bool {
        self.files().eq(other.files())
    }
}

impl Eq for EditSet {}

impl EditSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the removals found in `path`.
    ///
    /// A path already present keeps only the removals common to both
    /// reports, whichever came first.
    pub fn insert_file(&mut self, path: PathBuf, removals: BTreeSet<Removal>) {
        use std::collections::btree_map::Entry;
        match self.files.entry(path) {
            Entry::Vacant(slot) => {
                slot.insert(removals);
            }
            Entry::Occupied(mut slot) => slot.get_mut().retain(|r| removals.contains(r)),
        }
    }

    /// Keeps only the removals present, for the same file, in both sets.
    #[must_use]
    pub fn intersection(mut self, other: &Self) -> Self {
        self.files.retain(|path, removals| {
            let Some(theirs) = other.files.get(path) else {
                return false;
            };
            removals.retain(|r| theirs.contains(r));
            !removals.is_empty()
        });
        self
    }

    /// Whether no file has removals.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.values().all(BTreeSet::is_empty)
    }

    /// Total number of removals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    /// Files with removals, in path order.
    pub fn files(&self) -> impl Iterator<Item = (&Path, &BTreeSet<Removal>)> {
        self.files
            .iter()
            .filter(|(_, r)| !r.is_empty())
            .map(|(p, r)| (p.as_path(), r))
    }

    /// Removals recorded for `path`.
    #[must_use]
    pub fn removals(&self, path: &Path) -> Option<&BTreeSet<Removal>> {
        self.files.get(path).filter(|r| !r.is_empty())
    }

    /// Every deleted range of `path`, unsorted.
    #[must_use]
    pub fn edits(&self, path: &Path) -> Vec<Edit> {
        self.files
            .get(path)
            .into_iter()
            .flatten()
            .flat_map(|r| r.edits.iter().copied())
            .collect()
    }

    /// Writes the JSON encoding.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads the JSON encoding.
    pub fn read_json<R: Read>(reader: R) -> Result<Self> {
        let mut set: Self = serde_json::from_reader(reader)?;
        set.files.retain(|_, removals| !removals.is_empty());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(entries: &[(&str, &[Removal])]) -> EditSet {
        let mut set = EditSet::new();
        for (path, removals) in entries {
            set.insert_file(PathBuf::from(path), removals.iter().cloned().collect());
        }
        set
    }

    #[test]
    fn test_intersection_keeps_common_removals() {
        let a = Removal::strip_parens(10, 15, Span::new(16, 17), 17);
        let b = Removal::strip_parens(30, 35, Span::new(36, 37), 37);
        let wide = Removal::keep_parens(30, 35, 40, 40);

        let left = set(&[("a.go", &[a.clone(), b.clone()]), ("b.go", &[a.clone()])]);
        let right = set(&[("a.go", &[a.clone(), wide]), ("c.go", &[b])]);

        let merged = left.intersection(&right);
        assert_eq!(merged, set(&[("a.go", &[a])]));
    }

    #[test]
    fn test_intersection_drops_emptied_files() {
        let left = set(&[("a.go", &[Removal::strip_parens(0, 5, Span::new(6, 7), 7)])]);
        let right = set(&[("a.go", &[Removal::strip_parens(20, 25, Span::new(26, 27), 27)])]);
        assert!(left.intersection(&right).is_empty());
    }

    #[test]
    fn test_duplicate_path_is_intersected() {
        let a = Removal::strip_parens(0, 5, Span::new(6, 7), 7);
        let b = Removal::strip_parens(20, 25, Span::new(26, 27), 27);
        let mut set = EditSet::new();
        set.insert_file("a.go".into(), [a.clone(), b].into_iter().collect());
        set.insert_file("a.go".into(), [a.clone()].into_iter().collect());
        assert_eq!(set.len(), 1);
        assert_eq!(set.edits(Path::new("a.go")), a.edits.to_vec());
    }

    #[test]
    fn test_empty_report_vetoes_in_either_order() {
        let a = Removal::strip_parens(0, 5, Span::new(6, 7), 7);
        let found: BTreeSet<_> = [a].into_iter().collect();

        let mut empty_first = EditSet::new();
        empty_first.insert_file("a.go".into(), BTreeSet::new());
        empty_first.insert_file("a.go".into(), found.clone());

        let mut empty_last = EditSet::new();
        empty_last.insert_file("a.go".into(), found);
        empty_last.insert_file("a.go".into(), BTreeSet::new());

        for set in [&empty_first, &empty_last] {
            assert!(set.is_empty());
            assert_eq!(set.len(), 0);
            assert_eq!(set.files().count(), 0);
            assert_eq!(set.removals(Path::new("a.go")), None);
        }
        assert_eq!(empty_first, EditSet::new());
        assert_eq!(
            serde_json::to_value(&empty_first).unwrap(),
            serde_json::json!({"files": {}})
        );
    }

    #[test]
    fn test_json_encoding() {
        let set = set(&[("pkg/a.go", &[Removal::keep_parens(3, 10, 15, 15)])]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "files": {
                    "pkg/a.go": [{"lparen": 10, "edits": [{"start": 3, "end": 10}]}]
                }
            })
        );

        let mut buf = Vec::new();
        set.write_json(&mut buf).unwrap();
        assert_eq!(EditSet::read_json(buf.as_slice()).unwrap(), set);
    }
}
