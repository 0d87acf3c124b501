use std::ops::Range;

use clap::ValueEnum;
use similar::{capture_diff_slices, Algorithm, DiffTag};

/// Classification of one run of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// A run over contiguous line ranges. `before` is empty for inserts, `after` for deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOp {
    pub tag: OpTag,
    pub before: Range<usize>,
    pub after: Range<usize>,
}

impl DiffOp {
    pub fn new(tag: OpTag, before: Range<usize>, after: Range<usize>) -> Self {
        DiffOp { tag, before, after }
    }
}

/// Produces diff operations over two ordered line sequences.
pub trait LineDiffer {
    fn diff(&self, before: &[String], after: &[String]) -> Vec<DiffOp>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DiffAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<DiffAlgorithm> for Algorithm {
    fn from(alg: DiffAlgorithm) -> Self {
        match alg {
            DiffAlgorithm::Myers => Algorithm::Myers,
            DiffAlgorithm::Patience => Algorithm::Patience,
            DiffAlgorithm::Lcs => Algorithm::Lcs,
        }
    }
}

/// [`LineDiffer`] backed by the `similar` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarDiffer {
    pub algorithm: DiffAlgorithm,
}

impl SimilarDiffer {
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        SimilarDiffer { algorithm }
    }
}

impl LineDiffer for SimilarDiffer {
    fn diff(&self, before: &[String], after: &[String]) -> Vec<DiffOp> {
        capture_diff_slices(self.algorithm.into(), before, after)
            .iter()
            .map(|op| {
                let (tag, old, new) = op.as_tag_tuple();
                let tag = match tag {
                    DiffTag::Equal => OpTag::Equal,
                    DiffTag::Delete => OpTag::Delete,
                    DiffTag::Insert => OpTag::Insert,
                    DiffTag::Replace => OpTag::Replace,
                };
                DiffOp::new(tag, old, new)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn covered(ops: &[DiffOp]) -> (usize, usize) {
        ops.iter()
            .fold((0, 0), |(b, a), op| (b + op.before.len(), a + op.after.len()))
    }

    #[test]
    fn identical_inputs_are_one_equal_run() {
        let a = lines(&["h", "1", "2"]);
        let ops = SimilarDiffer::default().diff(&a, &a);
        assert_eq!(ops, vec![DiffOp::new(OpTag::Equal, 0..3, 0..3)]);
    }

    #[test]
    fn changed_line_becomes_replace() {
        let a = lines(&["h", "1,Alice", "2,Bob"]);
        let b = lines(&["h", "1,Alice", "2,Bobby"]);
        let ops = SimilarDiffer::default().diff(&a, &b);
        assert_eq!(
            ops,
            vec![
                DiffOp::new(OpTag::Equal, 0..2, 0..2),
                DiffOp::new(OpTag::Replace, 2..3, 2..3),
            ]
        );
    }

    #[test]
    fn trailing_line_becomes_insert() {
        let a = lines(&["h", "1"]);
        let b = lines(&["h", "1", "2"]);
        let ops = SimilarDiffer::default().diff(&a, &b);
        assert_eq!(ops.last().unwrap(), &DiffOp::new(OpTag::Insert, 2..2, 2..3));
    }

    #[test]
    fn every_algorithm_partitions_both_inputs() {
        let a = lines(&["h", "a", "b", "c", "d", "e", "c"]);
        let b = lines(&["h", "x", "b", "c", "y", "e", "z", "a"]);
        for alg in [DiffAlgorithm::Myers, DiffAlgorithm::Patience, DiffAlgorithm::Lcs] {
            let ops = SimilarDiffer::new(alg).diff(&a, &b);
            assert_eq!(covered(&ops), (a.len(), b.len()), "{alg:?}");
        }
    }

    #[test]
    fn empty_before_is_a_single_insert() {
        let b = lines(&["h", "1"]);
        let ops = SimilarDiffer::default().diff(&[], &b);
        assert_eq!(ops, vec![DiffOp::new(OpTag::Insert, 0..0, 0..2)]);
    }
}
