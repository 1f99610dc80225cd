//! Needleman-Wunsch global alignment with a linear gap cost.
//!
//! Used to locate insertions and deletions between two renderings of the same
//! chain. Scores are integers so ties are exact; on a tie the traceback
//! prefers a diagonal step, then a gap in the query, then a gap in the
//! reference.

use serde::Deserialize;

/// Cost model for global alignment.
///
/// The default is match +1, mismatch 0, gap 0: the alignment maximizes the
/// number of identical positions and places gaps only through tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct AlignmentScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            match_score: 1,
            mismatch_score: 0,
            gap_score: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignedPair {
    Match { reference: usize, query: usize },
    /// Reference position with no counterpart in the query.
    GapQuery { reference: usize },
    /// Query position with no counterpart in the reference.
    GapReference { query: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub pairs: Vec<AlignedPair>,
    pub score: i32,
}

impl Alignment {
    /// Per alignment column, the query index or `None` where the query has a gap.
    pub fn query_indices(&self) -> Vec<Option<usize>> {
        self.pairs
            .iter()
            .map(|pair| match *pair {
                AlignedPair::Match { query, .. } | AlignedPair::GapReference { query } => {
                    Some(query)
                }
                AlignedPair::GapQuery { .. } => None,
            })
            .collect()
    }

    /// Per alignment column, the reference index or `None` where the reference has a gap.
    pub fn reference_indices(&self) -> Vec<Option<usize>> {
        self.pairs
            .iter()
            .map(|pair| match *pair {
                AlignedPair::Match { reference, .. } | AlignedPair::GapQuery { reference } => {
                    Some(reference)
                }
                AlignedPair::GapReference { .. } => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trace {
    Diag,
    Up,
    Left,
}

pub fn global_align(reference: &[char], query: &[char], scoring: &AlignmentScoring) -> Alignment {
    let m = reference.len();
    let n = query.len();
    let cols = n + 1;
    let idx = |i: usize, j: usize| -> usize { i * cols + j };

    let mut dp = vec![0i32; (m + 1) * cols];
    let mut tb = vec![Trace::Diag; (m + 1) * cols];

    for i in 1..=m {
        dp[idx(i, 0)] = dp[idx(i - 1, 0)] + scoring.gap_score;
        tb[idx(i, 0)] = Trace::Up;
    }
    for j in 1..=n {
        dp[idx(0, j)] = dp[idx(0, j - 1)] + scoring.gap_score;
        tb[idx(0, j)] = Trace::Left;
    }

    for i in 1..=m {
        for j in 1..=n {
            let sub = if reference[i - 1] == query[j - 1] {
                scoring.match_score
            } else {
                scoring.mismatch_score
            };
            let diag = dp[idx(i - 1, j - 1)] + sub;
            let up = dp[idx(i - 1, j)] + scoring.gap_score;
            let left = dp[idx(i, j - 1)] + scoring.gap_score;

            let (best, trace) = if diag >= up && diag >= left {
                (diag, Trace::Diag)
            } else if up >= left {
                (up, Trace::Up)
            } else {
                (left, Trace::Left)
            };
            dp[idx(i, j)] = best;
            tb[idx(i, j)] = trace;
        }
    }

    let mut pairs = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        match tb[idx(i, j)] {
            Trace::Diag if i > 0 && j > 0 => {
                pairs.push(AlignedPair::Match {
                    reference: i - 1,
                    query: j - 1,
                });
                i -= 1;
                j -= 1;
            }
            Trace::Up if i > 0 => {
                pairs.push(AlignedPair::GapQuery { reference: i - 1 });
                i -= 1;
            }
            _ => {
                pairs.push(AlignedPair::GapReference { query: j - 1 });
                j -= 1;
            }
        }
    }
    pairs.reverse();

    Alignment {
        pairs,
        score: dp[idx(m, n)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn gap_count(indices: &[Option<usize>]) -> usize {
        indices.iter().filter(|i| i.is_none()).count()
    }

    #[test]
    fn identical_sequences_align_one_to_one() {
        let seq = chars("NCCONCCO");
        let alignment = global_align(&seq, &seq, &AlignmentScoring::default());
        assert_eq!(alignment.score, 8);
        let expected: Vec<Option<usize>> = (0..8).map(Some).collect();
        assert_eq!(alignment.query_indices(), expected);
    }

    #[test]
    fn shorter_query_gets_one_gap_per_missing_position() {
        let reference = chars("NCCONCCOS");
        let query = chars("NCCONCCO");
        let alignment = global_align(&reference, &query, &AlignmentScoring::default());
        let indices = alignment.query_indices();
        assert_eq!(indices.len(), 9);
        assert_eq!(gap_count(&indices), 1);
        assert_eq!(alignment.score, 8);
    }

    #[test]
    fn query_indices_are_increasing_without_repeats() {
        let reference = chars("NCCONCCOCCNCO");
        let query = chars("NCCOCCNCO");
        let alignment = global_align(&reference, &query, &AlignmentScoring::default());
        let present: Vec<usize> = alignment.query_indices().into_iter().flatten().collect();
        assert_eq!(present, (0..query.len()).collect::<Vec<_>>());
    }

    #[test]
    fn internal_deletion_is_placed_where_characters_differ() {
        let scoring = AlignmentScoring {
            match_score: 2,
            mismatch_score: -1,
            gap_score: -1,
        };
        let alignment = global_align(&chars("AACGTT"), &chars("AAGTT"), &scoring);
        assert_eq!(
            alignment.query_indices(),
            vec![Some(0), Some(1), None, Some(2), Some(3), Some(4)]
        );
    }

    #[test]
    fn empty_query_is_all_gaps() {
        let alignment = global_align(&chars("NCO"), &[], &AlignmentScoring::default());
        assert_eq!(alignment.query_indices(), vec![None, None, None]);
        assert_eq!(alignment.reference_indices(), vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn both_empty_yields_empty_alignment() {
        let alignment = global_align(&[], &[], &AlignmentScoring::default());
        assert!(alignment.pairs.is_empty());
        assert_eq!(alignment.score, 0);
    }

    #[test]
    fn alignment_is_deterministic() {
        let reference = chars("CCCCNNOO");
        let query = chars("CCNO");
        let a = global_align(&reference, &query, &AlignmentScoring::default());
        let b = global_align(&reference, &query, &AlignmentScoring::default());
        assert_eq!(a, b);
    }
}
