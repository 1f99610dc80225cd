use crate::core::models::chain::ChainLengthMap;
use crate::core::models::scores::ShapeError;
use nalgebra::DMatrix;
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// A position mapping from one flat token ordering to another.
///
/// `targets[i]` is the destination of source position `i`. Positions whose
/// label had no remaining slot in the desired ordering map to themselves and
/// are listed in `unmatched`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    targets: Vec<usize>,
    unmatched: Vec<usize>,
}

impl Permutation {
    pub fn identity(len: usize) -> Self {
        Self {
            targets: (0..len).collect(),
            unmatched: Vec::new(),
        }
    }

    /// Builds the mapping that moves each token of `current` to the next
    /// unconsumed slot with the same label in `desired`.
    pub fn between(current: &ChainLengthMap, desired: &ChainLengthMap) -> Self {
        let mut slots: HashMap<&str, VecDeque<usize>> = HashMap::new();
        for (position, label) in desired.flat_labels().into_iter().enumerate() {
            slots.entry(label).or_default().push_back(position);
        }

        let mut unmatched = Vec::new();
        let targets = current
            .flat_labels()
            .into_iter()
            .enumerate()
            .map(|(position, label)| {
                match slots.get_mut(label).and_then(VecDeque::pop_front) {
                    Some(target) => target,
                    None => {
                        unmatched.push(position);
                        position
                    }
                }
            })
            .collect();

        Self { targets, unmatched }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn unmatched(&self) -> &[usize] {
        &self.unmatched
    }

    pub fn is_identity(&self) -> bool {
        self.targets.iter().enumerate().all(|(i, &t)| i == t)
    }

    /// The reverse mapping, or `None` if two sources share a destination or
    /// a destination is out of range.
    pub fn inverse(&self) -> Option<Self> {
        let mut inverse = vec![usize::MAX; self.targets.len()];
        for (source, &target) in self.targets.iter().enumerate() {
            let slot = inverse.get_mut(target)?;
            if *slot != usize::MAX {
                return None;
            }
            *slot = source;
        }
        Some(Self {
            targets: inverse,
            unmatched: Vec::new(),
        })
    }

    /// Scatters `matrix` into a zero matrix of the same shape.
    ///
    /// Square matrices are permuted along both axes, other matrices along
    /// rows only. The row count must equal the permutation length.
    /// Destinations outside the matrix are dropped.
    pub fn apply(&self, matrix: &DMatrix<f64>) -> Result<DMatrix<f64>, ShapeError> {
        ShapeError::check("permuted matrix rows", self.len(), matrix.nrows())?;
        let (nrows, ncols) = matrix.shape();
        let mut out = DMatrix::zeros(nrows, ncols);
        let square = nrows == ncols;

        for (i, &ti) in self.targets.iter().enumerate() {
            if ti >= nrows {
                continue;
            }
            for j in 0..ncols {
                let tj = if square { self.targets[j] } else { j };
                if tj < ncols {
                    out[(ti, tj)] = matrix[(i, j)];
                }
            }
        }
        Ok(out)
    }
}

/// Reorders a score matrix from the `current` chain layout to the `desired` one.
pub fn reorder(
    matrix: &DMatrix<f64>,
    current: &ChainLengthMap,
    desired: &ChainLengthMap,
) -> Result<DMatrix<f64>, ShapeError> {
    let permutation = Permutation::between(current, desired);
    if !permutation.unmatched().is_empty() {
        warn!(
            unmatched = permutation.unmatched().len(),
            first = permutation.unmatched()[0],
            "Token labels without a slot in the canonical order were left in place."
        );
    }
    permutation.apply(matrix)
}
