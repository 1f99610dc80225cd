//! Position correspondence between predictions whose chains differ in length.
//!
//! For every chain shared by all structures, each structure gets an index
//! array over the alignment columns of that chain: `Some(i)` points at the
//! structure's own token `i`, `None` marks a column the structure lacks.
//! Each structure is aligned pairwise against the longest rendering of the
//! chain; insertions relative to that reference are merged into one shared
//! column set, so all arrays for a chain have the same length. Arrays are
//! produced chain by chain and then regrouped into one array per structure
//! spanning all chains.

use crate::core::align::{AlignedPair, Alignment, AlignmentScoring, global_align};
use crate::core::io::traits::StructureFile;
use crate::core::models::chain::{ChainLengthMap, CountOptions};
use crate::core::models::scores::ShapeError;
use tracing::{debug, instrument, warn};

pub type GapIndices = Vec<Option<usize>>;

/// Chain identifiers present in every length map, in the order of the first.
pub fn shared_chains(lengths: &[ChainLengthMap]) -> Vec<String> {
    let Some((first, rest)) = lengths.split_first() else {
        return Vec::new();
    };
    first
        .keys()
        .filter(|id| rest.iter().all(|other| other.contains(id)))
        .map(str::to_string)
        .collect()
}

/// Computes per-structure gap index arrays across all shared chains.
///
/// Returns an empty list for fewer than two structures.
#[instrument(skip_all, name = "gap_detection", fields(structures = structures.len()))]
pub fn detect_gaps<S: StructureFile>(
    structures: &[S],
    scoring: &AlignmentScoring,
) -> Result<Vec<GapIndices>, ShapeError> {
    if structures.len() <= 1 {
        return Ok(Vec::new());
    }

    let lengths: Vec<ChainLengthMap> = structures
        .iter()
        .map(|s| s.chain_lengths(CountOptions::tokens()))
        .collect();
    let chains = shared_chains(&lengths);
    if chains.len() < lengths[0].len() {
        warn!(
            skipped = lengths[0].len() - chains.len(),
            "Chains missing from some predictions are left out of gap detection."
        );
    }

    let mut per_chain = Vec::with_capacity(chains.len() * structures.len());
    for chain_id in &chains {
        let counts: Vec<usize> = lengths
            .iter()
            .map(|l| l.get(chain_id).unwrap_or(0))
            .collect();

        if counts.iter().all(|&c| c == counts[0]) {
            per_chain.extend(counts.iter().map(|&c| (0..c).map(Some).collect::<GapIndices>()));
            continue;
        }

        let elements: Vec<Vec<char>> = structures
            .iter()
            .map(|s| {
                s.chain_elements(chain_id)
                    .unwrap_or_default()
                    .chars()
                    .collect()
            })
            .collect();
        let Some(reference) = elements
            .iter()
            .reduce(|best, e| if e.len() > best.len() { e } else { best })
        else {
            continue;
        };

        debug!(
            chain = %chain_id,
            lengths = ?counts,
            reference_len = reference.len(),
            "Aligning chain of unequal length across predictions."
        );
        let alignments: Vec<Alignment> = elements
            .iter()
            .map(|query| global_align(reference, query, scoring))
            .collect();
        per_chain.extend(merge_columns(&alignments, reference.len()));
    }

    interleave(per_chain, structures.len(), chains.len())
}

/// Query tokens of one pairwise alignment, laid out along the reference.
struct Track {
    /// Query tokens placed before reference column `r`; slot `len` trails the last column.
    inserted: Vec<Vec<usize>>,
    matched: Vec<Option<usize>>,
}

impl Track {
    fn new(alignment: &Alignment, reference_len: usize) -> Self {
        let mut inserted = vec![Vec::new(); reference_len + 1];
        let mut matched = vec![None; reference_len];
        let mut slot = 0;
        for pair in &alignment.pairs {
            match *pair {
                AlignedPair::Match { reference, query } => {
                    matched[reference] = Some(query);
                    slot = reference + 1;
                }
                AlignedPair::GapQuery { reference } => slot = reference + 1,
                AlignedPair::GapReference { query } => inserted[slot].push(query),
            }
        }
        Self { inserted, matched }
    }
}

/// Lays every alignment's query track onto one column set: the reference
/// columns plus, in each slot between them, as many insertion columns as the
/// widest insertion any query makes there.
fn merge_columns(alignments: &[Alignment], reference_len: usize) -> Vec<GapIndices> {
    let tracks: Vec<Track> = alignments
        .iter()
        .map(|a| Track::new(a, reference_len))
        .collect();
    let widths: Vec<usize> = (0..=reference_len)
        .map(|slot| tracks.iter().map(|t| t.inserted[slot].len()).max().unwrap_or(0))
        .collect();

    tracks
        .iter()
        .map(|track| {
            let mut columns = GapIndices::new();
            for (slot, &width) in widths.iter().enumerate() {
                let inserted = &track.inserted[slot];
                columns.extend(inserted.iter().copied().map(Some));
                columns.extend(std::iter::repeat_n(None, width - inserted.len()));
                if let Some(&matched) = track.matched.get(slot) {
                    columns.push(matched);
                }
            }
            columns
        })
        .collect()
}

/// Regroups chain-major arrays (all structures for chain 0, then chain 1, ...)
/// into one array per structure, chains concatenated in order.
pub fn interleave(
    per_chain: Vec<GapIndices>,
    file_count: usize,
    chain_count: usize,
) -> Result<Vec<GapIndices>, ShapeError> {
    ShapeError::check(
        "chain-major gap arrays",
        file_count * chain_count,
        per_chain.len(),
    )?;
    let mut per_file: Vec<GapIndices> = vec![Vec::new(); file_count];
    for (index, array) in per_chain.into_iter().enumerate() {
        per_file[index % file_count].extend(array);
    }
    Ok(per_file)
}

/// Spreads `values` over the non-gap positions of `indices`, leaving `None` at gaps.
pub fn fill_with_gaps<T: Clone>(indices: &[Option<usize>], values: &[T]) -> Result<Vec<Option<T>>, ShapeError> {
    let present = indices.iter().filter(|i| i.is_some()).count();
    ShapeError::check("gap-filled values", present, values.len())?;
    let mut values = values.iter();
    Ok(indices
        .iter()
        .map(|index| index.and_then(|_| values.next().cloned()))
        .collect())
}
