use super::error::EngineError;
use super::permutation::reorder;
use crate::core::io::traits::StructureFile;
use crate::core::models::chain::{ChainLengthMap, CountOptions};
use crate::core::models::scores::ScoreFile;
use itertools::Itertools;
use nalgebra::DMatrix;
use std::fmt;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    AlphaFold3,
    Boltz,
    Chai,
}

impl ToolKind {
    /// Tools whose score files label chains with single letters regardless of the input identifiers.
    pub fn uses_single_letter_ids(self) -> bool {
        matches!(self, ToolKind::AlphaFold3)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ToolKind::AlphaFold3 => "alphafold3",
            ToolKind::Boltz => "boltz",
            ToolKind::Chai => "chai",
        })
    }
}

/// Raw confidence output of one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolScores {
    /// A complete score file whose token order follows the tool's own chain order.
    AlphaFold3(ScoreFile),
    /// A bare PAE matrix already in the structure's chain order.
    Boltz { pae: DMatrix<f64> },
    Chai { pae: DMatrix<f64> },
}

impl ToolScores {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolScores::AlphaFold3(_) => ToolKind::AlphaFold3,
            ToolScores::Boltz { .. } => ToolKind::Boltz,
            ToolScores::Chai { .. } => ToolKind::Chai,
        }
    }
}

/// Chains in first-appearance order of `labels`, each with its token count.
pub fn label_order(labels: &[String]) -> ChainLengthMap {
    let counts = labels.iter().counts();
    labels
        .iter()
        .unique()
        .map(|label| (label.as_str(), counts[label]))
        .collect()
}

/// Replaces labels missing from the canonical chain set by position.
///
/// A label at alphabet position `i` (`A` = 0) that the structure does not
/// know is replaced by the structure's `i`-th chain identifier, if there is
/// one. Returns the number of tokens relabelled.
pub fn substitute_labels(labels: &mut [String], canonical: &[String]) -> usize {
    let mut substituted = 0;
    for label in labels.iter_mut() {
        if canonical.contains(label) {
            continue;
        }
        let mut chars = label.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            continue;
        };
        if !c.is_ascii_uppercase() {
            continue;
        }
        if let Some(replacement) = canonical.get((c as u8 - b'A') as usize) {
            *label = replacement.clone();
            substituted += 1;
        }
    }
    substituted
}

/// Per-token and per-atom fields derived from the structure alone.
struct StructureAxes {
    atom_chain_ids: Vec<String>,
    atom_plddts: Vec<f64>,
    token_chain_ids: Vec<String>,
    token_res_ids: Vec<i64>,
}

fn structure_axes(structure: &impl StructureFile) -> StructureAxes {
    let atom_lengths = structure.chain_lengths(CountOptions::atoms());
    let residue_ids = structure.token_residue_ids();
    StructureAxes {
        atom_chain_ids: atom_lengths
            .flat_labels()
            .into_iter()
            .map(str::to_string)
            .collect(),
        atom_plddts: structure.plddts(),
        token_chain_ids: residue_ids
            .iter()
            .flat_map(|(chain, ids)| std::iter::repeat_n(chain.clone(), ids.len()))
            .collect(),
        token_res_ids: residue_ids.into_iter().flat_map(|(_, ids)| ids).collect(),
    }
}

fn rebuild(
    structure: &impl StructureFile,
    pae: DMatrix<f64>,
    contact_probs: DMatrix<f64>,
) -> Result<ScoreFile, EngineError> {
    let axes = structure_axes(structure);
    let scores = ScoreFile {
        atom_chain_ids: axes.atom_chain_ids,
        atom_plddts: axes.atom_plddts,
        contact_probs,
        pae,
        token_chain_ids: axes.token_chain_ids,
        token_res_ids: axes.token_res_ids,
    };
    scores.validate()?;
    Ok(scores)
}

/// Brings a tool's scores into the chain order of its own predicted structure.
///
/// # Errors
///
/// Returns [`EngineError::ShapeMismatch`] if the input scores are internally
/// inconsistent or their token axis does not match the structure.
#[instrument(skip_all, name = "score_harmonization", fields(tool = %scores.kind()))]
pub fn harmonize(
    scores: ToolScores,
    structure: &impl StructureFile,
) -> Result<ScoreFile, EngineError> {
    let kind = scores.kind();
    let mut raw = match scores {
        ToolScores::AlphaFold3(raw) => raw,
        ToolScores::Boltz { pae } | ToolScores::Chai { pae } => {
            let contact_probs = DMatrix::zeros(pae.nrows(), pae.ncols());
            debug!(tokens = pae.nrows(), "Synthesized zero contact probabilities.");
            return rebuild(structure, pae, contact_probs);
        }
    };
    raw.validate()?;

    let canonical = structure.chain_lengths(CountOptions::tokens());
    let canonical_ids: Vec<String> = canonical.keys().map(str::to_string).collect();

    let mut current = label_order(&raw.token_chain_ids);
    if kind.uses_single_letter_ids() && current.keys().any(|label| !canonical.contains(label)) {
        let substituted = substitute_labels(&mut raw.token_chain_ids, &canonical_ids);
        warn!(
            substituted,
            "Score labels absent from the structure were mapped onto its chains by position."
        );
        current = label_order(&raw.token_chain_ids);
    }

    if current.same_order_as(&canonical) {
        info!(tokens = raw.token_count(), "Scores already in canonical order.");
        return Ok(raw);
    }

    let pae = reorder(&raw.pae, &current, &canonical)?;
    let contact_probs = reorder(&raw.contact_probs, &current, &canonical)?;
    info!(
        tokens = raw.token_count(),
        chains = canonical.len(),
        "Reordered scores into canonical chain order."
    );
    rebuild(structure, pae, contact_probs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::layout::{AtomRecord, ChainKind, ChainRecord, ResidueRecord, StructureLayout};

    fn chain(id: &str, kind: ChainKind, residues: usize) -> ChainRecord {
        ChainRecord {
            id: id.into(),
            kind,
            residues: (0..residues)
                .map(|i| ResidueRecord {
                    number: i as i64 + 1,
                    name: "GLY".into(),
                    modified: false,
                    atoms: vec![AtomRecord {
                        name: "CA".into(),
                        element: "C".into(),
                        plddt: 50.0 + i as f64,
                    }],
                })
                .collect(),
        }
    }

    fn structure(chains: &[(&str, usize)]) -> StructureLayout {
        StructureLayout::new(
            chains
                .iter()
                .map(|&(id, len)| chain(id, ChainKind::Polymer, len))
                .collect(),
        )
    }

    fn af3_scores(labels: &[&str]) -> ScoreFile {
        let n = labels.len();
        ScoreFile {
            atom_chain_ids: labels.iter().map(|s| s.to_string()).collect(),
            atom_plddts: vec![80.0; n],
            contact_probs: DMatrix::from_fn(n, n, |i, j| (i * n + j) as f64 / 100.0),
            pae: DMatrix::from_fn(n, n, |i, j| (i * n + j) as f64),
            token_chain_ids: labels.iter().map(|s| s.to_string()).collect(),
            token_res_ids: (1..=n as i64).collect(),
        }
    }

    #[test]
    fn label_order_follows_first_appearance_with_counts() {
        let labels: Vec<String> = ["B", "B", "A", "C", "A"].iter().map(|s| s.to_string()).collect();
        let order = label_order(&labels);
        assert_eq!(order.iter().collect::<Vec<_>>(), [("B", 2), ("A", 2), ("C", 1)]);
    }

    #[test]
    fn substitution_maps_letters_onto_canonical_positions() {
        let mut labels: Vec<String> = ["A", "B", "L"].iter().map(|s| s.to_string()).collect();
        let canonical: Vec<String> = ["P1", "B", "LIG"].iter().map(|s| s.to_string()).collect();
        let count = substitute_labels(&mut labels, &canonical);
        assert_eq!(labels, ["P1", "B", "L"]);
        assert_eq!(count, 1);
    }

    #[test]
    fn scores_in_canonical_order_are_returned_unchanged() {
        let scores = af3_scores(&["A", "A", "B"]);
        let out = harmonize(
            ToolScores::AlphaFold3(scores.clone()),
            &structure(&[("A", 2), ("B", 1)]),
        )
        .unwrap();
        assert_eq!(out, scores);
    }

    #[test]
    fn scores_in_tool_order_are_reordered_and_rebuilt() {
        let scores = af3_scores(&["B", "A", "A"]);
        let layout = structure(&[("A", 2), ("B", 1)]);
        let out = harmonize(ToolScores::AlphaFold3(scores.clone()), &layout).unwrap();

        assert_eq!(out.token_chain_ids, ["A", "A", "B"]);
        assert_eq!(out.token_res_ids, [1, 2, 1]);
        assert_eq!(out.atom_plddts, [50.0, 51.0, 50.0]);
        assert_eq!(out.pae[(2, 2)], scores.pae[(0, 0)]);
        assert_eq!(out.pae[(0, 1)], scores.pae[(1, 2)]);
        assert_eq!(out.contact_probs[(2, 0)], scores.contact_probs[(0, 1)]);
    }

    #[test]
    fn renamed_chains_are_matched_after_substitution() {
        let scores = af3_scores(&["A", "A", "B"]);
        let layout = structure(&[("H", 2), ("L", 1)]);
        let out = harmonize(ToolScores::AlphaFold3(scores.clone()), &layout).unwrap();
        assert_eq!(out.token_chain_ids, ["H", "H", "L"]);
        assert_eq!(out.pae, scores.pae);
    }

    #[test]
    fn inconsistent_input_scores_are_rejected() {
        let mut scores = af3_scores(&["A", "B"]);
        scores.token_res_ids.pop();
        let result = harmonize(
            ToolScores::AlphaFold3(scores),
            &structure(&[("A", 1), ("B", 1)]),
        );
        assert!(matches!(result, Err(EngineError::ShapeMismatch(_))));
    }

    #[test]
    fn token_count_must_match_structure_when_reordering() {
        let scores = af3_scores(&["B", "A"]);
        let result = harmonize(
            ToolScores::AlphaFold3(scores),
            &structure(&[("A", 2), ("B", 1)]),
        );
        assert!(matches!(result, Err(EngineError::ShapeMismatch(_))));
    }

    #[test]
    fn tools_without_contacts_get_zero_contact_matrix() {
        let pae = DMatrix::from_element(3, 3, 4.0);
        let layout = structure(&[("A", 2), ("B", 1)]);
        for scores in [
            ToolScores::Boltz { pae: pae.clone() },
            ToolScores::Chai { pae: pae.clone() },
        ] {
            let out = harmonize(scores, &layout).unwrap();
            assert_eq!(out.pae, pae);
            assert_eq!(out.contact_probs, DMatrix::<f64>::zeros(3, 3));
            assert_eq!(out.token_chain_ids, ["A", "A", "B"]);
            assert_eq!(out.atom_chain_ids, ["A", "A", "B"]);
        }
    }

    #[test]
    fn ligand_tokens_are_counted_per_atom() {
        let mut ligand = chain("L", ChainKind::Ligand, 1);
        ligand.residues[0].atoms.push(AtomRecord {
            name: "O1".into(),
            element: "O".into(),
            plddt: 40.0,
        });
        let layout = StructureLayout::new(vec![chain("A", ChainKind::Polymer, 1), ligand]);
        let out = harmonize(
            ToolScores::Boltz {
                pae: DMatrix::zeros(3, 3),
            },
            &layout,
        )
        .unwrap();
        assert_eq!(out.token_chain_ids, ["A", "L", "L"]);
        assert_eq!(out.token_res_ids, [1, 1, 1]);
    }

    #[test]
    fn only_alphafold3_uses_single_letter_ids() {
        assert!(ToolKind::AlphaFold3.uses_single_letter_ids());
        assert!(!ToolKind::Boltz.uses_single_letter_ids());
        assert!(!ToolKind::Chai.uses_single_letter_ids());
    }
}
