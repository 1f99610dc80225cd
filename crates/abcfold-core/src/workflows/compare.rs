use super::WorkflowError;
use crate::core::align::AlignmentScoring;
use crate::core::io::layout::StructureLayout;
use crate::core::io::traits::StructureFile;
use crate::core::models::chain::{ChainLengthMap, CountOptions};
use crate::engine::config::PipelineConfig;
use crate::engine::gaps::{detect_gaps, fill_with_gaps, shared_chains};
use std::path::Path;
use tracing::{info, instrument};

/// Per-token confidence of several predictions, aligned column by column.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Chains covered, in the order of the first prediction.
    pub chains: Vec<String>,
    /// One series per prediction; `None` where that prediction lacks the column.
    pub series: Vec<Vec<Option<f64>>>,
}

pub fn compare<S: StructureFile>(
    structures: &[S],
    scoring: &AlignmentScoring,
) -> Result<Comparison, WorkflowError> {
    let lengths: Vec<ChainLengthMap> = structures
        .iter()
        .map(|s| s.chain_lengths(CountOptions::tokens()))
        .collect();
    let chains = shared_chains(&lengths);

    let values: Vec<Vec<f64>> = structures
        .iter()
        .map(|s| chains.iter().flat_map(|c| s.token_plddts(c)).collect())
        .collect();

    let gaps = detect_gaps(structures, scoring)?;
    let series = if gaps.is_empty() {
        values
            .into_iter()
            .map(|v| v.into_iter().map(Some).collect())
            .collect()
    } else {
        gaps.iter()
            .zip(&values)
            .map(|(indices, values)| fill_with_gaps(indices, values))
            .collect::<Result<_, _>>()?
    };

    Ok(Comparison { chains, series })
}

/// Loads structure layouts from disk and compares them.
#[instrument(skip_all, name = "comparison_workflow", fields(structures = paths.len()))]
pub fn run<P: AsRef<Path>>(
    paths: &[P],
    scoring: &AlignmentScoring,
) -> Result<Comparison, WorkflowError> {
    let structures = paths
        .iter()
        .map(|p| StructureLayout::load(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let comparison = compare(&structures, scoring)?;
    info!(
        chains = comparison.chains.len(),
        columns = comparison.series.first().map_or(0, Vec::len),
        "Compared predictions."
    );
    Ok(comparison)
}

/// Like [`run`], with the alignment scoring read from a pipeline TOML file.
pub fn run_with_settings<P: AsRef<Path>>(
    paths: &[P],
    settings: &Path,
) -> Result<Comparison, WorkflowError> {
    let pipeline = PipelineConfig::load(settings)?;
    run(paths, &pipeline.alignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::layout::{AtomRecord, ChainKind, ChainRecord, ResidueRecord};
    use std::fs;
    use tempfile::tempdir;

    fn layout(chains: &[(&str, &str, f64)]) -> StructureLayout {
        StructureLayout::new(
            chains
                .iter()
                .map(|&(id, elements, plddt)| ChainRecord {
                    id: id.into(),
                    kind: ChainKind::Polymer,
                    residues: elements
                        .chars()
                        .enumerate()
                        .map(|(i, e)| ResidueRecord {
                            number: i as i64 + 1,
                            name: "UNK".into(),
                            modified: false,
                            atoms: vec![AtomRecord {
                                name: e.to_string(),
                                element: e.to_string(),
                                plddt: plddt + i as f64,
                            }],
                        })
                        .collect(),
                })
                .collect(),
        )
    }

    #[test]
    fn single_prediction_has_no_gaps() {
        let comparison =
            compare(&[layout(&[("A", "NCO", 10.0)])], &AlignmentScoring::default()).unwrap();
        assert_eq!(comparison.series, vec![vec![Some(10.0), Some(11.0), Some(12.0)]]);
    }

    #[test]
    fn shorter_prediction_is_padded_with_none() {
        let structures = [
            layout(&[("A", "NCCONCCO", 50.0)]),
            layout(&[("A", "NCCOCCO", 60.0)]),
        ];
        let comparison = compare(&structures, &AlignmentScoring::default()).unwrap();
        assert_eq!(comparison.chains, ["A"]);
        assert_eq!(comparison.series[0].len(), comparison.series[1].len());
        assert_eq!(comparison.series[1].iter().filter(|v| v.is_none()).count(), 1);
        assert_eq!(comparison.series[1][0], Some(60.0));
        assert_eq!(comparison.series[1].last(), Some(&Some(66.0)));
    }

    #[test]
    fn series_stay_column_aligned_when_chains_diverge() {
        let structures = [layout(&[("A", "NCO", 10.0)]), layout(&[("A", "ON", 20.0)])];
        let comparison = compare(&structures, &AlignmentScoring::default()).unwrap();
        assert_eq!(comparison.series[0].len(), comparison.series[1].len());
        let present: Vec<f64> = comparison.series[1].iter().flatten().copied().collect();
        assert_eq!(present, vec![20.0, 21.0]);
    }

    #[test]
    fn run_loads_layouts_from_disk() {
        let dir = tempdir().unwrap();
        let body = r#"{"chains": [{"id": "A", "kind": "polymer", "residues": [
            {"number": 1, "name": "GLY", "atoms": [{"name": "CA", "element": "C", "plddt": 42.0}]}]}]}"#;
        let first = dir.path().join("a.json");
        let second = dir.path().join("b.json");
        fs::write(&first, body).unwrap();
        fs::write(&second, body).unwrap();

        let comparison = run(&[first, second], &AlignmentScoring::default()).unwrap();
        assert_eq!(comparison.series, vec![vec![Some(42.0)], vec![Some(42.0)]]);
    }

    #[test]
    fn unreadable_settings_are_reported() {
        let dir = tempdir().unwrap();
        let result = run_with_settings(&[dir.path().join("a.json")], &dir.path().join("absent.toml"));
        assert!(matches!(result, Err(WorkflowError::Settings(_))));
    }

    #[test]
    fn unreadable_layout_is_reported() {
        let dir = tempdir().unwrap();
        let result = run(&[dir.path().join("absent.json")], &AlignmentScoring::default());
        assert!(matches!(result, Err(WorkflowError::Layout(_))));
    }
}
