use super::WorkflowError;
use crate::core::io::af3_json::Af3JsonFile;
use crate::core::io::boltz_yaml::BoltzYamlFile;
use crate::core::io::m8::write_template_table;
use crate::core::io::traits::DocumentFile;
use crate::engine::config::{ConversionConfig, PipelineConfig};
use crate::engine::converter::convert;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

const OUTPUT_EXTENSION: &str = "yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub output: PathBuf,
    pub entries: usize,
    pub bonds: usize,
    /// Split ligand roots with the fragment identifiers minted for them.
    pub fragments: Vec<(String, Vec<String>)>,
    /// Template hit table written to the working directory, if any templates were given.
    pub template_table: Option<PathBuf>,
}

fn check_extension(output: &Path) -> Result<(), WorkflowError> {
    if output.extension().and_then(|e| e.to_str()) == Some(OUTPUT_EXTENSION) {
        Ok(())
    } else {
        Err(WorkflowError::InvalidExtension {
            path: output.to_string_lossy().to_string(),
            expected: OUTPUT_EXTENSION,
        })
    }
}

/// Converts an AlphaFold3 input file into a Boltz YAML file.
///
/// The output path is checked before anything is written, so a rejected
/// path leaves no scratch files behind.
#[instrument(skip_all, name = "conversion_workflow")]
pub fn run(
    input: &Path,
    output: &Path,
    config: &ConversionConfig,
) -> Result<ConversionSummary, WorkflowError> {
    check_extension(output)?;

    let spec = Af3JsonFile::read_from_path(input)?;
    info!(
        input = %input.display(),
        sequences = spec.sequences.len(),
        bonds = spec.bonds.len(),
        "Loaded input specification."
    );

    let conversion = convert(&spec, config)?;
    BoltzYamlFile::write_to_path(&conversion.document, output)?;
    let template_table = write_template_table(&spec, &config.working_dir)?;

    let summary = ConversionSummary {
        output: output.to_path_buf(),
        entries: conversion.document.sequences.len(),
        bonds: conversion.document.bonds.len(),
        fragments: conversion
            .registry
            .links()
            .map(|(root, fragments)| (root.to_string(), fragments.to_vec()))
            .collect(),
        template_table,
    };
    info!(
        output = %output.display(),
        entries = summary.entries,
        "Wrote converted specification."
    );
    Ok(summary)
}

/// Like [`run`], with the conversion settings read from a pipeline TOML file.
pub fn run_with_settings(
    input: &Path,
    output: &Path,
    settings: &Path,
) -> Result<ConversionSummary, WorkflowError> {
    let pipeline = PipelineConfig::load(settings)?;
    run(input, output, &pipeline.conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::boltz_yaml::{BoltzBody, LigandFragment};
    use crate::engine::config::ConversionConfigBuilder;
    use crate::engine::error::EngineError;
    use std::fs;
    use tempfile::tempdir;

    const INPUT: &str = r#"{
        "name": "glycoprotein",
        "modelSeeds": [1],
        "dialect": "alphafold3",
        "version": 2,
        "sequences": [
            {"protein": {"id": "A", "sequence": "MNVT", "unpairedMsa": ">query\nMNVT\n",
                         "templates": [{"mmcif": "data_1abc\n#\n", "queryIndices": [0], "templateIndices": [0]}]}},
            {"protein": {"id": "B", "sequence": "MNVT", "unpairedMsa": ">query\nMNVT\n"}},
            {"ligand": {"id": "G", "ccdCodes": ["NAG", "NAG"]}}
        ],
        "bondedAtomPairs": [
            [["A", 2, "ND2"], ["G", 1, "C1"]],
            [["G", 1, "O4"], ["G", 2, "C1"]]
        ]
    }"#;

    fn setup() -> (tempfile::TempDir, PathBuf, ConversionConfig) {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.json");
        fs::write(&input, INPUT).unwrap();
        let config = ConversionConfigBuilder::new()
            .working_dir(dir.path())
            .build()
            .unwrap();
        (dir, input, config)
    }

    #[test]
    fn converts_file_and_writes_yaml() {
        let (dir, input, config) = setup();
        let output = dir.path().join("out.yaml");
        let summary = run(&input, &output, &config).unwrap();

        assert_eq!(summary.entries, 3);
        assert_eq!(summary.bonds, 2);
        assert_eq!(summary.fragments, vec![("G".to_string(), vec!["C".to_string()])]);

        let written = BoltzYamlFile::read_from_path(&output).unwrap();
        assert_eq!(written.version, 1);
        assert_eq!(written.sequences[0].ids, ["G"]);
        assert_eq!(written.sequences[1].ids, ["C"]);
        assert_eq!(
            written.sequences[1].body,
            BoltzBody::Ligand(LigandFragment::Ccd("NAG".into()))
        );
        assert_eq!(written.sequences[2].ids, ["A", "B"]);
        assert_eq!(written.bonds[1].first.chain_id, "G");
        assert_eq!(written.bonds[1].second.chain_id, "C");
    }

    #[test]
    fn round_trip_preserves_identifiers_and_sequences() {
        let (dir, input, config) = setup();
        let output = dir.path().join("out.yaml");
        run(&input, &output, &config).unwrap();

        let written = BoltzYamlFile::read_from_path(&output).unwrap();
        let polymer = written
            .sequences
            .iter()
            .find(|s| s.kind.is_polymer())
            .unwrap();
        match &polymer.body {
            BoltzBody::Polymer { sequence, msa, .. } => {
                assert_eq!(sequence, "MNVT");
                let msa = msa.as_ref().unwrap();
                assert_eq!(fs::read_to_string(msa).unwrap(), ">query\nMNVT\n");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn template_table_is_written_next_to_scratch_files() {
        let (dir, input, config) = setup();
        let summary = run(&input, &dir.path().join("out.yaml"), &config).unwrap();
        let table = summary.template_table.unwrap();
        assert_eq!(table.parent(), Some(dir.path()));
        let content = fs::read_to_string(table).unwrap();
        assert!(content.starts_with("A\t1abc\t0"));
    }

    #[test]
    fn non_yaml_output_is_rejected_before_writing() {
        let (dir, input, config) = setup();
        let output = dir.path().join("out.yml");
        let result = run(&input, &output, &config);
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidExtension { expected: "yaml", .. })
        ));
        assert!(!output.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn disabled_materialization_reports_missing_msa() {
        let (dir, input, _) = setup();
        let config = ConversionConfigBuilder::new()
            .working_dir(dir.path())
            .materialize_files(false)
            .build()
            .unwrap();
        let result = run(&input, &dir.path().join("out.yaml"), &config);
        assert!(matches!(
            result,
            Err(WorkflowError::Engine(EngineError::MissingSourceFile { .. }))
        ));
    }

    #[test]
    fn settings_file_drives_the_conversion() {
        let (dir, input, _) = setup();
        let scratch = dir.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        let settings = dir.path().join("pipeline.toml");
        fs::write(
            &settings,
            format!(
                "[conversion]\nworking-dir = '{}'\nmsa-extension = 'msa'\n",
                scratch.display()
            ),
        )
        .unwrap();

        let output = dir.path().join("out.yaml");
        let summary = run_with_settings(&input, &output, &settings).unwrap();
        assert_eq!(summary.template_table.unwrap().parent(), Some(scratch.as_path()));
        let msa_files = fs::read_dir(&scratch)
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension() == Some(std::ffi::OsStr::new("msa")))
            .count();
        assert_eq!(msa_files, 1);
    }

    #[test]
    fn settings_without_working_dir_are_rejected() {
        let (dir, input, _) = setup();
        let settings = dir.path().join("pipeline.toml");
        fs::write(&settings, "[conversion]\nmaterialize-files = false\n").unwrap();
        let result = run_with_settings(&input, &dir.path().join("out.yaml"), &settings);
        assert!(matches!(result, Err(WorkflowError::Settings(_))));
    }

    #[test]
    fn missing_input_is_a_specification_error() {
        let (dir, _, config) = setup();
        let result = run(
            &dir.path().join("absent.json"),
            &dir.path().join("out.yaml"),
            &config,
        );
        assert!(matches!(result, Err(WorkflowError::Specification(_))));
    }
}
