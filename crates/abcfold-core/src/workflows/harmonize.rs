use super::WorkflowError;
use crate::core::io::layout::StructureLayout;
use crate::core::io::scores::{PaeJsonFile, ScoreJsonFile};
use crate::core::io::traits::DocumentFile;
use crate::core::models::scores::ScoreFile;
use crate::engine::harmonizer::{ToolKind, ToolScores, harmonize};
use std::path::Path;
use tracing::{info, instrument};

/// Reads one tool's raw scores in the form that tool exports them.
pub fn load_tool_scores(tool: ToolKind, path: &Path) -> Result<ToolScores, WorkflowError> {
    Ok(match tool {
        ToolKind::AlphaFold3 => ToolScores::AlphaFold3(ScoreJsonFile::read_from_path(path)?),
        ToolKind::Boltz => ToolScores::Boltz {
            pae: PaeJsonFile::read_from_path(path)?,
        },
        ToolKind::Chai => ToolScores::Chai {
            pae: PaeJsonFile::read_from_path(path)?,
        },
    })
}

/// Harmonizes a tool's score file against its structure and writes the canonical score file.
#[instrument(skip_all, name = "harmonization_workflow", fields(tool = %tool))]
pub fn run(
    tool: ToolKind,
    scores_path: &Path,
    structure_path: &Path,
    output: &Path,
) -> Result<ScoreFile, WorkflowError> {
    let scores = load_tool_scores(tool, scores_path)?;
    let structure = StructureLayout::load(structure_path)?;
    let harmonized = harmonize(scores, &structure)?;
    ScoreJsonFile::write_to_path(&harmonized, output)?;
    info!(
        output = %output.display(),
        tokens = harmonized.token_count(),
        atoms = harmonized.atom_chain_ids.len(),
        "Wrote harmonized score file."
    );
    Ok(harmonized)
}
