//! # Workflows Module
//!
//! File-to-file entry points. Each workflow reads its inputs, runs one engine
//! operation and writes a complete replacement of its output.
//!
//! - **Conversion** ([`convert`]) - AlphaFold3 input JSON to Boltz YAML, plus the template hit table
//! - **Harmonization** ([`harmonize`]) - One tool's scores to the canonical score file
//! - **Comparison** ([`compare`]) - Gap-aligned per-token confidence across predictions
//!
//! Conversion and comparison can also take their settings from a pipeline
//! TOML file (see [`crate::engine::config::PipelineConfig`]).

use crate::core::io::af3_json::SpecFileError;
use crate::core::io::boltz_yaml::BoltzYamlError;
use crate::core::io::layout::LayoutError;
use crate::core::io::m8::TemplateTableError;
use crate::core::io::scores::ScoreFileError;
use crate::core::models::scores::ShapeError;
use crate::engine::config::ConfigLoadError;
use crate::engine::error::EngineError;
use thiserror::Error;

pub mod compare;
pub mod convert;
pub mod harmonize;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Failed to read input specification: {0}")]
    Specification(#[from] SpecFileError),

    #[error("Failed to write converted specification: {0}")]
    Output(#[from] BoltzYamlError),

    #[error("Score file error: {0}")]
    Scores(#[from] ScoreFileError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Template table error: {0}")]
    Templates(#[from] TemplateTableError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to load pipeline settings: {0}")]
    Settings(#[from] ConfigLoadError),

    #[error("Output file '{path}' must have a .{expected} extension")]
    InvalidExtension { path: String, expected: &'static str },
}

impl From<ShapeError> for WorkflowError {
    fn from(error: ShapeError) -> Self {
        WorkflowError::Engine(EngineError::ShapeMismatch(error))
    }
}
