use thiserror::Error;

use crate::core::models::scores::ShapeError;
use crate::core::registry::IdentifierSpaceExhausted;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Ligand '{id}' has neither a SMILES string nor component codes")]
    InvalidLigandSpec { id: String },

    #[error("Source file '{path}' does not exist")]
    MissingSourceFile { path: String },

    #[error(transparent)]
    IdentifierSpaceExhausted(#[from] IdentifierSpaceExhausted),

    #[error(transparent)]
    ShapeMismatch(#[from] ShapeError),

    #[error("Failed to write scratch file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}
