use crate::core::io::traits::DocumentFile;
use crate::core::models::scores::{ScoreFile, matrix_rows};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Canonical score file, written as JSON with four-space indentation.
pub struct ScoreJsonFile;

impl DocumentFile for ScoreJsonFile {
    type Document = ScoreFile;
    type Error = ScoreFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Document, Self::Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_to(document: &Self::Document, writer: &mut impl Write) -> Result<(), Self::Error> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
        document.serialize(&mut serializer)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PaeDocument {
    #[serde(with = "matrix_rows")]
    pae: DMatrix<f64>,
}

/// A bare PAE matrix exported as `{"pae": [[...], ...]}`, for tools that
/// report no other token-level scores.
pub struct PaeJsonFile;

impl DocumentFile for PaeJsonFile {
    type Document = DMatrix<f64>;
    type Error = ScoreFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Document, Self::Error> {
        let document: PaeDocument = serde_json::from_reader(reader)?;
        Ok(document.pae)
    }

    fn write_to(document: &Self::Document, writer: &mut impl Write) -> Result<(), Self::Error> {
        serde_json::to_writer(
            &mut *writer,
            &PaeDocument {
                pae: document.clone(),
            },
        )?;
        writeln!(writer)?;
        Ok(())
    }
}
