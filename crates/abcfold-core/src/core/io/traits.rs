use crate::core::models::chain::{ChainLengthMap, CountOptions};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing a specification or score
/// document in one tool's file format.
pub trait DocumentFile {
    /// The in-memory form of the document.
    type Document;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a document from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Document, Self::Error>;

    /// Writes a document to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or I/O operations encounter issues.
    fn write_to(document: &Self::Document, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads a document from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Document, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a document to a file path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(document: &Self::Document, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(document, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Read access to a predicted structure, as needed to canonicalize its scores.
///
/// Chain order is the order chains appear in the file and is stable across
/// calls. Tokens follow [`CountOptions::tokens`]: one per residue, except
/// ligand and modified residues, which contribute one token per atom.
pub trait StructureFile {
    /// Chain identifiers in file order.
    fn chain_ids(&self) -> Vec<String>;

    /// Per-chain unit counts under the requested counting mode.
    fn chain_lengths(&self, options: CountOptions) -> ChainLengthMap;

    /// Per-chain residue number of every token, chains in file order.
    fn token_residue_ids(&self) -> Vec<(String, Vec<i64>)>;

    /// Per-atom confidence values in file order.
    fn plddts(&self) -> Vec<f64>;

    /// Per-token confidence of one chain (the mean over the token's atoms).
    fn token_plddts(&self, chain_id: &str) -> Vec<f64>;

    /// One element letter per token of the chain, used as alignment input.
    fn chain_elements(&self, chain_id: &str) -> Option<String>;
}
