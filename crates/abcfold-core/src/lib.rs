//! # ABCFold Core Library
//!
//! Moves one prediction job between structure-prediction tools: it converts an
//! AlphaFold3-style input specification into the Boltz input grammar, and it
//! brings each tool's confidence scores into one canonical chain ordering so
//! predictions can be compared position by position.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models, the identifier
//!   registry, global sequence alignment, and file readers and writers.
//!
//! - **[`engine`]: The Logic Core.** The format converter with ligand splitting
//!   and bond remapping, matrix permutation, score harmonization and gap
//!   resolution across predictions of different lengths.
//!
//! - **[`workflows`]: The Public API.** File-to-file entry points that tie the
//!   `engine` and `core` together: convert a specification, harmonize a score
//!   file, compare a set of predictions.

pub mod core;
pub mod engine;
pub mod workflows;
