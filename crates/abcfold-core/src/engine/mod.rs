//! # Engine Module
//!
//! The transformations between tool formats.
//!
//! - **Configuration** ([`config`]) - Conversion settings, builder and TOML pipeline file
//! - **Format Conversion** ([`converter`]) - Duplicate merging, ligand splitting and bond remapping
//! - **Matrix Permutation** ([`permutation`]) - Label-driven reordering of score matrices
//! - **Score Harmonization** ([`harmonizer`]) - Canonical chain order for each tool's scores
//! - **Gap Resolution** ([`gaps`]) - Alignment-based position maps across predictions
//! - **Error Handling** ([`error`]) - Engine-level error kinds

pub mod config;
pub mod converter;
pub mod error;
pub mod gaps;
pub mod harmonizer;
pub mod permutation;
