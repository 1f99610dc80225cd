//! # Core Module
//!
//! Stateless building blocks shared by the conversion and harmonization
//! engines.
//!
//! - **Data Models** ([`models`]) - Sequence entries, bonds, chain length maps and score files
//! - **Identifier Bookkeeping** ([`registry`]) - Chain identifiers in use and ligand fragment links
//! - **Sequence Alignment** ([`align`]) - Global alignment used to recover chain gaps
//! - **File I/O** ([`io`]) - Input specification, target specification, score and structure files

pub mod align;
pub mod io;
pub mod models;
pub mod registry;
