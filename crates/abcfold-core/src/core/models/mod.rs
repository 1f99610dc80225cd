//! # Core Models Module
//!
//! Data structures shared by the converter, the score harmonizer and the gap
//! resolver.
//!
//! ## Key Components
//!
//! - [`sequence`] - Entries of a structure-input specification (polymers and ligands)
//! - [`bond`] - Covalent bonds between atoms of two chains or fragments
//! - [`chain`] - Ordered chain length maps and the counting modes that produce them
//! - [`scores`] - The canonical confidence-score schema and its shape invariants
//!
//! Entries and bonds are read once from an input specification and never
//! mutated beyond decomposition; score files are built, reordered and
//! serialized exactly once.

pub mod bond;
pub mod chain;
pub mod scores;
pub mod sequence;
