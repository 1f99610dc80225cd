//! Pairwise sequence alignment used to reconcile chains whose lengths differ
//! between predictions of the same input.

pub mod global;

pub use global::{AlignedPair, Alignment, AlignmentScoring, global_align};
