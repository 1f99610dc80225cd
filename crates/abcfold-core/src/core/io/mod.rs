//! Readers and writers for every file the pipeline touches.
//!
//! Specification and score documents implement [`traits::DocumentFile`];
//! predicted structures are consumed through [`traits::StructureFile`], with
//! [`layout::StructureLayout`] as the in-crate implementation.

pub mod af3_json;
pub mod boltz_yaml;
pub mod layout;
pub mod m8;
pub mod scores;
pub mod traits;
