use crate::core::io::traits::StructureFile;
use crate::core::models::chain::{ChainLengthMap, CountOptions, LengthMode};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    Polymer,
    Ligand,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtomRecord {
    pub name: String,
    pub element: String,
    pub plddt: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResidueRecord {
    pub number: i64,
    pub name: String,
    #[serde(default)]
    pub modified: bool,
    pub atoms: Vec<AtomRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainRecord {
    pub id: String,
    pub kind: ChainKind,
    pub residues: Vec<ResidueRecord>,
}

impl ChainRecord {
    /// Whether a residue is split into one token per atom under `options`.
    fn expands(&self, residue: &ResidueRecord, options: CountOptions) -> bool {
        match options.mode {
            LengthMode::Atoms => true,
            LengthMode::Residues => {
                (self.kind == ChainKind::Ligand && options.include_ligand_atoms)
                    || (residue.modified && options.include_modified_atoms)
            }
        }
    }

    /// Atom groups, one per token under `options`.
    fn tokens(&self, options: CountOptions) -> Vec<(i64, &[AtomRecord])> {
        let mut tokens = Vec::new();
        for residue in &self.residues {
            if self.expands(residue, options) {
                tokens.extend(
                    residue
                        .atoms
                        .iter()
                        .map(|atom| (residue.number, std::slice::from_ref(atom))),
                );
            } else {
                tokens.push((residue.number, residue.atoms.as_slice()));
            }
        }
        tokens
    }
}

/// A predicted structure reduced to what score canonicalization needs:
/// chains in file order, their residues, and per-atom element and pLDDT.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructureLayout {
    pub chains: Vec<ChainRecord>,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON parsing error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

impl StructureLayout {
    pub fn new(chains: Vec<ChainRecord>) -> Self {
        Self { chains }
    }

    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path).map_err(|e| LayoutError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| LayoutError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn chain(&self, chain_id: &str) -> Option<&ChainRecord> {
        self.chains.iter().find(|c| c.id == chain_id)
    }
}

impl StructureFile for StructureLayout {
    fn chain_ids(&self) -> Vec<String> {
        self.chains.iter().map(|c| c.id.clone()).collect()
    }

    fn chain_lengths(&self, options: CountOptions) -> ChainLengthMap {
        self.chains
            .iter()
            .map(|chain| (chain.id.as_str(), chain.tokens(options).len()))
            .collect()
    }

    fn token_residue_ids(&self) -> Vec<(String, Vec<i64>)> {
        self.chains
            .iter()
            .map(|chain| {
                let ids = chain
                    .tokens(CountOptions::tokens())
                    .into_iter()
                    .map(|(number, _)| number)
                    .collect();
                (chain.id.clone(), ids)
            })
            .collect()
    }

    fn plddts(&self) -> Vec<f64> {
        self.chains
            .iter()
            .flat_map(|c| &c.residues)
            .flat_map(|r| &r.atoms)
            .map(|a| a.plddt)
            .collect()
    }

    fn token_plddts(&self, chain_id: &str) -> Vec<f64> {
        let Some(chain) = self.chain(chain_id) else {
            return Vec::new();
        };
        chain
            .tokens(CountOptions::tokens())
            .into_iter()
            .map(|(_, atoms)| {
                if atoms.is_empty() {
                    0.0
                } else {
                    atoms.iter().map(|a| a.plddt).sum::<f64>() / atoms.len() as f64
                }
            })
            .collect()
    }

    fn chain_elements(&self, chain_id: &str) -> Option<String> {
        let chain = self.chain(chain_id)?;
        Some(
            chain
                .tokens(CountOptions::tokens())
                .into_iter()
                .map(|(_, atoms)| {
                    atoms
                        .first()
                        .and_then(|a| a.element.chars().next())
                        .unwrap_or('X')
                })
                .collect(),
        )
    }
}
