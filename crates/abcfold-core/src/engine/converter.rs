use super::config::ConversionConfig;
use super::error::EngineError;
use crate::core::io::boltz_yaml::{BoltzBody, BoltzDocument, BoltzSequence, LigandFragment};
use crate::core::models::bond::{BondEndpoint, BondPair};
use crate::core::models::sequence::{
    InputSpecification, LigandDescriptor, LigandEntry, MsaSource, PolymerEntry, PolymerKind,
    SequenceEntry,
};
use crate::core::registry::IdentifierRegistry;
use rand::{Rng, thread_rng};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

const SCRATCH_STEM_LEN: usize = 5;
const SCRATCH_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A converted specification together with the identifier bookkeeping that produced it.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub document: BoltzDocument,
    pub registry: IdentifierRegistry,
}

/// Folds polymer entries with identical (kind, sequence) into one entry.
///
/// Ligands keep their relative order and come first; merged polymers follow
/// in the order their sequence was first seen. Identifiers are merged in
/// first-seen order without repeats, and every other attribute comes from the
/// first entry of the group.
pub fn merge_duplicates(entries: &[SequenceEntry]) -> Vec<SequenceEntry> {
    let mut ligands = Vec::new();
    let mut merged: Vec<PolymerEntry> = Vec::new();
    let mut groups: HashMap<(PolymerKind, &str), usize> = HashMap::new();

    for entry in entries {
        match entry {
            SequenceEntry::Ligand(_) => ligands.push(entry.clone()),
            SequenceEntry::Polymer(polymer) => {
                let key = (polymer.kind, polymer.sequence.as_str());
                match groups.get(&key) {
                    Some(&index) => {
                        let target = &mut merged[index];
                        for id in &polymer.ids {
                            if !target.ids.contains(id) {
                                target.ids.push(id.clone());
                            }
                        }
                    }
                    None => {
                        groups.insert(key, merged.len());
                        merged.push(polymer.clone());
                    }
                }
            }
        }
    }

    ligands
        .into_iter()
        .chain(merged.into_iter().map(SequenceEntry::Polymer))
        .collect()
}

/// Translates an input specification into the Boltz grammar.
///
/// # Errors
///
/// Returns [`EngineError::InvalidLigandSpec`] for a ligand without any
/// descriptor, [`EngineError::MissingSourceFile`] for an MSA that cannot be
/// referenced, and [`EngineError::IdentifierSpaceExhausted`] when a composite
/// ligand needs more fresh identifiers than remain.
#[instrument(skip_all, name = "format_conversion")]
pub fn convert(
    spec: &InputSpecification,
    config: &ConversionConfig,
) -> Result<Conversion, EngineError> {
    let entries = merge_duplicates(&spec.sequences);
    if entries.len() < spec.sequences.len() {
        debug!(
            before = spec.sequences.len(),
            after = entries.len(),
            "Merged duplicate polymer sequences."
        );
    }

    let mut registry = IdentifierRegistry::new();
    for entry in &entries {
        registry.register_all(entry.ids());
    }

    let mut polymer_ids = HashSet::new();
    let mut sequences = Vec::with_capacity(entries.len());
    for entry in &entries {
        match entry {
            SequenceEntry::Polymer(polymer) => {
                polymer_ids.extend(polymer.ids.iter().cloned());
                sequences.push(convert_polymer(polymer, config)?);
            }
            SequenceEntry::Ligand(ligand) => {
                sequences.extend(split_ligand(ligand, &mut registry)?);
            }
        }
    }

    let bonds = convert_bonds(&spec.bonds, &registry, &polymer_ids);

    info!(
        entries = sequences.len(),
        bonds = bonds.len(),
        split_ligands = registry.links().count(),
        "Converted input specification."
    );

    Ok(Conversion {
        document: BoltzDocument {
            version: config.output_version,
            sequences,
            bonds,
        },
        registry,
    })
}

fn convert_polymer(
    polymer: &PolymerEntry,
    config: &ConversionConfig,
) -> Result<BoltzSequence, EngineError> {
    let msa = match &polymer.msa {
        None => None,
        Some(MsaSource::Path(path)) => {
            if !path.exists() {
                return Err(EngineError::MissingSourceFile {
                    path: path.to_string_lossy().to_string(),
                });
            }
            Some(path.clone())
        }
        Some(MsaSource::Payload(payload)) => Some(materialize_msa(payload, config)?),
    };

    Ok(BoltzSequence {
        kind: polymer.kind.into(),
        ids: polymer.ids.clone(),
        body: BoltzBody::Polymer {
            sequence: polymer.sequence.clone(),
            msa,
            modifications: polymer.modifications.clone(),
        },
    })
}

fn scratch_path(config: &ConversionConfig) -> PathBuf {
    let mut rng = thread_rng();
    loop {
        let stem: String = (0..SCRATCH_STEM_LEN)
            .map(|_| SCRATCH_LETTERS[rng.gen_range(0..SCRATCH_LETTERS.len())] as char)
            .collect();
        let candidate = config
            .working_dir
            .join(format!("{}.{}", stem, config.msa_extension));
        if !candidate.exists() {
            return candidate;
        }
    }
}

fn materialize_msa(payload: &str, config: &ConversionConfig) -> Result<PathBuf, EngineError> {
    let path = scratch_path(config);
    if !config.materialize_files {
        return Err(EngineError::MissingSourceFile {
            path: path.to_string_lossy().to_string(),
        });
    }
    fs::write(&path, payload).map_err(|e| EngineError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    debug!(path = %path.display(), bytes = payload.len(), "Wrote MSA scratch file.");
    Ok(path)
}

/// Emits one block per ligand fragment.
///
/// A composite ligand yields one block per component code. Block `k` holds
/// the `k`-th fragment of every copy; each copy's fresh identifiers are
/// linked back to that copy's root identifier.
fn split_ligand(
    ligand: &LigandEntry,
    registry: &mut IdentifierRegistry,
) -> Result<Vec<BoltzSequence>, EngineError> {
    let descriptor = ligand
        .descriptor
        .as_ref()
        .ok_or_else(|| EngineError::InvalidLigandSpec {
            id: ligand.ids.join(","),
        })?;

    let codes = match descriptor {
        LigandDescriptor::Smiles(smiles) => {
            return Ok(vec![BoltzSequence::ligand(
                ligand.ids.clone(),
                LigandFragment::Smiles(smiles.clone()),
            )]);
        }
        LigandDescriptor::Code(code) => {
            return Ok(vec![BoltzSequence::ligand(
                ligand.ids.clone(),
                LigandFragment::Ccd(code.clone()),
            )]);
        }
        LigandDescriptor::Codes(codes) => codes,
    };

    let Some((first, rest)) = codes.split_first() else {
        debug!(ids = ?ligand.ids, "Dropping ligand with an empty component list.");
        return Ok(Vec::new());
    };

    let mut blocks = Vec::with_capacity(codes.len());
    blocks.push(BoltzSequence::ligand(
        ligand.ids.clone(),
        LigandFragment::Ccd(first.clone()),
    ));

    let mut parents = ligand.ids.clone();
    for code in rest {
        let mut fresh = Vec::with_capacity(parents.len());
        for parent in &parents {
            let id = registry.next_unused()?;
            registry.register(&id);
            registry.link(parent, &id);
            fresh.push(id);
        }
        blocks.push(BoltzSequence::ligand(
            fresh.clone(),
            LigandFragment::Ccd(code.clone()),
        ));
        parents = fresh;
    }

    debug!(ids = ?ligand.ids, fragments = blocks.len(), "Split composite ligand.");
    Ok(blocks)
}

/// Re-targets intra-ligand bonds onto the fragments a composite ligand was split into.
///
/// Bonds whose endpoints share a chain that is not a polymer and was split
/// are resolved in input order: the first such bond on a root joins the root
/// to its first fragment, and bond `c` joins fragments `c - 1` and `c`. The
/// endpoint with the smaller original position takes slot 1, the other slot
/// 2; on equal positions the first endpoint takes slot 1. All other bonds
/// pass through unchanged.
pub fn convert_bonds(
    bonds: &[BondPair],
    registry: &IdentifierRegistry,
    polymer_ids: &HashSet<String>,
) -> Vec<BondPair> {
    let mut cursors: HashMap<&str, usize> = HashMap::new();
    bonds
        .iter()
        .map(|bond| {
            let root = bond.first.chain_id.as_str();
            if !bond.is_intra_chain() || polymer_ids.contains(root) {
                return bond.clone();
            }
            let fragments = registry.fragments_of(root);
            if fragments.is_empty() {
                return bond.clone();
            }

            let cursor = *cursors
                .entry(root)
                .and_modify(|c| *c += 1)
                .or_insert(0);
            let (first_id, second_id) = match cursor {
                0 => (root, fragments[0].as_str()),
                c if c < fragments.len() => (fragments[c - 1].as_str(), fragments[c].as_str()),
                _ => {
                    warn!(
                        chain = root,
                        fragments = fragments.len(),
                        "More bonds than fragment junctions on split ligand; keeping bond as given."
                    );
                    return bond.clone();
                }
            };

            let (first_slot, second_slot) = if bond.first.position <= bond.second.position {
                (1, 2)
            } else {
                (2, 1)
            };
            BondPair::new(
                BondEndpoint::new(first_id, first_slot, bond.first.atom_name.clone()),
                BondEndpoint::new(second_id, second_slot, bond.second.atom_name.clone()),
            )
        })
        .collect()
}
