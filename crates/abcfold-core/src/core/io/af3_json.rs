use crate::core::io::traits::DocumentFile;
use crate::core::models::bond::{BondEndpoint, BondPair};
use crate::core::models::sequence::{
    InputSpecification, LigandDescriptor, LigandEntry, Modification, MsaSource, PolymerEntry,
    PolymerKind, SequenceEntry, Template,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Sequence entry {index} has no identifiers")]
    EmptyIdentifiers { index: usize },
    #[error("Identifier '{id}' is used by more than one sequence entry")]
    DuplicateIdentifier { id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }

    fn from_ids(ids: &[String]) -> Self {
        match ids {
            [single] => OneOrMany::One(single.clone()),
            _ => OneOrMany::Many(ids.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawModification {
    #[serde(rename_all = "camelCase")]
    Ptm { ptm_type: String, ptm_position: i64 },
    #[serde(rename_all = "camelCase")]
    Base {
        modification_type: String,
        base_position: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTemplate {
    mmcif: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPolymer {
    id: OneOrMany,
    sequence: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    modifications: Vec<RawModification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unpaired_msa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unpaired_msa_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    templates: Vec<RawTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLigand {
    id: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    smiles: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ccd_codes: Option<OneOrMany>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawSequence {
    Protein(RawPolymer),
    Rna(RawPolymer),
    Dna(RawPolymer),
    Ligand(RawLigand),
}

type RawEndpoint = (String, i64, String);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    sequences: Vec<RawSequence>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bonded_atom_pairs: Vec<[RawEndpoint; 2]>,
}

fn polymer_from_raw(kind: PolymerKind, raw: RawPolymer) -> PolymerEntry {
    let msa = match (raw.unpaired_msa, raw.unpaired_msa_path) {
        (Some(payload), _) => Some(MsaSource::Payload(payload)),
        (None, Some(path)) => Some(MsaSource::Path(PathBuf::from(path))),
        (None, None) => None,
    };
    PolymerEntry {
        kind,
        ids: raw.id.into_vec(),
        sequence: raw.sequence,
        modifications: raw
            .modifications
            .into_iter()
            .map(|m| match m {
                RawModification::Ptm {
                    ptm_type,
                    ptm_position,
                } => Modification {
                    position: ptm_position,
                    code: ptm_type,
                },
                RawModification::Base {
                    modification_type,
                    base_position,
                } => Modification {
                    position: base_position,
                    code: modification_type,
                },
            })
            .collect(),
        msa,
        templates: raw
            .templates
            .into_iter()
            .map(|t| Template { mmcif: t.mmcif })
            .collect(),
    }
}

fn polymer_to_raw(entry: &PolymerEntry) -> RawPolymer {
    let (unpaired_msa, unpaired_msa_path) = match &entry.msa {
        Some(MsaSource::Payload(p)) => (Some(p.clone()), None),
        Some(MsaSource::Path(p)) => (None, Some(p.to_string_lossy().to_string())),
        None => (None, None),
    };
    RawPolymer {
        id: OneOrMany::from_ids(&entry.ids),
        sequence: entry.sequence.clone(),
        modifications: entry
            .modifications
            .iter()
            .map(|m| match entry.kind {
                PolymerKind::Protein => RawModification::Ptm {
                    ptm_type: m.code.clone(),
                    ptm_position: m.position,
                },
                PolymerKind::Rna | PolymerKind::Dna => RawModification::Base {
                    modification_type: m.code.clone(),
                    base_position: m.position,
                },
            })
            .collect(),
        unpaired_msa,
        unpaired_msa_path,
        templates: entry
            .templates
            .iter()
            .map(|t| RawTemplate {
                mmcif: t.mmcif.clone(),
            })
            .collect(),
    }
}

fn ligand_from_raw(raw: RawLigand) -> LigandEntry {
    let descriptor = match (raw.smiles, raw.ccd_codes) {
        (Some(smiles), _) => Some(LigandDescriptor::Smiles(smiles)),
        (None, Some(OneOrMany::One(code))) => Some(LigandDescriptor::Code(code)),
        (None, Some(OneOrMany::Many(codes))) => Some(LigandDescriptor::Codes(codes)),
        (None, None) => None,
    };
    LigandEntry {
        ids: raw.id.into_vec(),
        descriptor,
    }
}

fn ligand_to_raw(entry: &LigandEntry) -> RawLigand {
    let (smiles, ccd_codes) = match &entry.descriptor {
        Some(LigandDescriptor::Smiles(s)) => (Some(s.clone()), None),
        Some(LigandDescriptor::Code(c)) => (None, Some(OneOrMany::One(c.clone()))),
        Some(LigandDescriptor::Codes(c)) => (None, Some(OneOrMany::Many(c.clone()))),
        None => (None, None),
    };
    RawLigand {
        id: OneOrMany::from_ids(&entry.ids),
        smiles,
        ccd_codes,
    }
}

fn endpoint_from_raw((chain_id, position, atom_name): RawEndpoint) -> BondEndpoint {
    BondEndpoint {
        chain_id,
        position,
        atom_name,
    }
}

fn endpoint_to_raw(endpoint: &BondEndpoint) -> RawEndpoint {
    (
        endpoint.chain_id.clone(),
        endpoint.position,
        endpoint.atom_name.clone(),
    )
}

fn specification_from_raw(raw: RawSpecification) -> Result<InputSpecification, SpecFileError> {
    let sequences: Vec<SequenceEntry> = raw
        .sequences
        .into_iter()
        .map(|seq| match seq {
            RawSequence::Protein(p) => {
                SequenceEntry::Polymer(polymer_from_raw(PolymerKind::Protein, p))
            }
            RawSequence::Rna(p) => SequenceEntry::Polymer(polymer_from_raw(PolymerKind::Rna, p)),
            RawSequence::Dna(p) => SequenceEntry::Polymer(polymer_from_raw(PolymerKind::Dna, p)),
            RawSequence::Ligand(l) => SequenceEntry::Ligand(ligand_from_raw(l)),
        })
        .collect();

    let mut seen = HashSet::new();
    for (index, entry) in sequences.iter().enumerate() {
        if entry.ids().is_empty() {
            return Err(SpecFileError::EmptyIdentifiers { index });
        }
        for id in entry.ids() {
            if !seen.insert(id.as_str()) {
                return Err(SpecFileError::DuplicateIdentifier { id: id.clone() });
            }
        }
    }

    let bonds = raw
        .bonded_atom_pairs
        .into_iter()
        .map(|[a, b]| BondPair::new(endpoint_from_raw(a), endpoint_from_raw(b)))
        .collect();

    Ok(InputSpecification {
        name: raw.name,
        sequences,
        bonds,
    })
}

fn specification_to_raw(spec: &InputSpecification) -> RawSpecification {
    RawSpecification {
        name: spec.name.clone(),
        sequences: spec
            .sequences
            .iter()
            .map(|entry| match entry {
                SequenceEntry::Polymer(p) => {
                    let raw = polymer_to_raw(p);
                    match p.kind {
                        PolymerKind::Protein => RawSequence::Protein(raw),
                        PolymerKind::Rna => RawSequence::Rna(raw),
                        PolymerKind::Dna => RawSequence::Dna(raw),
                    }
                }
                SequenceEntry::Ligand(l) => RawSequence::Ligand(ligand_to_raw(l)),
            })
            .collect(),
        bonded_atom_pairs: spec
            .bonds
            .iter()
            .map(|b| [endpoint_to_raw(&b.first), endpoint_to_raw(&b.second)])
            .collect(),
    }
}

/// The AlphaFold3-style JSON input specification.
pub struct Af3JsonFile;

impl Af3JsonFile {
    pub fn parse(content: &str) -> Result<InputSpecification, SpecFileError> {
        let raw: RawSpecification = serde_json::from_str(content)?;
        specification_from_raw(raw)
    }
}

impl DocumentFile for Af3JsonFile {
    type Document = InputSpecification;
    type Error = SpecFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Document, Self::Error> {
        let raw: RawSpecification = serde_json::from_reader(reader)?;
        specification_from_raw(raw)
    }

    fn write_to(document: &Self::Document, writer: &mut impl Write) -> Result<(), Self::Error> {
        let raw = specification_to_raw(document);
        serde_json::to_writer_pretty(&mut *writer, &raw)?;
        writeln!(writer)?;
        Ok(())
    }
}
