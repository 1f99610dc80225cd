use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolymerKind {
    Protein,
    Rna,
    Dna,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    Protein,
    Rna,
    Dna,
    Ligand,
}

impl SequenceKind {
    pub fn is_polymer(self) -> bool {
        !matches!(self, SequenceKind::Ligand)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SequenceKind::Protein => "protein",
            SequenceKind::Rna => "rna",
            SequenceKind::Dna => "dna",
            SequenceKind::Ligand => "ligand",
        }
    }
}

impl From<PolymerKind> for SequenceKind {
    fn from(kind: PolymerKind) -> Self {
        match kind {
            PolymerKind::Protein => SequenceKind::Protein,
            PolymerKind::Rna => SequenceKind::Rna,
            PolymerKind::Dna => SequenceKind::Dna,
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid sequence kind string: '{0}'")]
pub struct ParseSequenceKindError(pub String);

impl FromStr for SequenceKind {
    type Err = ParseSequenceKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "protein" => Ok(SequenceKind::Protein),
            "rna" => Ok(SequenceKind::Rna),
            "dna" => Ok(SequenceKind::Dna),
            "ligand" => Ok(SequenceKind::Ligand),
            _ => Err(ParseSequenceKindError(s.to_string())),
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A residue-code substitution anchored at a 1-based position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub position: i64,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MsaSource {
    /// Alignment text carried inline by the input specification.
    Payload(String),
    /// Alignment already stored on disk.
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub mmcif: String,
}

impl Template {
    /// Template name taken from the `data_<name>` header of the mmCIF text.
    pub fn name(&self) -> Option<&str> {
        self.mmcif
            .lines()
            .next()
            .and_then(|header| header.split('_').nth(1))
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolymerEntry {
    pub kind: PolymerKind,
    pub ids: Vec<String>,
    pub sequence: String,
    pub modifications: Vec<Modification>,
    pub msa: Option<MsaSource>,
    pub templates: Vec<Template>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LigandDescriptor {
    Smiles(String),
    /// A single component code given as a plain string.
    Code(String),
    /// An ordered list of component codes; more than one makes a composite ligand.
    Codes(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigandEntry {
    pub ids: Vec<String>,
    pub descriptor: Option<LigandDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceEntry {
    Polymer(PolymerEntry),
    Ligand(LigandEntry),
}

impl SequenceEntry {
    pub fn kind(&self) -> SequenceKind {
        match self {
            SequenceEntry::Polymer(p) => p.kind.into(),
            SequenceEntry::Ligand(_) => SequenceKind::Ligand,
        }
    }

    pub fn ids(&self) -> &[String] {
        match self {
            SequenceEntry::Polymer(p) => &p.ids,
            SequenceEntry::Ligand(l) => &l.ids,
        }
    }

    pub fn as_polymer(&self) -> Option<&PolymerEntry> {
        match self {
            SequenceEntry::Polymer(p) => Some(p),
            SequenceEntry::Ligand(_) => None,
        }
    }
}

/// A parsed structure-input specification: the entries in document order and
/// the explicit covalent bonds between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSpecification {
    pub name: Option<String>,
    pub sequences: Vec<SequenceEntry>,
    pub bonds: Vec<super::bond::BondPair>,
}
