use crate::core::io::traits::DocumentFile;
use crate::core::models::bond::{BondEndpoint, BondPair};
use crate::core::models::sequence::{Modification, SequenceKind};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

const DELIM: &str = "      ";
const BLOCK_INDENT: usize = DELIM.len();
const FIELD_INDENT: usize = 2 * DELIM.len();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LigandFragment {
    Smiles(String),
    Ccd(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoltzBody {
    Polymer {
        sequence: String,
        /// Path of the alignment file, or `None` for the `null` marker.
        msa: Option<PathBuf>,
        modifications: Vec<Modification>,
    },
    Ligand(LigandFragment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoltzSequence {
    pub kind: SequenceKind,
    pub ids: Vec<String>,
    pub body: BoltzBody,
}

impl BoltzSequence {
    pub fn ligand(ids: Vec<String>, fragment: LigandFragment) -> Self {
        Self {
            kind: SequenceKind::Ligand,
            ids,
            body: BoltzBody::Ligand(fragment),
        }
    }
}

/// The converted specification in the Boltz input grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoltzDocument {
    pub version: u32,
    pub sequences: Vec<BoltzSequence>,
    pub bonds: Vec<BondPair>,
}

#[derive(Debug, Error)]
pub enum BoltzYamlError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BoltzParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum BoltzParseErrorKind {
    #[error("Invalid integer (value: '{value}')")]
    InvalidInt { value: String },
    #[error("Unknown block type '{name}'")]
    UnknownBlock { name: String },
    #[error("Unexpected line '{content}'")]
    UnexpectedLine { content: String },
    #[error("Block '{block}' is missing field '{field}'")]
    MissingField { block: String, field: &'static str },
    #[error("Malformed atom triple '{value}'")]
    InvalidTriple { value: String },
}

fn clean_id(id: &str) -> String {
    id.replace(['"', '\''], "")
}

fn format_ids(ids: &[String]) -> String {
    match ids {
        [single] => clean_id(single),
        _ => format!(
            "[{}]",
            ids.iter().map(|id| clean_id(id)).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn quote_smiles(smiles: &str) -> String {
    format!("'{}'", smiles.replace('\'', "''"))
}

pub struct BoltzYamlFile;

impl BoltzYamlFile {
    pub fn render(document: &BoltzDocument) -> Result<String, BoltzYamlError> {
        let mut buffer = Vec::new();
        Self::write_to(document, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn parse(content: &str) -> Result<BoltzDocument, BoltzYamlError> {
        Self::read_from(&mut content.as_bytes())
    }
}

impl DocumentFile for BoltzYamlFile {
    type Document = BoltzDocument;
    type Error = BoltzYamlError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Document, Self::Error> {
        let mut parser = Parser::default();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            parser.feed(line_num + 1, &line)?;
        }
        parser.finish()
    }

    fn write_to(document: &Self::Document, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "version: {}", document.version)?;
        writeln!(writer, "sequences:")?;
        for seq in &document.sequences {
            writeln!(writer, "{DELIM}- {}:", seq.kind)?;
            writeln!(writer, "{DELIM}{DELIM}id: {}", format_ids(&seq.ids))?;
            match &seq.body {
                BoltzBody::Polymer {
                    sequence,
                    msa,
                    modifications,
                } => {
                    writeln!(writer, "{DELIM}{DELIM}sequence: {}", sequence)?;
                    match msa {
                        Some(path) => writeln!(writer, "{DELIM}{DELIM}msa: {}", path.display())?,
                        None => writeln!(writer, "{DELIM}{DELIM}msa: null")?,
                    }
                    if !modifications.is_empty() {
                        writeln!(writer, "{DELIM}{DELIM}modifications:")?;
                        for m in modifications {
                            writeln!(writer, "{DELIM}{DELIM}{DELIM}- position: {}", m.position)?;
                            writeln!(writer, "{DELIM}{DELIM}{DELIM}  ccd: {}", m.code)?;
                        }
                    }
                }
                BoltzBody::Ligand(LigandFragment::Smiles(smiles)) => {
                    writeln!(writer, "{DELIM}{DELIM}smiles: {}", quote_smiles(smiles))?;
                }
                BoltzBody::Ligand(LigandFragment::Ccd(code)) => {
                    writeln!(writer, "{DELIM}{DELIM}ccd: {}", code)?;
                }
            }
        }
        if !document.bonds.is_empty() {
            writeln!(writer, "constraints:")?;
            for bond in &document.bonds {
                writeln!(writer, "{DELIM}- bond:")?;
                writeln!(writer, "{DELIM}{DELIM}atom1: {}", bond.first)?;
                writeln!(writer, "{DELIM}{DELIM}atom2: {}", bond.second)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Sequences,
    Constraints,
}

#[derive(Debug, Default)]
struct PendingBlock {
    line: usize,
    name: String,
    ids: Option<Vec<String>>,
    sequence: Option<String>,
    msa: Option<Option<PathBuf>>,
    smiles: Option<String>,
    ccd: Option<String>,
    modifications: Vec<Modification>,
    pending_position: Option<i64>,
    atom1: Option<BondEndpoint>,
    atom2: Option<BondEndpoint>,
}

struct Parser {
    section: Section,
    version: Option<u32>,
    block: Option<PendingBlock>,
    sequences: Vec<BoltzSequence>,
    bonds: Vec<BondPair>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            section: Section::Preamble,
            version: None,
            block: None,
            sequences: Vec::new(),
            bonds: Vec::new(),
        }
    }
}

fn parse_int(line: usize, value: &str) -> Result<i64, BoltzYamlError> {
    value.trim().parse().map_err(|_| BoltzYamlError::Parse {
        line,
        kind: BoltzParseErrorKind::InvalidInt {
            value: value.trim().into(),
        },
    })
}

fn parse_version(line: usize, value: &str) -> Result<u32, BoltzYamlError> {
    u32::try_from(parse_int(line, value)?).map_err(|_| BoltzYamlError::Parse {
        line,
        kind: BoltzParseErrorKind::InvalidInt {
            value: value.trim().into(),
        },
    })
}

fn parse_ids(value: &str) -> Vec<String> {
    let value = value.trim();
    match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        Some(inner) => inner
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => vec![value.to_string()],
    }
}

fn parse_smiles(value: &str) -> String {
    let value = value.trim();
    match value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        Some(inner) => inner.replace("''", "'"),
        None => value.to_string(),
    }
}

fn parse_triple(line: usize, value: &str) -> Result<BondEndpoint, BoltzYamlError> {
    let invalid = || BoltzYamlError::Parse {
        line,
        kind: BoltzParseErrorKind::InvalidTriple {
            value: value.trim().into(),
        },
    };
    let inner = value
        .trim()
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(invalid)?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    Ok(BondEndpoint::new(
        parts[0],
        parse_int(line, parts[1])?,
        parts[2],
    ))
}

fn split_key_value(trimmed: &str) -> Option<(&str, &str)> {
    trimmed
        .split_once(':')
        .map(|(key, value)| (key.trim(), value.trim()))
}

impl Parser {
    fn feed(&mut self, line_num: usize, line: &str) -> Result<(), BoltzYamlError> {
        if line.trim().is_empty() {
            return Ok(());
        }
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();
        let unexpected = || BoltzYamlError::Parse {
            line: line_num,
            kind: BoltzParseErrorKind::UnexpectedLine {
                content: trimmed.into(),
            },
        };

        if indent == 0 {
            self.flush()?;
            match split_key_value(trimmed) {
                Some(("version", value)) => {
                    self.version = Some(parse_version(line_num, value)?);
                }
                Some(("sequences", "")) => self.section = Section::Sequences,
                Some(("constraints", "")) => self.section = Section::Constraints,
                _ => return Err(unexpected()),
            }
            return Ok(());
        }

        if indent == BLOCK_INDENT {
            let name = trimmed
                .strip_prefix("- ")
                .and_then(|rest| rest.strip_suffix(':'))
                .ok_or_else(unexpected)?;
            self.flush()?;
            let known = match self.section {
                Section::Sequences => name.parse::<SequenceKind>().is_ok(),
                Section::Constraints => name == "bond",
                Section::Preamble => false,
            };
            if !known {
                return Err(BoltzYamlError::Parse {
                    line: line_num,
                    kind: BoltzParseErrorKind::UnknownBlock { name: name.into() },
                });
            }
            self.block = Some(PendingBlock {
                line: line_num,
                name: name.to_string(),
                ..Default::default()
            });
            return Ok(());
        }

        let block = self.block.as_mut().ok_or_else(unexpected)?;
        let (key, value) = split_key_value(trimmed.trim_start_matches("- ")).ok_or_else(unexpected)?;

        if indent > FIELD_INDENT {
            match key {
                "position" => block.pending_position = Some(parse_int(line_num, value)?),
                "ccd" => {
                    let position = block.pending_position.take().ok_or_else(unexpected)?;
                    block.modifications.push(Modification {
                        position,
                        code: value.to_string(),
                    });
                }
                _ => return Err(unexpected()),
            }
            return Ok(());
        }

        match key {
            "id" => block.ids = Some(parse_ids(value)),
            "sequence" => block.sequence = Some(value.to_string()),
            "msa" => {
                block.msa = Some(match value {
                    "null" | "" => None,
                    path => Some(PathBuf::from(path)),
                })
            }
            "smiles" => block.smiles = Some(parse_smiles(value)),
            "ccd" => block.ccd = Some(value.to_string()),
            "modifications" => {}
            "atom1" => block.atom1 = Some(parse_triple(line_num, value)?),
            "atom2" => block.atom2 = Some(parse_triple(line_num, value)?),
            _ => return Err(unexpected()),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BoltzYamlError> {
        let Some(block) = self.block.take() else {
            return Ok(());
        };
        let missing = |field: &'static str| BoltzYamlError::Parse {
            line: block.line,
            kind: BoltzParseErrorKind::MissingField {
                block: block.name.clone(),
                field,
            },
        };

        if block.name == "bond" {
            let first = block.atom1.clone().ok_or_else(|| missing("atom1"))?;
            let second = block.atom2.clone().ok_or_else(|| missing("atom2"))?;
            self.bonds.push(BondPair::new(first, second));
            return Ok(());
        }

        let ids = block.ids.clone().ok_or_else(|| missing("id"))?;
        let kind: SequenceKind = block.name.parse().map_err(|_| missing("type"))?;
        let body = if kind.is_polymer() {
            BoltzBody::Polymer {
                sequence: block.sequence.clone().ok_or_else(|| missing("sequence"))?,
                msa: block.msa.clone().flatten(),
                modifications: block.modifications.clone(),
            }
        } else if let Some(smiles) = block.smiles.clone() {
            BoltzBody::Ligand(LigandFragment::Smiles(smiles))
        } else {
            BoltzBody::Ligand(LigandFragment::Ccd(
                block.ccd.clone().ok_or_else(|| missing("ccd"))?,
            ))
        };
        self.sequences.push(BoltzSequence { kind, ids, body });
        Ok(())
    }

    fn finish(mut self) -> Result<BoltzDocument, BoltzYamlError> {
        self.flush()?;
        let version = self
            .version
            .ok_or_else(|| BoltzYamlError::MissingRecord("version".into()))?;
        Ok(BoltzDocument {
            version,
            sequences: self.sequences,
            bonds: self.bonds,
        })
    }
}
