use crate::core::models::sequence::{InputSpecification, PolymerKind, SequenceEntry};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const TEMPLATE_TABLE_NAME: &str = "dummy.m8";
const ZERO_COLUMNS: usize = 11;

#[derive(Debug, Error)]
pub enum TemplateTableError {
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Template {index} of chain '{chain_id}' has no 'data_<name>' header")]
    UnnamedTemplate { chain_id: String, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateHit {
    pub chain_id: String,
    pub template: String,
}

/// Collects one hit per (protein chain, template), grouped by chain in first-seen order.
pub fn collect_hits(spec: &InputSpecification) -> Result<Vec<TemplateHit>, TemplateTableError> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for entry in &spec.sequences {
        let SequenceEntry::Polymer(polymer) = entry else {
            continue;
        };
        if polymer.kind != PolymerKind::Protein {
            continue;
        }
        for chain_id in &polymer.ids {
            for (index, template) in polymer.templates.iter().enumerate() {
                let name = template
                    .name()
                    .ok_or_else(|| TemplateTableError::UnnamedTemplate {
                        chain_id: chain_id.clone(),
                        index,
                    })?;
                match grouped.iter_mut().find(|(id, _)| id == chain_id) {
                    Some((_, names)) => names.push(name.to_string()),
                    None => grouped.push((chain_id.clone(), vec![name.to_string()])),
                }
            }
        }
    }
    Ok(grouped
        .into_iter()
        .flat_map(|(chain_id, names)| {
            names.into_iter().map(move |template| TemplateHit {
                chain_id: chain_id.clone(),
                template,
            })
        })
        .collect())
}

/// Writes the template hit table into `output_dir`.
///
/// Returns `Ok(None)` without touching the filesystem when the specification
/// carries no protein templates.
pub fn write_template_table(
    spec: &InputSpecification,
    output_dir: &Path,
) -> Result<Option<PathBuf>, TemplateTableError> {
    let hits = collect_hits(spec)?;
    if hits.is_empty() {
        return Ok(None);
    }
    let path = output_dir.join(TEMPLATE_TABLE_NAME);
    let csv_error = |e: csv::Error| TemplateTableError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(&path)
        .map_err(csv_error)?;
    for hit in &hits {
        let mut record = vec![hit.chain_id.as_str(), hit.template.as_str()];
        record.extend(std::iter::repeat_n("0", ZERO_COLUMNS));
        writer.write_record(&record).map_err(csv_error)?;
    }
    writer.flush().map_err(|e| csv_error(e.into()))?;
    Ok(Some(path))
}
