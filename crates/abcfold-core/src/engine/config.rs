use crate::core::align::AlignmentScoring;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub const DEFAULT_MSA_EXTENSION: &str = "a3m";
pub const DEFAULT_OUTPUT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Directory receiving materialized MSA scratch files.
    pub working_dir: PathBuf,
    /// Write inline MSA payloads to scratch files. When off, payloads cannot be referenced.
    pub materialize_files: bool,
    pub msa_extension: String,
    pub output_version: u32,
}

#[derive(Default)]
pub struct ConversionConfigBuilder {
    working_dir: Option<PathBuf>,
    materialize_files: Option<bool>,
    msa_extension: Option<String>,
    output_version: Option<u32>,
}

impl ConversionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
    pub fn materialize_files(mut self, enabled: bool) -> Self {
        self.materialize_files = Some(enabled);
        self
    }
    pub fn msa_extension(mut self, extension: impl Into<String>) -> Self {
        self.msa_extension = Some(extension.into());
        self
    }
    pub fn output_version(mut self, version: u32) -> Self {
        self.output_version = Some(version);
        self
    }

    pub fn build(self) -> Result<ConversionConfig, ConfigError> {
        let msa_extension = self
            .msa_extension
            .unwrap_or_else(|| DEFAULT_MSA_EXTENSION.to_string());
        if msa_extension.is_empty() || msa_extension.contains(['/', '\\', '.']) {
            return Err(ConfigError::InvalidParameter {
                name: "msa_extension",
                reason: format!("'{}' is not a bare file extension", msa_extension),
            });
        }
        Ok(ConversionConfig {
            working_dir: self
                .working_dir
                .ok_or(ConfigError::MissingParameter("working_dir"))?,
            materialize_files: self.materialize_files.unwrap_or(true),
            msa_extension,
            output_version: self.output_version.unwrap_or(DEFAULT_OUTPUT_VERSION),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConversionSection {
    working_dir: Option<PathBuf>,
    materialize_files: Option<bool>,
    msa_extension: Option<String>,
    output_version: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PipelineFile {
    #[serde(default)]
    conversion: ConversionSection,
    #[serde(default)]
    alignment: AlignmentScoring,
}

/// Settings for a full convert-then-harmonize run, as read from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub conversion: ConversionConfig,
    pub alignment: AlignmentScoring,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            ConfigLoadError::Toml { source, .. } => ConfigLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigLoadError> {
        let file: PipelineFile = toml::from_str(content).map_err(|e| ConfigLoadError::Toml {
            path: String::from("<inline>"),
            source: e,
        })?;

        let mut builder = ConversionConfigBuilder::new();
        let section = file.conversion;
        if let Some(dir) = section.working_dir {
            builder = builder.working_dir(dir);
        }
        if let Some(enabled) = section.materialize_files {
            builder = builder.materialize_files(enabled);
        }
        if let Some(extension) = section.msa_extension {
            builder = builder.msa_extension(extension);
        }
        if let Some(version) = section.output_version {
            builder = builder.output_version(version);
        }

        Ok(Self {
            conversion: builder.build()?,
            alignment: file.alignment,
        })
    }
}
