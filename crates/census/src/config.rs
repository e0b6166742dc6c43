use anyhow::{Context, Result};
use clap::ValueEnum;
use extract::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sink::WriteMode;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cid_table: CidTableConfig,
    pub output: OutputConfig,
    pub pages: PageScope,
    pub extraction: ExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CidTableConfig {
    pub path: PathBuf,
    pub code_column: String,
    pub description_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub mode: WriteMode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Json,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageScope {
    /// One record per page with text.
    AllPages,
    /// Only the first page of each document is read.
    FirstPage,
}

impl Default for CidTableConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cid_mapping.csv"),
            code_column: extract::cid::DEFAULT_CODE_COLUMN.to_string(),
            description_column: extract::cid::DEFAULT_DESCRIPTION_COLUMN.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("censo_internados.xlsx"),
            format: OutputFormat::Xlsx,
            mode: WriteMode::Overwrite,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cid_table: CidTableConfig::default(),
            output: OutputConfig::default(),
            pages: PageScope::AllPages,
            extraction: ExtractorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, optionally overlaid by a JSON config file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&content).context(format!("Invalid config file: {:?}", path))
    }

    /// Apply `CENSUS_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CENSUS_CID_TABLE") {
            self.cid_table.path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CENSUS_OUTPUT") {
            self.output.path = PathBuf::from(path);
        }
        if let Some(format) = lookup("CENSUS_OUTPUT_FORMAT") {
            self.output.format = OutputFormat::from_str(&format, true)
                .map_err(|e| anyhow::anyhow!("CENSUS_OUTPUT_FORMAT: {e}"))?;
        }
        if let Some(policy) = lookup("CENSUS_URGENCY_POLICY") {
            self.extraction.urgency_policy = policy
                .parse()
                .map_err(|e| anyhow::anyhow!("CENSUS_URGENCY_POLICY: {e}"))?;
        }
        if let Some(value) = lookup("CENSUS_FIRST_PAGE_ONLY") {
            if matches!(value.trim(), "1" | "true" | "yes") {
                self.pages = PageScope::FirstPage;
            }
        }
        Ok(())
    }
}
