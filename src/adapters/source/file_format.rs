//! Document formats shared by the file adapters.

use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

use crate::ports::SourceError;

/// Serialization format chosen from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Format for a path; `.json`, `.yaml` and `.yml` are recognized.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            _ => Err(SourceError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parses a document of this format.
    pub fn parse<T: DeserializeOwned>(&self, path: &Path, content: &str) -> Result<T, SourceError> {
        let parsed = match self {
            FileFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            FileFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| SourceError::ParseFailed {
            path: path.display().to_string(),
            message,
        })
    }
}

/// Reads and parses a JSON or YAML document.
pub async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let format = FileFormat::from_path(path)?;

    if !fs::try_exists(path)
        .await
        .map_err(|e| SourceError::IoError(e.to_string()))?
    {
        return Err(SourceError::NotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| SourceError::IoError(e.to_string()))?;

    format.parse(path, &content)
}
