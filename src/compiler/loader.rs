use std::fs;
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result, bail};

use crate::blueprint::ScriptDocument;
use crate::config::StudioConfig;
use crate::dsl::BuilderPayload;

/// Loads a saved builder payload. `.yaml`/`.yml` files are read as YAML,
/// anything else as JSON.
pub fn load_payload(file_path: &Path) -> Result<BuilderPayload> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read builder payload from {}", file_path.display()))?;

    let payload = if is_yaml(file_path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to deserialize YAML payload from {}", file_path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to deserialize JSON payload from {}", file_path.display()))?
    };

    Ok(payload)
}

/// Loads an exported blueprint for import. Rejects documents without a
/// non-empty `steps` array.
pub fn load_document(file_path: &Path) -> Result<ScriptDocument> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read blueprint from {}", file_path.display()))?;
    parse_document(&content).with_context(|| format!("Failed to import {}", file_path.display()))
}

pub fn parse_document(json: &str) -> Result<ScriptDocument> {
    let raw: serde_json::Value = serde_json::from_str(json).context("invalid blueprint format")?;

    match raw.get("steps").and_then(|s| s.as_array()) {
        Some(steps) if !steps.is_empty() => {}
        _ => bail!("invalid blueprint format: expected a non-empty `steps` array"),
    }

    serde_json::from_value(raw).context("invalid blueprint format")
}

pub fn load_config(file_path: &Path) -> Result<StudioConfig> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read config from {}", file_path.display()))?;

    let config: StudioConfig = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize YAML config from {}", file_path.display()))?;

    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}
