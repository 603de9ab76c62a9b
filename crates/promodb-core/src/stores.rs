use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Retail store identifier as used by the promotions API.
pub type StoreId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub id: StoreId,
    /// Human-readable label used in reports. Optional.
    #[serde(default)]
    pub name: Option<String>,
}

impl StoreConfig {
    /// Name to show in reports: the configured name, or `"store <id>"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("store {}", self.id))
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

/// Load and validate the store list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_stores(&content)
}

fn parse_stores(content: &str) -> Result<StoresFile, ConfigError> {
    let stores_file: StoresFile =
        serde_yaml::from_str(content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    if stores_file.stores.is_empty() {
        return Err(ConfigError::Validation(
            "at least one store must be configured".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for store in &stores_file.stores {
        if !seen_ids.insert(store.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: {}",
                store.id
            )));
        }

        if store.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "store {} has an empty name; omit the field instead",
                store.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
