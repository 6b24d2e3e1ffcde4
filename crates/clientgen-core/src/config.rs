//! Run-level configuration for client generation.
//!
//! A `RunConfig` applies to every operation in one generation run. It can be
//! created programmatically or loaded from a YAML/JSON file.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::config::RunConfig;
//!
//! let mut config = RunConfig::new("user-service", "users");
//! config.async_mode = true;
//! config.known_model_types.insert("UserResponse".to_string());
//! assert_eq!(config.model_import_path(), "clients.http.user_service.models.api_models");
//! ```

// Internal imports (std, crate)
use std::collections::BTreeSet;
use std::path::Path;

use crate::naming::{to_snake_case, NamingStyle};
use crate::render::TargetKind;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Configuration shared by every operation of a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Service the client is generated for; decides where models are imported from
    pub service_name: String,

    /// Name of the grouping class that owns the generated functions
    pub api_group_name: String,

    /// Generate cooperative (`async`) functions instead of blocking ones
    #[serde(default)]
    pub async_mode: bool,

    /// Model types that can be imported by the generated code
    #[serde(default)]
    pub known_model_types: BTreeSet<String>,

    /// Naming convention for generated parameter and function names
    #[serde(default)]
    pub naming_style: NamingStyle,

    /// Output language/transport flavour
    #[serde(default)]
    pub target: TargetKind,

    /// Module prefix under which per-service model modules live
    #[serde(default = "default_base_import")]
    pub base_import: String,

    /// Module providing the transport client and response types
    #[serde(default = "default_transport_module")]
    pub transport_module: String,
}

impl RunConfig {
    /// Create a new RunConfig with default values
    pub fn new(service_name: impl Into<String>, api_group_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            api_group_name: api_group_name.into(),
            async_mode: false,
            known_model_types: BTreeSet::new(),
            naming_style: NamingStyle::default(),
            target: TargetKind::default(),
            base_import: default_base_import(),
            transport_module: default_transport_module(),
        }
    }

    /// Add known model types
    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_model_types
            .extend(models.into_iter().map(Into::into));
        self
    }

    /// Same configuration for another API group
    pub fn for_group(&self, api_group_name: impl Into<String>) -> Self {
        Self {
            api_group_name: api_group_name.into(),
            ..self.clone()
        }
    }

    /// Dotted module path the generated code imports models from
    pub fn model_import_path(&self) -> String {
        let mut parts: Vec<String> = self
            .base_import
            .split(['.', '/'])
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        parts.push(to_snake_case(&self.service_name));
        parts.push("models".to_string());
        parts.push("api_models".to_string());
        parts.join(".")
    }

    /// Load configuration from a file (YAML or JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

fn default_base_import() -> String {
    "clients.http".to_string()
}

fn default_transport_module() -> String {
    "httpx".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("config.yaml");

        let config = RunConfig::new("user-service", "users").with_models(["UserResponse"]);
        config.save(&file_path).await?;

        let loaded = RunConfig::from_file(&file_path).await?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.service_name, "user-service");
        assert!(!loaded.async_mode);
        assert_eq!(loaded.naming_style, NamingStyle::Snake);
        assert_eq!(loaded.target, TargetKind::PythonHttpx);
        assert!(loaded.known_model_types.contains("UserResponse"));

        Ok(())
    }

    #[tokio::test]
    async fn test_config_defaults_from_minimal_file() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("config.json");
        fs::write(
            &file_path,
            r#"{"service_name": "Billing", "api_group_name": "invoices", "async_mode": true}"#,
        )
        .await?;

        let loaded = RunConfig::from_file(&file_path).await?;
        assert!(loaded.async_mode);
        assert!(loaded.known_model_types.is_empty());
        assert_eq!(loaded.base_import, "clients.http");
        assert_eq!(loaded.transport_module, "httpx");
        Ok(())
    }

    #[test]
    fn test_model_import_path() {
        let mut config = RunConfig::new("PetStore", "pets");
        assert_eq!(
            config.model_import_path(),
            "clients.http.pet_store.models.api_models"
        );
        config.base_import = "generated/http".to_string();
        assert_eq!(
            config.model_import_path(),
            "generated.http.pet_store.models.api_models"
        );
    }

    #[test]
    fn test_for_group_keeps_settings() {
        let config = RunConfig::new("svc", "users").with_models(["A"]);
        let other = config.for_group("orders");
        assert_eq!(other.api_group_name, "orders");
        assert_eq!(other.known_model_types, config.known_model_types);
    }
}
