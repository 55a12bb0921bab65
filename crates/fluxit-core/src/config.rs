//! Configuration file handling
//!
//! Defaults can be stored in `./.fluxit.yaml` or in
//! `~/.config/fluxit/config.yaml`. Every key is optional:
//!
//! ```yaml
//! k8sAppDir: kubernetes/apps
//! templateDir: .templates/fluxit
//! template: app_template
//! confirm: if_exists
//! color: true
//! logLevel: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::params::DeploymentStrategy;
use crate::policy::ConfirmPolicy;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".fluxit.yaml";

/// fluxit defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FluxitConfig {
    /// Root of the Flux apps tree; scaffolds land below it
    pub k8s_app_dir: PathBuf,

    /// Directory holding template sets
    pub template_dir: PathBuf,

    /// Template set used when none is given
    pub template: String,

    /// Confirmation policy
    pub confirm: ConfirmPolicy,

    /// Colorized diffs
    pub color: bool,

    /// Log verbosity (error, warn, info, debug, trace)
    pub log_level: String,

    pub deployment_strategy: DeploymentStrategy,

    pub replicas: u32,

    pub service_port: u16,

    /// Kustomization file that declares a namespace directory
    pub ns_kustomization_file: String,
}

impl Default for FluxitConfig {
    fn default() -> Self {
        Self {
            k8s_app_dir: PathBuf::from("kubernetes/apps"),
            template_dir: PathBuf::from(".templates/fluxit"),
            template: "app_template".to_string(),
            confirm: ConfirmPolicy::IfExists,
            color: true,
            log_level: "info".to_string(),
            deployment_strategy: DeploymentStrategy::RollingUpdate,
            replicas: 1,
            service_port: 80,
            ns_kustomization_file: "kustomization.yaml".to_string(),
        }
    }
}

impl FluxitConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the local file and then the
    /// user config file are tried, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(CoreError::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
            return Self::load_from(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                tracing::debug!("Using configuration {}", candidate.display());
                return Self::load_from(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidConfig {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Candidate locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("fluxit").join("config.yaml"));
        }
        paths
    }

    /// Directory of the configured template set
    pub fn template_path(&self) -> PathBuf {
        self.template_dir.join(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = FluxitConfig::default();
        assert_eq!(config.k8s_app_dir, PathBuf::from("kubernetes/apps"));
        assert_eq!(config.template_path(), PathBuf::from(".templates/fluxit/app_template"));
        assert_eq!(config.confirm, ConfirmPolicy::IfExists);
        assert!(config.color);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fluxit.yaml");
        fs::write(&path, "k8sAppDir: cluster/apps\nconfirm: never\nreplicas: 2\n").unwrap();

        let config = FluxitConfig::load(Some(&path)).unwrap();
        assert_eq!(config.k8s_app_dir, PathBuf::from("cluster/apps"));
        assert_eq!(config.confirm, ConfirmPolicy::Never);
        assert_eq!(config.replicas, 2);
        assert_eq!(config.template, "app_template");
        assert_eq!(config.service_port, 80);
    }

    #[test]
    fn test_strategy_in_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fluxit.yaml");
        fs::write(&path, "deploymentStrategy: Recreate\n").unwrap();

        let config = FluxitConfig::load_from(&path).unwrap();
        assert_eq!(config.deployment_strategy, DeploymentStrategy::Recreate);
    }

    #[test]
    fn test_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fluxit.yaml");
        fs::write(&path, "\n").unwrap();

        assert_eq!(FluxitConfig::load_from(&path).unwrap(), FluxitConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fluxit.yaml");
        fs::write(&path, "templateDirectory: nope\n").unwrap();

        let err = FluxitConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let result = FluxitConfig::load(Some(&temp.path().join("missing.yaml")));
        assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
    }
}
