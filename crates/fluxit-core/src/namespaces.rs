//! Namespace discovery in a Flux apps directory
//!
//! A Flux repository keeps one directory per namespace under its apps root.
//! Each of them carries a kustomization declaring the namespace:
//!
//! ```text
//! kubernetes/apps/
//! ├── web/
//! │   ├── kustomization.yaml   # namespace: web
//! │   └── nginx/
//! └── monitoring/
//!     └── kustomization.yaml   # namespace: monitoring
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// A namespace found in the apps directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    /// Namespace as declared in the kustomization
    pub name: String,
    /// Directory holding the namespace kustomization
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct NamespaceKustomization {
    #[serde(default)]
    namespace: Option<String>,
}

/// Find every namespace declared below `app_dir`.
///
/// Subdirectories without a readable `kustomization_file` declaring a
/// `namespace:` are skipped with a warning.
pub fn discover_namespaces(
    app_dir: &Path,
    kustomization_file: &str,
) -> Result<BTreeMap<String, NamespaceEntry>> {
    if !app_dir.is_dir() {
        return Err(CoreError::AppDirNotFound {
            path: app_dir.display().to_string(),
        });
    }

    let mut namespaces = BTreeMap::new();

    for entry in std::fs::read_dir(app_dir)? {
        let entry = entry?;
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }

        let file = dir.join(kustomization_file);
        if !file.is_file() {
            continue;
        }

        match read_namespace(&file) {
            Ok(Some(name)) => {
                tracing::debug!("Found namespace {} in {}", name, file.display());
                namespaces.insert(
                    name.clone(),
                    NamespaceEntry {
                        name,
                        dir: dir.clone(),
                    },
                );
            }
            Ok(None) => {
                tracing::warn!("No namespace declared in {}", file.display());
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", file.display(), e);
            }
        }
    }

    Ok(namespaces)
}

fn read_namespace(file: &Path) -> Result<Option<String>> {
    let content = std::fs::read_to_string(file)?;
    let parsed: Option<NamespaceKustomization> = serde_yaml::from_str(&content)?;
    Ok(parsed
        .and_then(|k| k.namespace)
        .map(|ns| ns.trim().to_string())
        .filter(|ns| !ns.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_apps_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("web/nginx")).unwrap();
        fs::write(
            root.join("web/kustomization.yaml"),
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nnamespace: web\nresources:\n  - ./nginx/ks.yaml\n",
        )
        .unwrap();

        fs::create_dir_all(root.join("monitoring")).unwrap();
        fs::write(root.join("monitoring/kustomization.yaml"), "namespace: monitoring\n").unwrap();

        // No namespace key
        fs::create_dir_all(root.join("flux-system")).unwrap();
        fs::write(root.join("flux-system/kustomization.yaml"), "resources: []\n").unwrap();

        // Broken YAML
        fs::create_dir_all(root.join("broken")).unwrap();
        fs::write(root.join("broken/kustomization.yaml"), "namespace: [oops\n").unwrap();

        // No kustomization at all
        fs::create_dir_all(root.join("scratch")).unwrap();

        fs::write(root.join("README.md"), "# apps").unwrap();

        temp
    }

    #[test]
    fn test_discover_namespaces() {
        let temp = create_apps_dir();
        let namespaces = discover_namespaces(temp.path(), "kustomization.yaml").unwrap();

        let names: Vec<&str> = namespaces.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["monitoring", "web"]);
        assert_eq!(namespaces["web"].dir, temp.path().join("web"));
    }

    #[test]
    fn test_custom_kustomization_file() {
        let temp = create_apps_dir();
        fs::write(temp.path().join("web/ns.yaml"), "namespace: frontend\n").unwrap();

        let namespaces = discover_namespaces(temp.path(), "ns.yaml").unwrap();
        assert_eq!(namespaces.len(), 1);
        assert!(namespaces.contains_key("frontend"));
    }

    #[test]
    fn test_missing_app_dir() {
        let temp = TempDir::new().unwrap();
        let result = discover_namespaces(&temp.path().join("nope"), "kustomization.yaml");
        assert!(matches!(result, Err(CoreError::AppDirNotFound { .. })));
    }
}
