//! Template set loading and resolution
//!
//! A template set is a directory of `*.j2` files mirroring the layout that
//! should appear under `<apps dir>/<namespace>/<app_name>/`:
//!
//! ```text
//! app_template/
//! ├── fluxit.yaml              # optional manifest
//! ├── _helpers.j2              # helper, never rendered to output
//! ├── ks.yaml.j2
//! └── app/
//!     ├── configmap.yaml.j2
//!     └── helmrelease.yaml.j2
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use fluxit_core::AppParams;

use crate::error::{EngineError, Result};

/// Manifest file name at the root of a template set
pub const MANIFEST_FILE: &str = "fluxit.yaml";

/// Output prefix used when the manifest does not set one
pub const DEFAULT_OUTPUT: &str = "{{ namespace }}/{{ app_name }}";

/// Extension marking a renderable template
pub const TEMPLATE_EXTENSION: &str = ".j2";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Manifest {
    output: Option<String>,
    files: IndexMap<String, FileRule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileRule {
    when: Option<String>,
}

/// Parameter-derived predicate deciding whether a template is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    IncludeConfigMap,
    IncludeSecret,
    IngressEnabled,
    Not(Box<Condition>),
}

impl Condition {
    pub fn evaluate(&self, params: &AppParams) -> bool {
        match self {
            Self::IncludeConfigMap => params.include_configmap,
            Self::IncludeSecret => params.include_secret,
            Self::IngressEnabled => params.ingress_enabled(),
            Self::Not(inner) => !inner.evaluate(params),
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix('!') {
            return Ok(Self::Not(Box::new(rest.parse()?)));
        }
        match s {
            "include_configmap" => Ok(Self::IncludeConfigMap),
            "include_secret" => Ok(Self::IncludeSecret),
            "ingress_enabled" => Ok(Self::IngressEnabled),
            other => Err(format!(
                "unknown condition '{}', expected one of: include_configmap, include_secret, ingress_enabled",
                other
            )),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncludeConfigMap => f.write_str("include_configmap"),
            Self::IncludeSecret => f.write_str("include_secret"),
            Self::IngressEnabled => f.write_str("ingress_enabled"),
            Self::Not(inner) => write!(f, "!{}", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    Required,
    ConditionalOn(Condition),
}

impl Inclusion {
    pub fn is_included(&self, params: &AppParams) -> bool {
        match self {
            Self::Required => true,
            Self::ConditionalOn(condition) => condition.evaluate(params),
        }
    }
}

/// One renderable template of a set
#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    /// Path relative to the set root, `/`-separated
    pub template_path: String,
    /// Parameterized output path, relative to the apps directory
    pub output_template: String,
    pub inclusion: Inclusion,
    pub source: String,
}

/// A loaded template set
#[derive(Debug, Clone)]
pub struct TemplateSet {
    name: String,
    origin: PathBuf,
    files: BTreeMap<String, String>,
    helpers: Vec<String>,
    descriptors: Vec<TemplateDescriptor>,
}

/// Manifest, helper or template; everything else in a set directory is skipped
fn is_set_file(name: &str) -> bool {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    name == MANIFEST_FILE || file_name.starts_with('_') || name.ends_with(TEMPLATE_EXTENSION)
}

impl TemplateSet {
    /// Load a template set from a directory
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(EngineError::TemplateSetNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                if e.depth() == 0 {
                    tracing::debug!("Cannot read template set root: {}", e);
                    EngineError::TemplateSetNotFound {
                        path: root.to_path_buf(),
                    }
                } else {
                    EngineError::InvalidTemplateSet {
                        path: root.to_path_buf(),
                        message: e.to_string(),
                    }
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let rel_path = path.strip_prefix(root).unwrap_or(path);
            let name = rel_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if !is_set_file(&name) {
                tracing::debug!("Ignoring non-template file {}", path.display());
                continue;
            }
            let content =
                std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
            files.push((name, content));
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());

        Self::build(name, root.to_path_buf(), files)
    }

    /// Build a template set from in-memory `(relative path, content)` pairs
    pub fn from_sources<I, P, C>(name: &str, files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let files = files
            .into_iter()
            .map(|(p, c)| (p.into(), c.into()))
            .collect();
        Self::build(name.to_string(), PathBuf::from(name), files)
    }

    fn build(name: String, origin: PathBuf, files: Vec<(String, String)>) -> Result<Self> {
        let invalid = |message: String| EngineError::InvalidTemplateSet {
            path: origin.clone(),
            message,
        };

        let files: BTreeMap<String, String> = files.into_iter().collect();

        let manifest: Manifest = match files.get(MANIFEST_FILE) {
            Some(text) if !text.trim().is_empty() => serde_yaml::from_str(text)
                .map_err(|e| invalid(format!("{}: {}", MANIFEST_FILE, e)))?,
            _ => Manifest::default(),
        };

        for listed in manifest.files.keys() {
            if !files.contains_key(listed) {
                return Err(invalid(format!(
                    "{} lists `{}` which is not in the template set",
                    MANIFEST_FILE, listed
                )));
            }
        }

        let prefix = manifest
            .output
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
        let prefix = prefix.trim().trim_end_matches('/');

        let mut helpers = Vec::new();
        let mut descriptors = Vec::new();

        for (path, source) in &files {
            if path == MANIFEST_FILE {
                continue;
            }
            let file_name = path.rsplit('/').next().unwrap_or(path);
            if file_name.starts_with('_') {
                helpers.push(path.clone());
                continue;
            }
            let Some(output_rel) = path.strip_suffix(TEMPLATE_EXTENSION) else {
                tracing::debug!("Ignoring non-template file {} in {}", path, name);
                continue;
            };

            let inclusion = match manifest.files.get(path).and_then(|rule| rule.when.as_deref()) {
                Some(when) => Inclusion::ConditionalOn(
                    when.parse::<Condition>()
                        .map_err(|e| invalid(format!("{}: {}", path, e)))?,
                ),
                None => Inclusion::Required,
            };

            let output_template = if prefix.is_empty() {
                output_rel.to_string()
            } else {
                format!("{}/{}", prefix, output_rel)
            };

            descriptors.push(TemplateDescriptor {
                template_path: path.clone(),
                output_template,
                inclusion,
                source: source.clone(),
            });
        }

        if descriptors.is_empty() {
            return Err(invalid(format!(
                "no `*{}` templates found",
                TEMPLATE_EXTENSION
            )));
        }

        Ok(Self {
            name,
            origin,
            files,
            helpers,
            descriptors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the set was loaded from, or its name for in-memory sets
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Every template, in lexical order
    pub fn descriptors(&self) -> &[TemplateDescriptor] {
        &self.descriptors
    }

    /// Helper templates as `(path, source)`
    pub fn helpers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.helpers
            .iter()
            .filter_map(|path| self.files.get_key_value(path))
            .map(|(p, s)| (p.as_str(), s.as_str()))
    }

    /// Files of the set as `(path, source)`
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    /// Templates to render for `params`, in lexical order
    pub fn resolve(&self, params: &AppParams) -> Vec<&TemplateDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| {
                let included = d.inclusion.is_included(params);
                if !included {
                    tracing::debug!("Excluding {} for {}", d.template_path, params.app_name);
                }
                included
            })
            .collect()
    }
}
