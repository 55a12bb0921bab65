//! Application parameters for a scaffold run

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// RFC 1123 label: namespaces and app names become directory names and resource names
static DNS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

/// RFC 1123 subdomain, used for ingress hosts
static DNS_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("valid regex")
});

const MAX_LABEL_LEN: usize = 63;
const MAX_SUBDOMAIN_LEN: usize = 253;

/// How the application is exposed outside the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngressType {
    #[default]
    Disabled,
    Http,
}

impl IngressType {
    pub const ALL: [IngressType; 2] = [IngressType::Disabled, IngressType::Http];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Http => "http",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl fmt::Display for IngressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngressType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "http" => Ok(Self::Http),
            other => Err(CoreError::invalid(
                "ingress_type",
                format!("unknown ingress type '{}', expected one of: disabled, http", other),
            )),
        }
    }
}

/// Pod replacement strategy of the generated workload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStrategy {
    Recreate,
    #[default]
    RollingUpdate,
}

impl DeploymentStrategy {
    pub const ALL: [DeploymentStrategy; 2] =
        [DeploymentStrategy::RollingUpdate, DeploymentStrategy::Recreate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recreate => "Recreate",
            Self::RollingUpdate => "RollingUpdate",
        }
    }
}

impl fmt::Display for DeploymentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "recreate" => Ok(Self::Recreate),
            "rollingupdate" | "rolling-update" | "rolling_update" => Ok(Self::RollingUpdate),
            other => Err(CoreError::invalid(
                "deployment_strategy",
                format!(
                    "unknown strategy '{}', expected one of: Recreate, RollingUpdate",
                    other
                ),
            )),
        }
    }
}

/// Every value needed to render one application scaffold.
///
/// Field names are the variable names seen by templates. The prompt layer is
/// expected to call [`AppParams::validate`] before handing the value to the
/// pipeline; the pipeline itself only relies on its path guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppParams {
    pub namespace: String,
    pub app_name: String,
    pub ingress_type: IngressType,
    pub ingress_host: Option<String>,
    pub service_port: u16,
    pub image_repo: String,
    pub image_tag: String,
    pub deployment_strategy: DeploymentStrategy,
    pub replicas: u32,
    pub include_configmap: bool,
    pub include_secret: bool,
}

impl AppParams {
    /// Parameters with defaults for everything but the required identifiers
    pub fn new(
        namespace: impl Into<String>,
        app_name: impl Into<String>,
        image_repo: impl Into<String>,
        image_tag: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            app_name: app_name.into(),
            ingress_type: IngressType::Disabled,
            ingress_host: None,
            service_port: 80,
            image_repo: image_repo.into(),
            image_tag: image_tag.into(),
            deployment_strategy: DeploymentStrategy::default(),
            replicas: 1,
            include_configmap: false,
            include_secret: false,
        }
    }

    /// Enable an HTTP ingress for `host`
    pub fn with_ingress(mut self, host: impl Into<String>) -> Self {
        self.ingress_type = IngressType::Http;
        self.ingress_host = Some(host.into());
        self
    }

    pub fn without_ingress(mut self) -> Self {
        self.ingress_type = IngressType::Disabled;
        self.ingress_host = None;
        self
    }

    pub fn with_service_port(mut self, port: u16) -> Self {
        self.service_port = port;
        self
    }

    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn with_strategy(mut self, strategy: DeploymentStrategy) -> Self {
        self.deployment_strategy = strategy;
        self
    }

    pub fn with_configmap(mut self, include: bool) -> Self {
        self.include_configmap = include;
        self
    }

    pub fn with_secret(mut self, include: bool) -> Self {
        self.include_secret = include;
        self
    }

    pub fn ingress_enabled(&self) -> bool {
        self.ingress_type.is_enabled()
    }

    /// Check every invariant of the parameter set
    pub fn validate(&self) -> Result<()> {
        validate_dns_label("namespace", &self.namespace)?;
        validate_dns_label("app_name", &self.app_name)?;

        if self.ingress_enabled() {
            let host = self.ingress_host.as_deref().unwrap_or_default();
            if host.is_empty() {
                return Err(CoreError::invalid(
                    "ingress_host",
                    format!("required when ingress type is '{}'", self.ingress_type),
                ));
            }
            validate_dns_subdomain("ingress_host", host)?;
        }

        if self.image_repo.trim().is_empty() {
            return Err(CoreError::invalid("image_repo", "must not be empty"));
        }
        if self.image_tag.trim().is_empty() {
            return Err(CoreError::invalid("image_tag", "must not be empty"));
        }
        if self.image_tag.chars().any(char::is_whitespace) {
            return Err(CoreError::invalid("image_tag", "must not contain whitespace"));
        }
        if self.service_port == 0 {
            return Err(CoreError::invalid("service_port", "must be between 1 and 65535"));
        }

        Ok(())
    }
}

/// Check that `value` is usable as a namespace or app name
pub fn validate_dns_label(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(CoreError::invalid(name, "must not be empty"));
    }
    if value.len() > MAX_LABEL_LEN {
        return Err(CoreError::invalid(
            name,
            format!("must be at most {} characters", MAX_LABEL_LEN),
        ));
    }
    if !DNS_LABEL.is_match(value) {
        return Err(CoreError::invalid(
            name,
            format!(
                "'{}' must consist of lowercase letters, digits and '-', and start and end with a letter or digit",
                value
            ),
        ));
    }
    Ok(())
}

/// Check that `value` is usable as a host name
pub fn validate_dns_subdomain(name: &str, value: &str) -> Result<()> {
    if value.len() > MAX_SUBDOMAIN_LEN || !DNS_SUBDOMAIN.is_match(value) {
        return Err(CoreError::invalid(
            name,
            format!("'{}' is not a valid DNS name", value),
        ));
    }
    Ok(())
}

/// Normalize user input for an app name (trimmed, lowercase)
#[must_use]
pub fn normalize_app_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Ingress host proposed for an app when none is given
///
/// A valid app name is a DNS label, so it is also a valid host.
#[must_use]
pub fn default_ingress_host(app_name: &str) -> String {
    app_name.to_string()
}
