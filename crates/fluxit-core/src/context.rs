//! Template rendering context

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::params::AppParams;

/// Context available to all templates.
///
/// Parameters are exposed as top-level variables (`{{ app_name }}`), together
/// with values derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    #[serde(flatten)]
    pub params: AppParams,

    /// `true` unless `ingress_type` is `disabled`
    pub ingress_enabled: bool,
}

impl TemplateContext {
    pub fn from_params(params: &AppParams) -> Self {
        Self {
            params: params.clone(),
            ingress_enabled: params.ingress_enabled(),
        }
    }

    /// Names of every variable a template can reference
    pub fn variable_names(&self) -> Vec<String> {
        match self.to_json() {
            JsonValue::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Convert to minijinja-compatible context
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_context() {
        let params = AppParams::new("web", "nginx", "nginx", "1.25").with_ingress("nginx");
        let ctx = TemplateContext::from_params(&params);
        let json = ctx.to_json();

        assert_eq!(json["app_name"], "nginx");
        assert_eq!(json["namespace"], "web");
        assert_eq!(json["ingress_enabled"], true);
        assert_eq!(json["replicas"], 1);
    }

    #[test]
    fn test_variable_names() {
        let params = AppParams::new("web", "nginx", "nginx", "1.25");
        let names = TemplateContext::from_params(&params).variable_names();

        assert!(names.contains(&"include_configmap".to_string()));
        assert!(names.contains(&"ingress_enabled".to_string()));
        assert!(!names.contains(&"params".to_string()));
    }
}
