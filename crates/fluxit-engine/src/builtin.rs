//! Template set embedded in the binary

use crate::error::Result;
use crate::template_set::TemplateSet;

/// Name of the embedded template set
pub const BUILTIN_TEMPLATE: &str = "app_template";

const FILES: &[(&str, &str)] = &[
    (
        "fluxit.yaml",
        include_str!("../templates/app_template/fluxit.yaml"),
    ),
    (
        "ks.yaml.j2",
        include_str!("../templates/app_template/ks.yaml.j2"),
    ),
    (
        "app/kustomization.yaml.j2",
        include_str!("../templates/app_template/app/kustomization.yaml.j2"),
    ),
    (
        "app/helmrelease.yaml.j2",
        include_str!("../templates/app_template/app/helmrelease.yaml.j2"),
    ),
    (
        "app/configmap.yaml.j2",
        include_str!("../templates/app_template/app/configmap.yaml.j2"),
    ),
    (
        "app/secret.sops.yaml.j2",
        include_str!("../templates/app_template/app/secret.sops.yaml.j2"),
    ),
];

impl TemplateSet {
    /// The default Flux app template set
    pub fn builtin() -> Result<Self> {
        Self::from_sources(BUILTIN_TEMPLATE, FILES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, Rendered};
    use fluxit_core::AppParams;

    fn render_all(params: &AppParams) -> Vec<(String, String)> {
        let set = TemplateSet::builtin().unwrap();
        let engine = Engine::new(&set).unwrap();
        set.resolve(params)
            .into_iter()
            .filter_map(|d| match engine.render(d, params).unwrap() {
                Rendered::File(f) => Some((f.output_path.to_string_lossy().to_string(), f.content)),
                Rendered::Skipped { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_builtin_loads() {
        let set = TemplateSet::builtin().unwrap();
        assert_eq!(set.name(), BUILTIN_TEMPLATE);
        assert_eq!(set.descriptors().len(), 5);
    }

    #[test]
    fn test_minimal_app() {
        let files = render_all(&AppParams::new("web", "nginx", "nginx", "1.25"));
        let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "web/nginx/app/helmrelease.yaml",
                "web/nginx/app/kustomization.yaml",
                "web/nginx/ks.yaml",
            ]
        );

        let kustomization = &files[1].1;
        assert!(kustomization.ends_with("  - ./helmrelease.yaml\n"));
    }

    #[test]
    fn test_full_app() {
        let params = AppParams::new("web", "nginx", "nginx", "1.25")
            .with_configmap(true)
            .with_secret(true)
            .with_ingress("nginx.example.com");
        let files = render_all(&params);
        assert_eq!(files.len(), 5);

        let get = |suffix: &str| {
            files
                .iter()
                .find(|(p, _)| p.ends_with(suffix))
                .map(|(_, c)| c.as_str())
                .unwrap()
        };

        assert!(get("app/kustomization.yaml").contains(
            "  - ./helmrelease.yaml\n  - ./configmap.yaml\n  - ./secret.sops.yaml\n"
        ));

        let release = get("app/helmrelease.yaml");
        assert!(release.contains("name: nginx-config"));
        assert!(release.contains("name: nginx-secret"));
        assert!(release.contains("- host: nginx.example.com"));

        let configmap = get("app/configmap.yaml");
        assert!(configmap.contains("  labels:\n    app.kubernetes.io/name: nginx\n"));
    }
}
