//! New command - scaffold a Flux application

use clap::Args;
use std::path::{Path, PathBuf};

use fluxit_core::params::{
    default_ingress_host, normalize_app_name, validate_dns_label, validate_dns_subdomain,
};
use fluxit_core::{
    AppParams, ConfirmPolicy, CoreError, DeploymentStrategy, FluxitConfig, IngressType,
    discover_namespaces,
};
use fluxit_engine::{Scaffolder, TemplateSet};

use crate::error::{CliError, Result};
use crate::prompt::{Prompter, TerminalConfirm};

#[derive(Args, Debug, Default)]
pub struct NewArgs {
    /// Path to the Kubernetes apps directory [default: kubernetes/apps]
    #[arg(long, env = "FLUXIT_K8S_APP_DIR")]
    pub k8s_app_dir: Option<PathBuf>,

    /// Directory containing template sets [default: .templates/fluxit]
    #[arg(long, env = "FLUXIT_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,

    /// Template set within the template directory [default: app_template]
    #[arg(long, env = "FLUXIT_TEMPLATE")]
    pub template: Option<String>,

    /// Use the template set bundled with fluxit
    #[arg(long, env = "FLUXIT_BUILTIN_TEMPLATE", conflicts_with_all = ["template_dir", "template"])]
    pub builtin_template: bool,

    /// Namespace the application is created in
    #[arg(long = "ns", env = "FLUXIT_NS")]
    pub namespace: Option<String>,

    /// Application name
    #[arg(long, env = "FLUXIT_APP_NAME")]
    pub app_name: Option<String>,

    /// Ingress type: disabled, http
    #[arg(long = "ingress", env = "FLUXIT_INGRESS")]
    pub ingress_type: Option<IngressType>,

    /// Hostname for the ingress [default: the app name]
    #[arg(long, env = "FLUXIT_INGRESS_HOST")]
    pub ingress_host: Option<String>,

    /// Service port [default: 80]
    #[arg(long, env = "FLUXIT_SERVICE_PORT")]
    pub service_port: Option<u16>,

    /// Container image repository
    #[arg(long, env = "FLUXIT_IMAGE_REPO")]
    pub image_repo: Option<String>,

    /// Container image tag
    #[arg(long, env = "FLUXIT_IMAGE_TAG")]
    pub image_tag: Option<String>,

    /// When to ask before writing: always, never, if_exists [default: if_exists]
    #[arg(long, env = "FLUXIT_CONFIRM")]
    pub confirm: Option<ConfirmPolicy>,

    /// Pod deployment strategy: RollingUpdate, Recreate [default: RollingUpdate]
    #[arg(long, env = "FLUXIT_DEPLOYMENT_STRATEGY")]
    pub deployment_strategy: Option<DeploymentStrategy>,

    /// Number of pod replicas [default: 1]
    #[arg(long, env = "FLUXIT_REPLICAS")]
    pub replicas: Option<u32>,

    /// Include a ConfigMap
    #[arg(long = "include-cm", env = "FLUXIT_INCLUDE_CM", overrides_with = "no_include_cm")]
    pub include_cm: bool,

    /// Do not include a ConfigMap
    #[arg(long = "no-include-cm", overrides_with = "include_cm")]
    pub no_include_cm: bool,

    /// Include a Secret
    #[arg(long, env = "FLUXIT_INCLUDE_SECRET", overrides_with = "no_include_secret")]
    pub include_secret: bool,

    /// Do not include a Secret
    #[arg(long, overrides_with = "include_secret")]
    pub no_include_secret: bool,

    /// Never prompt; missing values are an error
    #[arg(long, env = "FLUXIT_NO_INPUT")]
    pub no_input: bool,
}

pub fn run(args: &NewArgs, config: &FluxitConfig) -> Result<()> {
    let apps_dir = args
        .k8s_app_dir
        .clone()
        .unwrap_or_else(|| config.k8s_app_dir.clone());
    if !apps_dir.is_dir() {
        return Err(CoreError::AppDirNotFound {
            path: apps_dir.display().to_string(),
        }
        .into());
    }

    let set = load_template_set(args, config)?;
    tracing::info!("Using template set: {}", set.origin().display());

    let prompter = Prompter::new(args.no_input);
    let params = resolve_params(args, config, &apps_dir, &prompter)?;
    tracing::info!(
        "Target directory: {}",
        apps_dir.join(&params.namespace).join(&params.app_name).display()
    );

    let policy = args.confirm.unwrap_or(config.confirm);
    let scaffolder = Scaffolder::new(&set, &apps_dir, policy)?;
    let mut confirm = TerminalConfirm::new(prompter.is_interactive());
    let summary = scaffolder.run(&params, &mut confirm)?;

    super::finish(&summary)
}

fn load_template_set(args: &NewArgs, config: &FluxitConfig) -> Result<TemplateSet> {
    if args.builtin_template {
        return Ok(TemplateSet::builtin()?);
    }

    let dir = args
        .template_dir
        .clone()
        .unwrap_or_else(|| config.template_dir.clone());
    let name = args.template.as_deref().unwrap_or(&config.template);
    Ok(TemplateSet::load(&dir.join(name))?)
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn check<T>(result: fluxit_core::Result<T>) -> std::result::Result<(), String> {
    result.map(|_| ()).map_err(|e| e.to_string())
}

/// Fill the parameter set from flags, configuration and prompts
pub fn resolve_params(
    args: &NewArgs,
    config: &FluxitConfig,
    apps_dir: &Path,
    prompter: &Prompter,
) -> Result<AppParams> {
    let namespace = match &args.namespace {
        Some(ns) => ns.trim().to_string(),
        None => prompt_namespace(config, apps_dir, prompter)?,
    };

    let app_name = match &args.app_name {
        Some(name) => normalize_app_name(name),
        None => normalize_app_name(&prompter.text("app-name", "Application name", None, |v| {
            check(validate_dns_label("app_name", &normalize_app_name(v)))
        })?),
    };

    let ingress_type = match args.ingress_type {
        Some(ingress) => ingress,
        None => prompter.select("ingress", "Ingress type", &IngressType::ALL, Some(0))?,
    };

    let ingress_host = if ingress_type.is_enabled() {
        let host = match &args.ingress_host {
            Some(host) => host.trim().to_string(),
            None => prompter.text(
                "ingress-host",
                "App ingress hostname",
                Some(default_ingress_host(&app_name)),
                |v| check(validate_dns_subdomain("ingress_host", v)),
            )?,
        };
        Some(host)
    } else {
        None
    };

    let image_repo = match &args.image_repo {
        Some(repo) => repo.trim().to_string(),
        None => prompter.text("image-repo", "Container image repository", None, |v| {
            if v.is_empty() {
                Err("must not be empty".to_string())
            } else {
                Ok(())
            }
        })?,
    };

    let image_tag = match &args.image_tag {
        Some(tag) => tag.trim().to_string(),
        None => prompter.text("image-tag", "Container image tag", None, |v| {
            if v.is_empty() || v.chars().any(char::is_whitespace) {
                Err("must be a single word".to_string())
            } else {
                Ok(())
            }
        })?,
    };

    let include_configmap = match flag_pair(args.include_cm, args.no_include_cm) {
        Some(include) => include,
        None => prompter.confirm("Include a ConfigMap template?", false)?,
    };
    let include_secret = match flag_pair(args.include_secret, args.no_include_secret) {
        Some(include) => include,
        None => prompter.confirm("Include a Secret template?", false)?,
    };

    let params = AppParams {
        namespace,
        app_name,
        ingress_type,
        ingress_host,
        service_port: args.service_port.unwrap_or(config.service_port),
        image_repo,
        image_tag,
        deployment_strategy: args
            .deployment_strategy
            .unwrap_or(config.deployment_strategy),
        replicas: args.replicas.unwrap_or(config.replicas),
        include_configmap,
        include_secret,
    };
    params.validate()?;

    Ok(params)
}

fn prompt_namespace(config: &FluxitConfig, apps_dir: &Path, prompter: &Prompter) -> Result<String> {
    if !prompter.is_interactive() {
        return prompter.text("ns", "Namespace", None, |_| Ok(()));
    }

    let namespaces = discover_namespaces(apps_dir, &config.ns_kustomization_file)?;
    let names: Vec<String> = namespaces.into_keys().collect();
    if names.is_empty() {
        return Err(CliError::validation_with_help(
            format!("No namespaces found in {}", apps_dir.display()),
            format!(
                "Add a namespace directory with a {} declaring `namespace:`, or pass `--ns`",
                config.ns_kustomization_file
            ),
        ));
    }

    prompter.select("ns", "Namespace", &names, Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_args() -> NewArgs {
        NewArgs {
            namespace: Some("web".to_string()),
            app_name: Some(" Nginx ".to_string()),
            image_repo: Some("nginx".to_string()),
            image_tag: Some("1.25".to_string()),
            no_input: true,
            ..NewArgs::default()
        }
    }

    fn resolve(args: &NewArgs) -> Result<AppParams> {
        let config = FluxitConfig::default();
        resolve_params(args, &config, Path::new("."), &Prompter::new(true))
    }

    #[test]
    fn test_resolve_with_defaults() {
        let params = resolve(&complete_args()).unwrap();

        assert_eq!(params.app_name, "nginx");
        assert_eq!(params.ingress_type, IngressType::Disabled);
        assert_eq!(params.ingress_host, None);
        assert_eq!(params.replicas, 1);
        assert_eq!(params.service_port, 80);
        assert!(!params.include_configmap);
    }

    #[test]
    fn test_ingress_host_defaults_to_app_name() {
        let args = NewArgs {
            ingress_type: Some(IngressType::Http),
            ..complete_args()
        };
        let params = resolve(&args).unwrap();
        assert_eq!(params.ingress_host.as_deref(), Some("nginx"));
    }

    #[test]
    fn test_flags_override_config() {
        let args = NewArgs {
            replicas: Some(2),
            deployment_strategy: Some(DeploymentStrategy::Recreate),
            include_cm: true,
            no_include_secret: true,
            ..complete_args()
        };
        let params = resolve(&args).unwrap();
        assert_eq!(params.replicas, 2);
        assert_eq!(params.deployment_strategy, DeploymentStrategy::Recreate);
        assert!(params.include_configmap);
        assert!(!params.include_secret);
    }

    #[test]
    fn test_missing_namespace_without_input() {
        let args = NewArgs {
            namespace: None,
            ..complete_args()
        };
        let err = resolve(&args).unwrap_err();
        assert!(err.to_string().contains("--ns"));
    }

    #[test]
    fn test_invalid_app_name() {
        let args = NewArgs {
            app_name: Some("../../etc".to_string()),
            ..complete_args()
        };
        assert!(matches!(resolve(&args), Err(CliError::Validation { .. })));
    }

    #[test]
    fn test_flag_pair() {
        assert_eq!(flag_pair(true, false), Some(true));
        assert_eq!(flag_pair(false, true), Some(false));
        assert_eq!(flag_pair(false, false), None);
    }
}
