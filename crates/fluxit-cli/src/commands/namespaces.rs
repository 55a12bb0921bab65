//! Namespaces command - list the namespaces an app can be created in

use clap::Args;
use console::style;
use std::path::PathBuf;

use fluxit_core::{FluxitConfig, discover_namespaces};

use crate::error::Result;

#[derive(Args, Debug, Default)]
pub struct NamespacesArgs {
    /// Path to the Kubernetes apps directory [default: kubernetes/apps]
    #[arg(long, env = "FLUXIT_K8S_APP_DIR")]
    pub k8s_app_dir: Option<PathBuf>,
}

pub fn run(args: &NamespacesArgs, config: &FluxitConfig) -> Result<()> {
    let apps_dir = args
        .k8s_app_dir
        .clone()
        .unwrap_or_else(|| config.k8s_app_dir.clone());
    let namespaces = discover_namespaces(&apps_dir, &config.ns_kustomization_file)?;

    if namespaces.is_empty() {
        println!("No namespaces found in {}", apps_dir.display());
        return Ok(());
    }

    for (name, entry) in &namespaces {
        println!(
            "{}  {}",
            style(name).cyan().bold(),
            style(entry.dir.display()).dim()
        );
    }

    Ok(())
}
