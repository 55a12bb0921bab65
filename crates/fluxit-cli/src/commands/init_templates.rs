//! Init-templates command - write the bundled template set to disk

use clap::Args;
use console::style;
use std::path::{Path, PathBuf};

use fluxit_core::{ConfirmPolicy, FluxitConfig};
use fluxit_engine::{BUILTIN_TEMPLATE, RunSummary, TemplateSet, WriteEngine};

use crate::error::Result;
use crate::prompt::{TerminalConfirm, has_terminal};

#[derive(Args, Debug, Default)]
pub struct InitTemplatesArgs {
    /// Directory the template set is written into [default: .templates/fluxit]
    #[arg(long, env = "FLUXIT_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,

    /// Name of the template set directory [default: app_template]
    #[arg(long, env = "FLUXIT_TEMPLATE")]
    pub template: Option<String>,

    /// When to ask before writing: always, never, if_exists [default: if_exists]
    #[arg(long, env = "FLUXIT_CONFIRM")]
    pub confirm: Option<ConfirmPolicy>,

    /// Never prompt
    #[arg(long, env = "FLUXIT_NO_INPUT")]
    pub no_input: bool,
}

pub fn run(args: &InitTemplatesArgs, config: &FluxitConfig) -> Result<()> {
    let dir = args
        .template_dir
        .clone()
        .unwrap_or_else(|| config.template_dir.clone());
    let name = args.template.as_deref().unwrap_or(&config.template);
    let root = dir.join(name);

    let set = TemplateSet::builtin()?;
    tracing::info!("Writing template set {} to {}", BUILTIN_TEMPLATE, root.display());

    let writer = WriteEngine::new(&root, args.confirm.unwrap_or(config.confirm));
    let mut confirm = TerminalConfirm::new(!args.no_input && has_terminal());

    let mut summary = RunSummary::default();
    for (path, content) in set.files() {
        let result = writer.apply(Path::new(path), content, &mut confirm)?;
        summary.results.push(result);
    }

    super::finish(&summary)?;
    println!(
        "\nUse it with: {}",
        style(format!(
            "fluxit new --template-dir {} --template {}",
            dir.display(),
            name
        ))
        .cyan()
    );

    Ok(())
}
