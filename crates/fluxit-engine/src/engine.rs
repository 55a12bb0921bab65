//! Template engine based on MiniJinja

use minijinja::{Environment, UndefinedBehavior};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use fluxit_core::{AppParams, TemplateContext};

use crate::error::{undefined_name, EngineError, Result, TemplateError};
use crate::filters;
use crate::path_guard;
use crate::suggestions::suggest_parameter;
use crate::template_set::{TemplateDescriptor, TemplateSet};

/// Rendered content that asks to be left out of the output
pub const SKIP_SENTINEL: &str = "__SKIP__";

/// Parameters that may appear in output paths
const PATH_PARAMETERS: &[&str] = &["namespace", "app_name"];

/// A template rendered to its final path and content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub template_path: String,
    /// Relative to the apps directory
    pub output_path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    File(RenderedFile),
    /// Rendered to nothing, `---` or the skip sentinel
    Skipped { template_path: String },
}

/// The template engine
pub struct Engine {
    env: Environment<'static>,
}

impl Engine {
    /// Create an engine with the helpers of `set` available to `include` and `import`
    pub fn new(set: &TemplateSet) -> Result<Self> {
        let mut env = Self::create_environment();

        for (path, source) in set.helpers() {
            env.add_template_owned(path.to_string(), source.to_string())
                .map_err(|e| TemplateError::from_minijinja(&e, path, source))?;
        }

        Ok(Self { env })
    }

    fn create_environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        // Source ranges on errors name the undefined parameter
        env.set_debug(true);
        env.set_keep_trailing_newline(true);

        env.add_filter("toyaml", filters::toyaml);
        env.add_filter("b64encode", filters::b64encode);
        env.add_filter("quote", filters::quote);
        env.add_filter("squote", filters::squote);
        env.add_filter("nindent", filters::nindent);
        env.add_filter("indent", filters::indent);
        env.add_filter("kebabcase", filters::kebabcase);

        env
    }

    /// Render a template string against `params`
    pub fn render_string(&self, name: &str, source: &str, params: &AppParams) -> Result<String> {
        let context = TemplateContext::from_params(params);
        self.env
            .render_named_str(name, source, context.to_json())
            .map_err(|e| map_render_error(&e, name, source, &context))
    }

    /// Render the output path and content of one template
    pub fn render(&self, descriptor: &TemplateDescriptor, params: &AppParams) -> Result<Rendered> {
        let output_path = self.render_output_path(descriptor, params)?;
        let content = self.render_string(&descriptor.template_path, &descriptor.source, params)?;

        let trimmed = content.trim();
        if trimmed.is_empty() || trimmed == "---" || trimmed == SKIP_SENTINEL {
            return Ok(Rendered::Skipped {
                template_path: descriptor.template_path.clone(),
            });
        }

        if is_yaml(&output_path) {
            validate_yaml(&output_path, &content)?;
        }

        Ok(Rendered::File(RenderedFile {
            template_path: descriptor.template_path.clone(),
            output_path,
            content,
        }))
    }

    fn render_output_path(&self, descriptor: &TemplateDescriptor, params: &AppParams) -> Result<PathBuf> {
        let context = TemplateContext::from_params(params);
        let values = context.to_json();
        for name in PATH_PARAMETERS {
            let value = values.get(*name).and_then(|v| v.as_str()).unwrap_or_default();
            path_guard::check_segment(name, value)?;
        }

        let name = format!("{} (output path)", descriptor.template_path);
        let rendered = self
            .env
            .render_named_str(&name, &descriptor.output_template, values)
            .map_err(|e| map_render_error(&e, &name, &descriptor.output_template, &context))?;

        let path = PathBuf::from(rendered.trim());
        path_guard::check_relative(&path)?;
        Ok(path)
    }
}

fn map_render_error(
    err: &minijinja::Error,
    template: &str,
    source: &str,
    context: &TemplateContext,
) -> EngineError {
    if err.kind() != minijinja::ErrorKind::UndefinedError {
        return TemplateError::from_minijinja(err, template, source).into();
    }

    let known = context.variable_names();
    let parameter = undefined_name(err, source, &known).unwrap_or_else(|| "<unknown>".to_string());
    let suggestion = suggest_parameter(&parameter, &known);

    EngineError::MissingParameter {
        template: template.to_string(),
        parameter,
        suggestion,
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Every document of a rendered file must parse
fn validate_yaml(path: &Path, content: &str) -> Result<()> {
    for document in serde_yaml::Deserializer::from_str(content) {
        serde_yaml::Value::deserialize(document).map_err(|e| EngineError::InvalidYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}
