//! Scaffold orchestration: resolve, render, diff and write, one file at a time

use std::path::{Path, PathBuf};

use fluxit_core::{AppParams, ConfirmPolicy};

use crate::engine::{Engine, Rendered};
use crate::error::Result;
use crate::template_set::TemplateSet;
use crate::writer::{Confirm, Disposition, RenderResult, WriteEngine};

/// Results of one scaffold run, in processing order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<RenderResult>,
}

impl RunSummary {
    pub fn count(&self, disposition: Disposition) -> usize {
        self.results
            .iter()
            .filter(|r| r.disposition == disposition)
            .count()
    }

    /// `false` when some file could not be confirmed
    pub fn is_success(&self) -> bool {
        self.count(Disposition::SkippedNoConfirmation) == 0
    }

    /// One line, e.g. `2 written, 1 unchanged`
    pub fn summary(&self) -> String {
        let parts: Vec<String> = Disposition::ALL
            .iter()
            .map(|d| (self.count(*d), d))
            .filter(|(count, _)| *count > 0)
            .map(|(count, d)| {
                let label = match d {
                    Disposition::Written => "written",
                    Disposition::SkippedUnchanged => "unchanged",
                    Disposition::SkippedByUser => "skipped by user",
                    Disposition::SkippedNoConfirmation => "awaiting confirmation",
                };
                format!("{} {}", count, label)
            })
            .collect();

        if parts.is_empty() {
            "nothing to do".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Runs a template set against an output root
pub struct Scaffolder<'a> {
    set: &'a TemplateSet,
    engine: Engine,
    writer: WriteEngine,
}

impl<'a> Scaffolder<'a> {
    pub fn new(set: &'a TemplateSet, output_root: impl Into<PathBuf>, policy: ConfirmPolicy) -> Result<Self> {
        Ok(Self {
            set,
            engine: Engine::new(set)?,
            writer: WriteEngine::new(output_root, policy),
        })
    }

    pub fn output_root(&self) -> &Path {
        self.writer.root()
    }

    /// Render and write every included template.
    ///
    /// Stops at the first error; files written before it are kept.
    pub fn run(&self, params: &AppParams, confirm: &mut dyn Confirm) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for descriptor in self.set.resolve(params) {
            match self.engine.render(descriptor, params)? {
                Rendered::Skipped { template_path } => {
                    tracing::debug!("Template {} rendered nothing, skipping", template_path);
                }
                Rendered::File(file) => {
                    let result = self.writer.apply(&file.output_path, &file.content, confirm)?;
                    summary.results.push(result);
                }
            }
        }

        Ok(summary)
    }
}
