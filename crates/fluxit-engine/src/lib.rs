//! fluxit Engine - rendering and writing Flux app scaffolds
//!
//! This crate turns a template set and an [`AppParams`](fluxit_core::AppParams)
//! into files on disk:
//! - Template set loading with conditional file inclusion
//! - MiniJinja rendering with strict undefined handling
//! - Line diffs against existing files
//! - Confirmation-aware atomic writes

pub mod builtin;
pub mod diff;
pub mod engine;
pub mod error;
pub mod filters;
pub mod path_guard;
pub mod pipeline;
pub mod suggestions;
pub mod template_set;
pub mod writer;

pub use builtin::BUILTIN_TEMPLATE;
pub use diff::{DiffLine, DiffStats, FileDiff, Hunk, LineTag};
pub use engine::{Engine, Rendered, RenderedFile};
pub use error::{EngineError, Result, TemplateError, TemplateErrorKind};
pub use pipeline::{RunSummary, Scaffolder};
pub use template_set::{Condition, Inclusion, TemplateDescriptor, TemplateSet};
pub use writer::{
    Confirm, ConfirmRequest, Disposition, NonInteractive, RenderResult, WriteEngine, write_atomic,
};
