//! CLI error types with exit code handling
//!
//! Library errors are mapped onto a small set of diagnostics, each carrying
//! the exit code the process ends with.

use miette::Diagnostic;
use thiserror::Error;

use fluxit_core::CoreError;
use fluxit_engine::{EngineError, TemplateError};

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Invalid parameter, configuration or output path
    #[error("Validation failed: {message}")]
    #[diagnostic(code(fluxit::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A template referenced a parameter that does not exist
    #[error("Template error: {message}")]
    #[diagnostic(code(fluxit::cli::template))]
    Template {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Template failed to render, with source location
    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] TemplateError),

    /// Template set missing or malformed
    #[error("Template set error: {message}")]
    #[diagnostic(code(fluxit::cli::template_set))]
    TemplateSet {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(fluxit::cli::io))]
    Io { message: String },

    /// Files were skipped because nobody could confirm them
    #[error("{count} file(s) need confirmation but no terminal is attached")]
    #[diagnostic(
        code(fluxit::cli::unconfirmed),
        help("Run in a terminal, or pass `--confirm never` to write without asking")
    )]
    Unconfirmed { count: usize },

    #[error("Interrupted")]
    #[diagnostic(code(fluxit::cli::interrupted))]
    Interrupted,

    #[error("{message}")]
    #[diagnostic(code(fluxit::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Template { .. } | CliError::Render(_) => exit_codes::TEMPLATE_ERROR,
            CliError::TemplateSet { .. } => exit_codes::TEMPLATE_SET_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Unconfirmed { .. } => exit_codes::ERROR,
            CliError::Interrupted => exit_codes::INTERRUPTED,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Map a prompt failure; Ctrl-C becomes [`CliError::Interrupted`]
    pub fn prompt(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(e) if e.kind() == std::io::ErrorKind::Interrupted => {
                Self::Interrupted
            }
            other => Self::Io {
                message: format!("failed to read input: {}", other),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::Interrupted {
            return CliError::Interrupted;
        }
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidParameter { .. } => CliError::validation(err.to_string()),
            CoreError::AppDirNotFound { .. } => CliError::validation_with_help(
                err.to_string(),
                "Set the apps directory with `--k8s-app-dir` or `k8sAppDir` in .fluxit.yaml",
            ),
            CoreError::ConfigNotFound { .. } | CoreError::InvalidConfig { .. } => {
                CliError::validation(err.to_string())
            }
            CoreError::Io(e) => CliError::from(e),
            other => CliError::Other {
                message: other.to_string(),
            },
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::TemplateSetNotFound { .. } => CliError::TemplateSet {
                message: err.to_string(),
                help: Some(
                    "Run `fluxit init-templates` to create it, or pass `--builtin-template`"
                        .to_string(),
                ),
            },
            EngineError::InvalidTemplateSet { .. } => CliError::TemplateSet {
                message: err.to_string(),
                help: None,
            },
            EngineError::MissingParameter { ref suggestion, .. } => CliError::Template {
                help: suggestion.clone(),
                message: err.to_string(),
            },
            EngineError::InvalidYaml { .. } => CliError::Template {
                message: err.to_string(),
                help: Some("Check the indentation produced by the template".to_string()),
            },
            EngineError::Template(e) => CliError::Render(e),
            EngineError::UnsafeOutputPath { .. } => CliError::Validation {
                message: err.to_string(),
                help: Some(
                    "Namespaces and app names must be plain directory names".to_string(),
                ),
            },
            EngineError::Write { .. } | EngineError::Io { .. } => CliError::Io {
                message: err.to_string(),
            },
            EngineError::Interrupted => CliError::Interrupted,
            EngineError::Core(e) => CliError::from(e),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
