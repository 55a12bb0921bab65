//! Interactive input
//!
//! Values missing from the command line are asked for when a terminal is
//! attached. Without one (or with `--no-input`) a missing value is an error.

use dialoguer::{Confirm as ConfirmPrompt, Input, Select};
use std::fmt::Display;
use std::io::{self, IsTerminal};

use fluxit_engine::{Confirm, ConfirmRequest};

use crate::display::DiffRenderer;
use crate::error::{CliError, Result};

/// Whether both stdin and stdout are terminals
pub fn has_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Asks for missing parameter values
pub struct Prompter {
    interactive: bool,
}

impl Prompter {
    pub fn new(no_input: bool) -> Self {
        Self {
            interactive: !no_input && has_terminal(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Ask for a text value, checked with `validate` before it is accepted
    pub fn text<V>(&self, flag: &str, prompt: &str, default: Option<String>, validate: V) -> Result<String>
    where
        V: Fn(&str) -> std::result::Result<(), String>,
    {
        if !self.interactive {
            return match default {
                Some(value) => Ok(value),
                None => Err(missing(flag)),
            };
        }

        let mut input = Input::<String>::new()
            .with_prompt(prompt)
            .validate_with(|value: &String| validate(value.trim()));
        if let Some(default) = default {
            input = input.default(default);
        }
        input
            .interact_text()
            .map(|value| value.trim().to_string())
            .map_err(CliError::prompt)
    }

    /// Pick one of `items`
    pub fn select<T: Clone + Display>(&self, flag: &str, prompt: &str, items: &[T], default: Option<usize>) -> Result<T> {
        if !self.interactive || items.is_empty() {
            return default
                .and_then(|index| items.get(index).cloned())
                .ok_or_else(|| missing(flag));
        }

        let labels: Vec<String> = items.iter().map(ToString::to_string).collect();
        let selection = Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(default.unwrap_or(0))
            .interact_opt()
            .map_err(CliError::prompt)?;

        // Esc or q
        let index = selection.ok_or(CliError::Interrupted)?;
        Ok(items[index].clone())
    }

    /// Yes/no question
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if !self.interactive {
            return Ok(default);
        }

        ConfirmPrompt::new()
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map_err(CliError::prompt)?
            .ok_or(CliError::Interrupted)
    }
}

fn missing(flag: &str) -> CliError {
    CliError::validation_with_help(
        format!("missing required value for `--{}`", flag),
        format!(
            "Pass `--{}` (or set FLUXIT_{}), or run in a terminal to be prompted",
            flag,
            flag.replace('-', "_").to_uppercase()
        ),
    )
}

/// Confirms writes on the terminal, showing the diff first
pub struct TerminalConfirm {
    renderer: DiffRenderer,
    interactive: bool,
}

impl TerminalConfirm {
    pub fn new(interactive: bool) -> Self {
        Self {
            renderer: DiffRenderer::new(),
            interactive,
        }
    }
}

impl Confirm for TerminalConfirm {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> io::Result<bool> {
        self.renderer.render_request(request)?;

        let message = if request.exists {
            format!(
                "File exists. Overwrite {} with the changes shown above?",
                request.destination.display()
            )
        } else {
            format!("Save file {}?", request.destination.display())
        };

        let answer = ConfirmPrompt::new()
            .with_prompt(message)
            .default(true)
            .interact_opt()
            .map_err(into_io)?;

        answer.ok_or_else(|| io::Error::new(io::ErrorKind::Interrupted, "confirmation cancelled"))
    }
}

fn into_io(err: dialoguer::Error) -> io::Error {
    match err {
        dialoguer::Error::IO(e) => e,
        #[allow(unreachable_patterns)]
        other => io::Error::other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_defaults() {
        let prompter = Prompter::new(true);
        assert!(!prompter.is_interactive());

        let value = prompter
            .text("image-tag", "Tag", Some("latest".to_string()), |_| Ok(()))
            .unwrap();
        assert_eq!(value, "latest");

        assert!(prompter.confirm("Include a ConfigMap?", false).is_ok_and(|v| !v));
        assert_eq!(
            prompter.select("ingress", "Ingress", &["disabled", "http"], Some(0)).unwrap(),
            "disabled"
        );
    }

    #[test]
    fn test_missing_value_names_flag() {
        let prompter = Prompter::new(true);
        let err = prompter.text("app-name", "Application name", None, |_| Ok(())).unwrap_err();

        match err {
            CliError::Validation { message, help } => {
                assert!(message.contains("--app-name"));
                assert!(help.unwrap().contains("FLUXIT_APP_NAME"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_empty_select_without_default() {
        let prompter = Prompter::new(true);
        let items: Vec<String> = Vec::new();
        assert!(prompter.select("ns", "Namespace", &items, None).is_err());
    }
}
