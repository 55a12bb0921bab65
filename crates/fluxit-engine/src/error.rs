//! Engine error types

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

use fluxit_core::CoreError;

use crate::suggestions::suggest_unknown_filter;

/// Main engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Template set not found: {path}")]
    TemplateSetNotFound { path: PathBuf },

    #[error("Invalid template set {path}: {message}")]
    InvalidTemplateSet { path: PathBuf, message: String },

    #[error("Template `{template}` references undefined parameter `{parameter}`")]
    MissingParameter {
        template: String,
        parameter: String,
        suggestion: Option<String>,
    },

    #[error("Unsafe output path `{path}`: {reason}")]
    UnsafeOutputPath { path: String, reason: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rendered `{path}` is not valid YAML: {message}")]
    InvalidYaml { path: String, message: String },

    #[error("Template error")]
    Template(#[from] TemplateError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Interrupted")]
    Interrupted,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl EngineError {
    pub(crate) fn unsafe_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsafeOutputPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Error kind for categorizing template errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateErrorKind {
    UndefinedVariable,
    UnknownFilter,
    SyntaxError,
    TypeError,
    Other,
}

impl TemplateErrorKind {
    /// Convert to a code string for diagnostics
    pub fn to_code_string(&self) -> &'static str {
        match self {
            Self::UndefinedVariable => "undefined_variable",
            Self::UnknownFilter => "unknown_filter",
            Self::SyntaxError => "syntax",
            Self::TypeError => "type",
            Self::Other => "render",
        }
    }
}

/// Template-specific error with source information
#[derive(Error, Debug, Diagnostic, Clone)]
#[error("{message}")]
#[diagnostic(code(fluxit::template::render))]
pub struct TemplateError {
    pub message: String,

    pub kind: TemplateErrorKind,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("error occurred here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub suggestion: Option<String>,
}

impl TemplateError {
    /// Create a new template error from a MiniJinja error
    pub fn from_minijinja(err: &minijinja::Error, template_name: &str, template_source: &str) -> Self {
        let (kind, message) = categorize_minijinja_error(err);
        let span = err
            .line()
            .and_then(|line_num| calculate_span(template_source, line_num));

        let suggestion = match kind {
            TemplateErrorKind::UnknownFilter => {
                extract_filter_from_display(&format!("{:#}", err))
                    .and_then(|name| suggest_unknown_filter(&name))
            }
            TemplateErrorKind::SyntaxError => {
                Some("Check the Jinja syntax: blocks are `{% ... %}`, expressions `{{ ... }}`".to_string())
            }
            _ => None,
        };

        Self {
            message,
            kind,
            src: NamedSource::new(template_name, template_source.to_string()),
            span,
            suggestion,
        }
    }

    pub fn kind(&self) -> TemplateErrorKind {
        self.kind
    }
}

fn categorize_minijinja_error(err: &minijinja::Error) -> (TemplateErrorKind, String) {
    let msg = err.to_string();

    let kind = match err.kind() {
        minijinja::ErrorKind::UndefinedError => TemplateErrorKind::UndefinedVariable,
        minijinja::ErrorKind::UnknownFilter => TemplateErrorKind::UnknownFilter,
        minijinja::ErrorKind::SyntaxError => TemplateErrorKind::SyntaxError,
        minijinja::ErrorKind::NonPrimitive | minijinja::ErrorKind::NonKey => {
            TemplateErrorKind::TypeError
        }
        _ => TemplateErrorKind::Other,
    };

    let message = match kind {
        TemplateErrorKind::UnknownFilter => extract_filter_from_display(&format!("{:#}", err))
            .map(|name| format!("unknown filter `{}`", name))
            .unwrap_or(msg),
        _ => msg
            .replace("invalid operation: ", "")
            .replace("syntax error: ", "")
            .replace("undefined value", "undefined variable"),
    };

    (kind, message)
}

/// Jinja keywords, tests, literals and globals that are never parameters
const RESERVED: &[&str] = &[
    "if", "elif", "else", "endif", "for", "in", "endfor", "not", "and", "or", "is", "true",
    "false", "none", "True", "False", "None", "loop", "self", "super", "caller", "varargs",
    "kwargs", "range", "dict",
];

/// Name of the undefined value behind an `UndefinedError`.
///
/// The failing expression comes from the error's source range, or the reported
/// line when no range is recorded. Its first identifier that is not a known
/// variable, a template-local name, an attribute, a filter or a keyword
/// argument is the undefined one.
pub(crate) fn undefined_name(err: &minijinja::Error, source: &str, known: &[String]) -> Option<String> {
    let source = err.template_source().unwrap_or(source);
    let locals = local_names(source);
    let is_known = |word: &str| known.iter().any(|k| k == word) || locals.iter().any(|l| *l == word);

    let in_range = err.range().and_then(|range| source.get(range));
    let on_line = err
        .line()
        .and_then(|line| line.checked_sub(1))
        .and_then(|index| source.lines().nth(index));

    in_range
        .into_iter()
        .chain(on_line)
        .flat_map(tag_bodies)
        .find_map(|expr| unknown_identifier(expr, &is_known))
}

/// Inner text of every `{{ }}` and `{% %}` tag; bare expressions pass through
fn tag_bodies(text: &str) -> Vec<&str> {
    if !text.contains("{{") && !text.contains("{%") {
        return vec![text];
    }

    let mut bodies = Vec::new();
    let mut rest = text;
    loop {
        let open = match (rest.find("{{"), rest.find("{%")) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => break,
        };
        let close = if rest[open..].starts_with("{{") { "}}" } else { "%}" };
        let body = &rest[open + 2..];
        match body.find(close) {
            Some(len) => {
                bodies.push(&body[..len]);
                rest = &body[len + 2..];
            }
            None => {
                bodies.push(body);
                break;
            }
        }
    }
    bodies
}

fn identifiers(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| w.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_'))
}

/// Names bound by `set`, `for`, `macro` and `import` tags
fn local_names(source: &str) -> Vec<&str> {
    let mut names = Vec::new();
    for body in tag_bodies(source) {
        let words: Vec<&str> = identifiers(body).collect();
        match words.first().copied() {
            Some("set") => names.extend(words.get(1).copied()),
            Some("for") => names.extend(words[1..].iter().take_while(|w| **w != "in").copied()),
            Some("macro") => names.extend(words[1..].iter().copied()),
            Some("from") | Some("import") => {
                if let Some(pos) = words.iter().position(|w| *w == "import" || *w == "as") {
                    names.extend(words[pos + 1..].iter().copied());
                }
            }
            _ => {}
        }
    }
    names
}

fn unknown_identifier(expr: &str, is_known: &dyn Fn(&str) -> bool) -> Option<String> {
    let mut previous: Option<char> = None;
    let mut after_is = false;
    let mut chars = expr.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c == '"' || c == '\'' {
            for (_, n) in chars.by_ref() {
                if n == c {
                    break;
                }
            }
            previous = Some(c);
            continue;
        }
        if !(c.is_ascii_alphabetic() || c == '_') {
            if !c.is_whitespace() {
                previous = Some(c);
            }
            continue;
        }

        let mut end = start + 1;
        while let Some(&(i, n)) = chars.peek() {
            if !(n.is_ascii_alphanumeric() || n == '_') {
                break;
            }
            end = i + 1;
            chars.next();
        }
        let word = &expr[start..end];
        let qualified = matches!(previous, Some('.') | Some('|'));
        previous = Some('a');

        // `x is defined`, `x is not none`
        if after_is && word != "not" {
            after_is = false;
            continue;
        }
        if word == "is" {
            after_is = true;
            continue;
        }

        let rest = expr[end..].trim_start();
        let keyword_argument = rest.starts_with('=') && !rest.starts_with("==");
        if !qualified && !keyword_argument && !RESERVED.contains(&word) && !is_known(word) {
            return Some(word.to_string());
        }
    }
    None
}

fn extract_filter_from_display(display: &str) -> Option<String> {
    for line in display.lines() {
        let trimmed = line.trim_start();
        if !(trimmed.contains(" > ") || trimmed.starts_with("> ")) {
            continue;
        }
        let Some(start) = line.find("{{") else {
            continue;
        };
        let Some(end) = line[start..].find("}}") else {
            continue;
        };
        let expr = &line[start + 2..start + end];
        if let Some(pipe_pos) = expr.rfind('|') {
            if let Some(name) = expr[pipe_pos + 1..].split_whitespace().next() {
                let name = name.split('(').next().unwrap_or(name);
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
    }
    None
}

/// Calculate the source span for a given line number
fn calculate_span(source: &str, line_num: usize) -> Option<SourceSpan> {
    let mut offset = 0;

    for (index, line) in source.lines().enumerate() {
        if index + 1 == line_num {
            return Some(SourceSpan::new(offset.into(), line.len()));
        }
        offset += line.len() + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        ["namespace", "app_name", "image_repo", "image_tag", "ingress_enabled"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn unknown(expr: &str) -> Option<String> {
        let known = known();
        unknown_identifier(expr, &|w: &str| known.iter().any(|k| k == w))
    }

    #[test]
    fn test_unknown_identifier() {
        assert_eq!(unknown(" image_repo ~ ':' ~ image_tg "), Some("image_tg".to_string()));
        assert_eq!(unknown("image_rep | quote"), Some("image_rep".to_string()));
        assert_eq!(unknown("app_name | indent(width=2) ~ 'lbl'"), None);
        assert_eq!(unknown("ingres_enabled and not app_name is defined"), Some("ingres_enabled".to_string()));
        assert_eq!(unknown("h.name(namespace, app_name)"), Some("h".to_string()));
        assert_eq!(unknown("app_name.upper()"), None);
    }

    #[test]
    fn test_tag_bodies() {
        assert_eq!(
            tag_bodies("image: {{ image_repo }}:{%- if x %}{{ image_tg }}"),
            vec![" image_repo ", "- if x ", " image_tg "]
        );
        assert_eq!(tag_bodies("app_name | quote"), vec!["app_name | quote"]);
    }

    #[test]
    fn test_local_names() {
        let source = "{% import \"_helpers.j2\" as h %}{% set port = 80 %}\n{% for item in items %}{% endfor %}";
        let locals = local_names(source);
        assert!(locals.contains(&"h"));
        assert!(locals.contains(&"port"));
        assert!(locals.contains(&"item"));
        assert!(!locals.contains(&"items"));
    }

    #[test]
    fn test_extract_filter() {
        let display = "   2 > data: {{ app_name | toyml }}";
        assert_eq!(extract_filter_from_display(display), Some("toyml".to_string()));
    }

    #[test]
    fn test_calculate_span() {
        let source = "line1\nline2\nline3";
        let span = calculate_span(source, 2).unwrap();
        assert_eq!(span.offset(), 6);
        assert_eq!(span.len(), 5);

        assert!(calculate_span(source, 10).is_none());
    }

    #[test]
    fn test_error_display() {
        let err = EngineError::MissingParameter {
            template: "app/helmrelease.yaml.j2".to_string(),
            parameter: "image_tg".to_string(),
            suggestion: None,
        };
        assert_eq!(
            err.to_string(),
            "Template `app/helmrelease.yaml.j2` references undefined parameter `image_tg`"
        );
    }
}
