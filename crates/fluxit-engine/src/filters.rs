//! Manifest filters registered in every template environment

use base64::Engine as _;
use minijinja::{Error, ErrorKind, Value};

/// `Value` arguments bypass strict undefined checks
fn require_defined(value: &Value) -> Result<(), Error> {
    if value.is_undefined() {
        return Err(Error::from(ErrorKind::UndefinedError));
    }
    Ok(())
}

fn as_text(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Serialize a value as a YAML block
///
/// Usage: {{ labels | toyaml | nindent(4) }}
pub fn toyaml(value: Value) -> Result<String, Error> {
    require_defined(&value)?;
    let json: serde_json::Value = serde_json::to_value(&value)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;

    let yaml = serde_yaml::to_string(&json)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;

    Ok(yaml.trim_start_matches("---\n").trim_end().to_string())
}

/// Base64 encode a string, for Secret `data:` fields
///
/// Usage: {{ "changeme" | b64encode }}
#[must_use]
pub fn b64encode(value: String) -> String {
    base64::engine::general_purpose::STANDARD.encode(value.as_bytes())
}

/// Double-quote a scalar
///
/// Usage: {{ image_tag | quote }}
pub fn quote(value: Value) -> Result<String, Error> {
    require_defined(&value)?;
    let text = as_text(&value);
    Ok(format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\"")))
}

/// Single-quote a scalar
pub fn squote(value: Value) -> Result<String, Error> {
    require_defined(&value)?;
    Ok(format!("'{}'", as_text(&value).replace('\'', "''")))
}

/// Indent every non-empty line by `spaces`
#[must_use]
pub fn indent(value: String, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    value
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Like [`indent`], starting on a new line
///
/// Usage: {{ labels | toyaml | nindent(4) }}
#[must_use]
pub fn nindent(value: String, spaces: usize) -> String {
    format!("\n{}", indent(value, spaces))
}

/// `my_App Name` -> `my-app-name`
#[must_use]
pub fn kebabcase(value: String) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_lower = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_lowercase());
        } else {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        }
    }

    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toyaml() {
        let value = Value::from_serialize(serde_json::json!({
            "app.kubernetes.io/name": "nginx",
            "tier": "web"
        }));
        let yaml = toyaml(value).unwrap();
        assert!(yaml.contains("app.kubernetes.io/name: nginx"));
        assert!(yaml.contains("tier: web"));
        assert!(!yaml.ends_with('\n'));
    }

    #[test]
    fn test_b64encode() {
        assert_eq!(b64encode("changeme".to_string()), "Y2hhbmdlbWU=");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(Value::from("1.25")).unwrap(), "\"1.25\"");
        assert_eq!(quote(Value::from("say \"hi\"")).unwrap(), "\"say \\\"hi\\\"\"");
        assert_eq!(quote(Value::from(80)).unwrap(), "\"80\"");
        assert_eq!(squote(Value::from("it's")).unwrap(), "'it''s'");
    }

    #[test]
    fn test_undefined_input_is_rejected() {
        for result in [
            quote(Value::UNDEFINED),
            squote(Value::UNDEFINED),
            toyaml(Value::UNDEFINED),
        ] {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::UndefinedError);
        }
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a: 1\n\nb: 2".to_string(), 2), "  a: 1\n\n  b: 2");
        assert_eq!(nindent("a: 1\nb: 2".to_string(), 4), "\n    a: 1\n    b: 2");
    }

    #[test]
    fn test_kebabcase() {
        assert_eq!(kebabcase("my_app".to_string()), "my-app");
        assert_eq!(kebabcase("MyApp".to_string()), "my-app");
        assert_eq!(kebabcase("web  server".to_string()), "web-server");
        assert_eq!(kebabcase("nginx".to_string()), "nginx");
    }
}
