//! Output path checks
//!
//! Parameters that end up in output paths are checked as single path segments
//! before any substitution happens; rendered relative paths are checked again
//! component by component.

use std::fs;
use std::path::{Component, Path};

use crate::error::{EngineError, Result};

/// Reject a parameter value that is not a single safe path segment
pub fn check_segment(parameter: &str, value: &str) -> Result<()> {
    let reason = if value.is_empty() {
        Some("empty path segment")
    } else if value == "." || value == ".." {
        Some("relative directory reference")
    } else if value.contains('/') || value.contains('\\') {
        Some("contains a path separator")
    } else if value.contains('\0') {
        Some("contains a NUL byte")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EngineError::unsafe_path(
            value,
            format!("parameter `{}`: {}", parameter, reason),
        )),
        None => Ok(()),
    }
}

/// Reject a rendered path that could leave the output root
pub fn check_relative(path: &Path) -> Result<()> {
    let display = path.display().to_string();

    if path.as_os_str().is_empty() {
        return Err(EngineError::unsafe_path(display, "empty path"));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {
                return Err(EngineError::unsafe_path(display, "contains `.`"));
            }
            Component::ParentDir => {
                return Err(EngineError::unsafe_path(display, "contains `..`"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(EngineError::unsafe_path(display, "absolute path"));
            }
        }
    }

    Ok(())
}

/// Reject `relative` when a directory on the way to it resolves outside `root`
///
/// Only existing directories are resolved; whatever is created later sits
/// below the deepest one that was checked.
pub fn check_contained(root: &Path, relative: &Path) -> Result<()> {
    let real_root = match root.canonicalize() {
        Ok(real) => real,
        // Nothing below a missing root can be a link
        Err(_) => return Ok(()),
    };

    let mut deepest = root.to_path_buf();
    for component in relative.parent().into_iter().flat_map(Path::components) {
        let next = deepest.join(component);
        if fs::symlink_metadata(&next).is_err() {
            break;
        }
        deepest = next;
    }

    let real = deepest
        .canonicalize()
        .map_err(|e| EngineError::io(&deepest, e))?;
    if !real.starts_with(&real_root) {
        return Err(EngineError::unsafe_path(
            relative.display().to_string(),
            format!("{} resolves outside the output root", deepest.display()),
        ));
    }

    Ok(())
}
