//! Diff/write engine
//!
//! Compares rendered content with what is on disk, asks for confirmation when
//! the policy requires it, and replaces files atomically.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fluxit_core::ConfirmPolicy;

use crate::diff::FileDiff;
use crate::error::{EngineError, Result};
use crate::path_guard;

/// What the user is asked to approve
#[derive(Debug)]
pub struct ConfirmRequest<'a> {
    pub destination: &'a Path,
    pub relative: &'a Path,
    /// Whether `destination` already exists
    pub exists: bool,
    pub diff: &'a FileDiff,
    pub content: &'a str,
}

/// Asks the user whether a file may be written
pub trait Confirm {
    /// `false` when nobody can answer (no terminal, `--no-input`)
    fn is_interactive(&self) -> bool {
        true
    }

    /// An [`io::ErrorKind::Interrupted`] error aborts the run
    fn confirm(&mut self, request: &ConfirmRequest<'_>) -> io::Result<bool>;
}

/// Confirmer for unattended runs: files needing approval are skipped
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl Confirm for NonInteractive {
    fn is_interactive(&self) -> bool {
        false
    }

    fn confirm(&mut self, _request: &ConfirmRequest<'_>) -> io::Result<bool> {
        Ok(false)
    }
}

/// Outcome for one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    Written,
    SkippedUnchanged,
    SkippedByUser,
    SkippedNoConfirmation,
}

impl Disposition {
    pub const ALL: [Disposition; 4] = [
        Disposition::Written,
        Disposition::SkippedUnchanged,
        Disposition::SkippedByUser,
        Disposition::SkippedNoConfirmation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::SkippedUnchanged => "skipped-unchanged",
            Self::SkippedByUser => "skipped-by-user",
            Self::SkippedNoConfirmation => "skipped-no-confirmation",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one processed output file
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub relative_path: PathBuf,
    pub destination: PathBuf,
    /// Content on disk before the run
    pub prior: Option<String>,
    pub content: String,
    pub diff: FileDiff,
    pub disposition: Disposition,
}

/// Applies rendered files below an output root
#[derive(Debug, Clone)]
pub struct WriteEngine {
    root: PathBuf,
    policy: ConfirmPolicy,
}

impl WriteEngine {
    pub fn new(root: impl Into<PathBuf>, policy: ConfirmPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> ConfirmPolicy {
        self.policy
    }

    /// Write `content` to `relative` below the root, subject to the policy
    pub fn apply(
        &self,
        relative: &Path,
        content: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<RenderResult> {
        path_guard::check_relative(relative)?;
        path_guard::check_contained(&self.root, relative)?;
        let destination = self.root.join(relative);

        let prior = match fs::read_to_string(&destination) {
            Ok(existing) => Some(existing),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(EngineError::io(&destination, e)),
        };
        let exists = prior.is_some();

        let result = |diff: FileDiff, disposition: Disposition| RenderResult {
            relative_path: relative.to_path_buf(),
            destination: destination.clone(),
            prior: prior.clone(),
            content: content.to_string(),
            diff,
            disposition,
        };

        if prior.as_deref() == Some(content) {
            tracing::info!("Skipped (no changes): {}", destination.display());
            return Ok(result(FileDiff::default(), Disposition::SkippedUnchanged));
        }

        let diff = match prior.as_deref() {
            Some(old) => FileDiff::compute(old, content),
            None => FileDiff::new_file(content),
        };

        if self.policy.requires_confirmation(exists) {
            if !confirm.is_interactive() {
                tracing::warn!(
                    "Skipped {}: confirmation required but no terminal is attached",
                    destination.display()
                );
                return Ok(result(diff, Disposition::SkippedNoConfirmation));
            }

            let request = ConfirmRequest {
                destination: &destination,
                relative,
                exists,
                diff: &diff,
                content,
            };
            match confirm.confirm(&request) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!("Skipped by user: {}", destination.display());
                    return Ok(result(diff, Disposition::SkippedByUser));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    return Err(EngineError::Interrupted);
                }
                Err(e) => return Err(EngineError::io(&destination, e)),
            }
        } else if exists {
            tracing::warn!("Overwriting {} without confirmation", destination.display());
        }

        write_atomic(&destination, content).map_err(|source| EngineError::Write {
            path: destination.clone(),
            source,
        })?;
        tracing::info!("Saved: {}", destination.display());

        Ok(result(diff, Disposition::Written))
    }
}

/// Replace `destination` with `content` in a single rename
pub fn write_atomic(destination: &Path, content: &str) -> io::Result<()> {
    write_atomic_with(destination, |file| file.write_all(content.as_bytes()))
}

pub(crate) fn write_atomic_with<F>(destination: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // Dropping the temp file on any early return removes it
    let mut temp = tempfile::Builder::new()
        .prefix(".fluxit-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    let permissions = match fs::metadata(destination) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }

    temp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}


#[cfg(test)]
mod tests {
    use super::testing::{Interrupting, Scripted};
    use super::*;
    use tempfile::TempDir;

    const REL: &str = "web/nginx/ks.yaml";

    fn engine(temp: &TempDir, policy: ConfirmPolicy) -> WriteEngine {
        WriteEngine::new(temp.path(), policy)
    }

    fn seed(temp: &TempDir, content: &str) {
        let path = temp.path().join(REL);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(temp: &TempDir) -> String {
        fs::read_to_string(temp.path().join(REL)).unwrap()
    }

    #[test]
    fn test_new_file_creates_directories() {
        let temp = TempDir::new().unwrap();
        let result = engine(&temp, ConfirmPolicy::IfExists)
            .apply(Path::new(REL), "a: 1\n", &mut NonInteractive)
            .unwrap();

        assert_eq!(result.disposition, Disposition::Written);
        assert_eq!(result.prior, None);
        assert_eq!(result.diff.stats().added, 1);
        assert_eq!(read(&temp), "a: 1\n");
    }

    #[test]
    fn test_unchanged_is_never_prompted() {
        for policy in ConfirmPolicy::ALL {
            let temp = TempDir::new().unwrap();
            seed(&temp, "a: 1\n");

            let mut confirm = Scripted::yes();
            let result = engine(&temp, policy)
                .apply(Path::new(REL), "a: 1\n", &mut confirm)
                .unwrap();

            assert_eq!(result.disposition, Disposition::SkippedUnchanged, "{}", policy);
            assert!(confirm.asked.is_empty());
            assert!(!result.diff.has_changes());
        }
    }

    #[test]
    fn test_confirmation_matrix() {
        // (policy, file exists, prompted)
        let cases = [
            (ConfirmPolicy::Always, false, true),
            (ConfirmPolicy::Always, true, true),
            (ConfirmPolicy::Never, false, false),
            (ConfirmPolicy::Never, true, false),
            (ConfirmPolicy::IfExists, false, false),
            (ConfirmPolicy::IfExists, true, true),
        ];

        for (policy, exists, prompted) in cases {
            let temp = TempDir::new().unwrap();
            if exists {
                seed(&temp, "a: 1\n");
            }

            let mut confirm = Scripted::no();
            let result = engine(&temp, policy)
                .apply(Path::new(REL), "a: 2\n", &mut confirm)
                .unwrap();

            assert_eq!(confirm.asked.len(), usize::from(prompted), "{} exists={}", policy, exists);
            if prompted {
                assert_eq!(result.disposition, Disposition::SkippedByUser);
            } else {
                assert_eq!(result.disposition, Disposition::Written);
                assert_eq!(read(&temp), "a: 2\n");
            }
        }
    }

    #[test]
    fn test_declined_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        seed(&temp, "a: 1\n");

        let result = engine(&temp, ConfirmPolicy::Always)
            .apply(Path::new(REL), "a: 2\n", &mut Scripted::no())
            .unwrap();

        assert_eq!(result.disposition, Disposition::SkippedByUser);
        assert_eq!(result.prior.as_deref(), Some("a: 1\n"));
        assert_eq!(read(&temp), "a: 1\n");
    }

    #[test]
    fn test_accepted_overwrites() {
        let temp = TempDir::new().unwrap();
        seed(&temp, "a: 1\n");

        let mut confirm = Scripted::yes();
        let result = engine(&temp, ConfirmPolicy::IfExists)
            .apply(Path::new(REL), "a: 2\n", &mut confirm)
            .unwrap();

        assert_eq!(result.disposition, Disposition::Written);
        assert_eq!(confirm.asked, vec![PathBuf::from(REL)]);
        assert_eq!(read(&temp), "a: 2\n");
    }

    #[test]
    fn test_no_terminal_skips() {
        let temp = TempDir::new().unwrap();
        seed(&temp, "a: 1\n");

        let result = engine(&temp, ConfirmPolicy::IfExists)
            .apply(Path::new(REL), "a: 2\n", &mut NonInteractive)
            .unwrap();

        assert_eq!(result.disposition, Disposition::SkippedNoConfirmation);
        assert_eq!(read(&temp), "a: 1\n");
    }

    #[test]
    fn test_interrupt_aborts() {
        let temp = TempDir::new().unwrap();
        let result = engine(&temp, ConfirmPolicy::Always).apply(
            Path::new(REL),
            "a: 2\n",
            &mut Interrupting,
        );
        assert!(matches!(result, Err(EngineError::Interrupted)));
        assert!(!temp.path().join(REL).exists());
    }

    #[test]
    fn test_rejects_escaping_path() {
        let temp = TempDir::new().unwrap();
        let result = engine(&temp, ConfirmPolicy::Never).apply(
            Path::new("../outside.yaml"),
            "a: 1\n",
            &mut NonInteractive,
        );
        assert!(matches!(result, Err(EngineError::UnsafeOutputPath { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlinked_namespace_outside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("apps");
        let outside = temp.path().join("outside");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink("../outside", root.join("web")).unwrap();

        let result = WriteEngine::new(&root, ConfirmPolicy::Never).apply(
            Path::new(REL),
            "a: 1\n",
            &mut NonInteractive,
        );

        assert!(matches!(result, Err(EngineError::UnsafeOutputPath { .. })));
        assert!(!outside.join("nginx").exists());
    }

    #[test]
    fn test_failed_write_keeps_original() {
        let temp = TempDir::new().unwrap();
        seed(&temp, "a: 1\n");
        let destination = temp.path().join(REL);

        let result = write_atomic_with(&destination, |file| {
            file.write_all(b"a: 2\npartial")?;
            Err(io::Error::other("disk full"))
        });

        assert!(result.is_err());
        assert_eq!(read(&temp), "a: 1\n");

        let leftovers: Vec<_> = fs::read_dir(destination.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("ks.yaml")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let fresh = temp.path().join("fresh.yaml");
        write_atomic(&fresh, "a: 1\n").unwrap();
        assert_eq!(fs::metadata(&fresh).unwrap().permissions().mode() & 0o777, 0o644);

        let script = temp.path().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        write_atomic(&script, "#!/bin/sh\necho hi\n").unwrap();
        assert_eq!(fs::metadata(&script).unwrap().permissions().mode() & 0o777, 0o755);
    }
}
