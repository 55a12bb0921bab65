//! Confirmation policy for file writes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// When the user is asked before a file is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmPolicy {
    /// Ask before every write, new files included
    Always,
    /// Never ask, always write
    Never,
    /// Ask only when an existing file would change
    #[default]
    IfExists,
}

impl ConfirmPolicy {
    pub const ALL: [ConfirmPolicy; 3] =
        [ConfirmPolicy::Always, ConfirmPolicy::Never, ConfirmPolicy::IfExists];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Never => "never",
            Self::IfExists => "if_exists",
        }
    }

    /// Whether a write needs confirmation.
    ///
    /// Only called for writes that change something; unchanged files are
    /// skipped before the policy is consulted.
    pub fn requires_confirmation(&self, destination_exists: bool) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::IfExists => destination_exists,
        }
    }
}

impl fmt::Display for ConfirmPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfirmPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "if_exists" | "if-exists" => Ok(Self::IfExists),
            other => Err(CoreError::invalid(
                "confirm",
                format!("unknown policy '{}', expected one of: always, never, if_exists", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_confirmation() {
        assert!(ConfirmPolicy::Always.requires_confirmation(false));
        assert!(ConfirmPolicy::Always.requires_confirmation(true));
        assert!(!ConfirmPolicy::Never.requires_confirmation(false));
        assert!(!ConfirmPolicy::Never.requires_confirmation(true));
        assert!(!ConfirmPolicy::IfExists.requires_confirmation(false));
        assert!(ConfirmPolicy::IfExists.requires_confirmation(true));
    }

    #[test]
    fn test_parse_round_trip() {
        for policy in ConfirmPolicy::ALL {
            assert_eq!(policy.as_str().parse::<ConfirmPolicy>().unwrap(), policy);
        }
        assert_eq!("if-exists".parse::<ConfirmPolicy>().unwrap(), ConfirmPolicy::IfExists);
        assert!("sometimes".parse::<ConfirmPolicy>().is_err());
    }

    #[test]
    fn test_default_is_if_exists() {
        assert_eq!(ConfirmPolicy::default(), ConfirmPolicy::IfExists);
    }
}
