//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - every file was written, unchanged or declined by the user
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure, or files left unconfirmed
pub const ERROR: i32 = 1;

/// Validation error - invalid parameter or unsafe output path
pub const VALIDATION_ERROR: i32 = 2;

/// Template error - rendering failed or a parameter is missing
pub const TEMPLATE_ERROR: i32 = 3;

/// Template set error - missing or malformed template set
pub const TEMPLATE_SET_ERROR: i32 = 4;

/// IO error - file not found, permission denied, failed write, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;

/// Interrupted by the user (128 + SIGINT)
pub const INTERRUPTED: i32 = 130;
