//! CLI command implementations

pub mod init_templates;
pub mod namespaces;
pub mod new;

use fluxit_engine::{Disposition, RunSummary};

use crate::display;
use crate::error::{CliError, Result};

/// Print the run and fail when files were left unconfirmed
fn finish(summary: &RunSummary) -> Result<()> {
    display::print_summary(summary);

    let pending = summary.count(Disposition::SkippedNoConfirmation);
    if pending > 0 {
        return Err(CliError::Unconfirmed { count: pending });
    }
    Ok(())
}
