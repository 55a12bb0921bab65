//! Terminal output: diffs shown before confirmation and run summaries

use console::style;
use std::io::{self, Write};
use std::path::Path;

use fluxit_engine::{ConfirmRequest, Disposition, FileDiff, LineTag, RenderResult, RunSummary};

/// Context lines around each change
const DIFF_CONTEXT: usize = 3;

const SEPARATOR: &str = "--------------------";

/// Format count with proper pluralization
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Renders proposed changes for a confirmation prompt
pub struct DiffRenderer {
    writer: Box<dyn Write>,
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffRenderer {
    /// Create a new renderer that writes to stdout
    pub fn new() -> Self {
        Self {
            writer: Box::new(io::stdout()),
        }
    }

    /// Create a renderer that writes to a custom writer (for testing)
    pub fn with_writer<W: Write + 'static>(writer: W) -> Self {
        Self {
            writer: Box::new(writer),
        }
    }

    /// Show the diff of an existing file, or the full content of a new one
    pub fn render_request(&mut self, request: &ConfirmRequest<'_>) -> io::Result<()> {
        writeln!(self.writer, "{}", SEPARATOR)?;
        writeln!(
            self.writer,
            "Processing file: {}",
            style(request.destination.display()).bold()
        )?;

        if request.exists {
            writeln!(self.writer, "Proposed changes (diff):")?;
            self.render_diff(request.relative, request.diff)?;
        } else {
            writeln!(self.writer, "Rendered content:")?;
            write!(self.writer, "{}", request.content)?;
            if !request.content.ends_with('\n') {
                writeln!(self.writer)?;
            }
        }

        writeln!(self.writer, "{}", SEPARATOR)?;
        self.writer.flush()
    }

    /// Unified diff with colored lines
    pub fn render_diff(&mut self, name: &Path, diff: &FileDiff) -> io::Result<()> {
        let name = name.display();
        writeln!(self.writer, "{}", style(format!("--- a/{}", name)).bold())?;
        writeln!(self.writer, "{}", style(format!("+++ b/{}", name)).bold())?;

        for hunk in diff.hunks(DIFF_CONTEXT) {
            writeln!(self.writer, "{}", style(hunk.header()).cyan())?;
            for line in &hunk.lines {
                let text = format!("{}{}", line.tag.prefix(), line.content);
                match line.tag {
                    LineTag::Added => writeln!(self.writer, "{}", style(text).green())?,
                    LineTag::Removed => writeln!(self.writer, "{}", style(text).red())?,
                    LineTag::Context => writeln!(self.writer, "{}", text)?,
                }
            }
        }

        Ok(())
    }
}

/// One line per processed file
pub fn format_result(result: &RenderResult) -> String {
    let path = result.destination.display();
    match result.disposition {
        Disposition::Written if result.prior.is_some() => {
            format!("  {} updated   {}", style("✓").green(), path)
        }
        Disposition::Written => format!("  {} created   {}", style("✓").green(), path),
        Disposition::SkippedUnchanged => {
            format!("  {} unchanged {}", style("·").dim(), style(path).dim())
        }
        Disposition::SkippedByUser => format!("  {} skipped   {}", style("✗").yellow(), path),
        Disposition::SkippedNoConfirmation => {
            format!("  {} pending   {}", style("⚠").yellow(), path)
        }
    }
}

/// Print every result and the summary line
pub fn print_summary(summary: &RunSummary) {
    for result in &summary.results {
        println!("{}", format_result(result));
    }
    println!();

    let icon = if summary.is_success() {
        style("✓").green().bold()
    } else {
        style("⚠").yellow().bold()
    };
    println!(
        "{} {}: {}",
        icon,
        pluralize(summary.results.len(), "file", "files"),
        summary.summary()
    );
}
