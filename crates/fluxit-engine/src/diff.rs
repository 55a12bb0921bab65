//! Line diffs between an existing file and its rendered replacement

use similar::{ChangeTag, TextDiff};
use std::fmt;

/// Kind of a diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    Context,
    Added,
    Removed,
}

impl LineTag {
    pub fn prefix(&self) -> char {
        match self {
            Self::Context => ' ',
            Self::Added => '+',
            Self::Removed => '-',
        }
    }
}

/// A line in the diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: LineTag,
    /// Line text without its line terminator
    pub content: String,
    /// Zero-based line index in the old text
    pub old_line_no: Option<usize>,
    /// Zero-based line index in the new text
    pub new_line_no: Option<usize>,
}

/// Added and removed line counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} -{}", self.added, self.removed)
    }
}

/// Changed lines with surrounding context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// One-based, as printed in `@@` headers
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )
    }
}

/// Line diff of a whole file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    pub lines: Vec<DiffLine>,
}

impl FileDiff {
    /// Diff `old` against `new`
    pub fn compute(old: &str, new: &str) -> Self {
        let diff = TextDiff::from_lines(old, new);

        let lines = diff
            .iter_all_changes()
            .map(|change| DiffLine {
                tag: match change.tag() {
                    ChangeTag::Delete => LineTag::Removed,
                    ChangeTag::Insert => LineTag::Added,
                    ChangeTag::Equal => LineTag::Context,
                },
                content: change
                    .value()
                    .trim_end_matches(['\n', '\r'])
                    .to_string(),
                old_line_no: change.old_index(),
                new_line_no: change.new_index(),
            })
            .collect();

        Self { lines }
    }

    /// Diff for a file that does not exist yet
    pub fn new_file(content: &str) -> Self {
        Self::compute("", content)
    }

    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(|l| l.tag != LineTag::Context)
    }

    pub fn stats(&self) -> DiffStats {
        self.lines.iter().fold(DiffStats::default(), |mut stats, line| {
            match line.tag {
                LineTag::Added => stats.added += 1,
                LineTag::Removed => stats.removed += 1,
                LineTag::Context => {}
            }
            stats
        })
    }

    /// Group changes into hunks with `context` unchanged lines around them
    pub fn hunks(&self, context: usize) -> Vec<Hunk> {
        let mut ranges: Vec<(usize, usize)> = Vec::new();

        for (index, line) in self.lines.iter().enumerate() {
            if line.tag == LineTag::Context {
                continue;
            }
            let start = index.saturating_sub(context);
            let end = (index + context + 1).min(self.lines.len());
            match ranges.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => ranges.push((start, end)),
            }
        }

        ranges
            .into_iter()
            .map(|(start, end)| self.hunk(start, end))
            .collect()
    }

    fn hunk(&self, start: usize, end: usize) -> Hunk {
        let before = &self.lines[..start];
        let lines = &self.lines[start..end];

        let old_before = before.iter().filter(|l| l.old_line_no.is_some()).count();
        let new_before = before.iter().filter(|l| l.new_line_no.is_some()).count();
        let old_len = lines.iter().filter(|l| l.old_line_no.is_some()).count();
        let new_len = lines.iter().filter(|l| l.new_line_no.is_some()).count();

        Hunk {
            old_start: if old_len == 0 { old_before } else { old_before + 1 },
            old_len,
            new_start: if new_len == 0 { new_before } else { new_before + 1 },
            new_len,
            lines: lines.to_vec(),
        }
    }
}
