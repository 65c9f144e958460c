//! Incremental merging of per-step fragments into one program.

use tracing::warn;

use playrec_protocols::OutputFormat;

use crate::dialect::Dialect;

/// What a merge did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The fragment became the program verbatim.
    Initialized,
    /// Spliced in right before the teardown statement.
    Inserted,
    /// Appended at the end; the dialect has no teardown.
    Appended,
    /// Appended at the end because the teardown statement was missing.
    AppendedWithoutAnchor,
    /// The fragment was blank; nothing changed.
    Ignored,
}

impl MergeOutcome {
    /// Warning-level: the program may no longer tear down last.
    pub fn is_anchor_miss(&self) -> bool {
        matches!(self, MergeOutcome::AppendedWithoutAnchor)
    }
}

/// The accumulated code of one step-by-step session.
///
/// The first fragment is a complete program; every later fragment is one
/// statement that must land before the teardown call without reordering
/// anything merged earlier.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeAccumulator {
    dialect: Dialect,
    code: Option<String>,
}

impl CodeAccumulator {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            dialect: Dialect::of(format),
            code: None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_none()
    }

    pub fn into_code(self) -> Option<String> {
        self.code
    }

    /// Merge one fragment. Callers merge each fragment exactly once.
    pub fn merge(&mut self, fragment: &str) -> MergeOutcome {
        let Some(current) = self.code.as_deref() else {
            if fragment.trim().is_empty() {
                return MergeOutcome::Ignored;
            }
            self.code = Some(fragment.to_string());
            return MergeOutcome::Initialized;
        };

        let lines: Vec<&str> = fragment
            .trim()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return MergeOutcome::Ignored;
        }

        let (merged, outcome) = match self.dialect.teardown {
            None => {
                let body = indent_lines(&lines, self.dialect.indent);
                let separator = if current.is_empty() || current.ends_with('\n') { "" } else { "\n" };
                (format!("{current}{separator}{body}\n"), MergeOutcome::Appended)
            }
            Some(teardown) => match insertion_point(current, teardown) {
                Some((at, indent)) => {
                    let indent = indent.unwrap_or(self.dialect.indent);
                    let body = indent_lines(&lines, indent);
                    let (before, after) = current.split_at(at);
                    (format!("{before}{body}\n{after}"), MergeOutcome::Inserted)
                }
                None => {
                    warn!(
                        "Teardown statement '{}' not found, appending fragment at the end",
                        teardown
                    );
                    (
                        format!("{current}\n{}", fragment.trim()),
                        MergeOutcome::AppendedWithoutAnchor,
                    )
                }
            },
        };

        self.code = Some(merged);
        outcome
    }
}

/// Byte offset to insert at, and the teardown line's own indentation when
/// the teardown starts its line.
fn insertion_point<'a>(code: &'a str, teardown: &str) -> Option<(usize, Option<&'a str>)> {
    let at = code.rfind(teardown)?;
    let line_start = code[..at].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &code[line_start..at];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        let indent = if prefix.is_empty() { None } else { Some(prefix) };
        Some((line_start, indent))
    } else {
        Some((at, None))
    }
}

fn indent_lines(lines: &[&str], indent: &str) -> String {
    lines
        .iter()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "accumulator_tests.rs"]
mod tests;
