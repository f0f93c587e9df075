//! Compiler diagnostics display
//!
//! This module turns the raw log text the shader compiler reports into
//! line-addressed entries and keeps a buffer's line decorations in step with
//! its current diagnostic. Errors are painted above warnings, warnings above
//! everything else.

use crate::buffer::Buffer;
use crate::decoration::{DecorationFace, DecorationSpec, DecorationSurface, Priority};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Compiler output for one buffer.
///
/// `id` changes only when `text` changes, so two records with the same id
/// describe the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub id: u64,
    pub text: String,
}

/// One `<file>(<line>) : <type> <code>: <message>` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDiagnostic {
    pub file_index: usize,
    pub line_number: u32,
    pub error_type: String,
    pub error_code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl ParsedDiagnostic {
    pub fn severity(&self) -> Severity {
        match self.error_type.to_ascii_lowercase().as_str() {
            "error" | "fatal" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }
}

static DIAGNOSTIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+)\((\d+)\)\s*:\s*(\w+)\s+(\w+)\s*:\s*(.*?)\s*$")
        .expect("diagnostic pattern is valid")
});

/// Parse a single line; `None` if it is not a diagnostic line.
pub fn parse_line(line: &str) -> Option<ParsedDiagnostic> {
    let caps = DIAGNOSTIC_LINE.captures(line)?;
    Some(ParsedDiagnostic {
        file_index: caps[1].parse().ok()?,
        line_number: caps[2].parse().ok()?,
        error_type: caps[3].to_string(),
        error_code: caps[4].to_string(),
        message: caps[5].to_string(),
    })
}

/// Parse compiler output line by line, skipping anything that does not match.
pub fn parse_diagnostics(text: &str) -> Vec<ParsedDiagnostic> {
    text.lines()
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() && !line.trim().is_empty() {
                tracing::trace!("Skipping unparsable diagnostic line: {:?}", line);
            }
            parsed
        })
        .collect()
}

/// Convert a parsed entry to a decoration spec (line, face, priority)
pub fn diagnostic_to_decoration(entry: &ParsedDiagnostic) -> DecorationSpec {
    let (face, priority): (DecorationFace, Priority) = match entry.severity() {
        Severity::Error => (DecorationFace::ErrorLine, 100),
        Severity::Warning => (DecorationFace::WarningLine, 50),
        Severity::Info => (DecorationFace::InfoLine, 10),
    };
    DecorationSpec {
        line: entry.line_number,
        face,
        priority,
        message: format!("{} {}: {}", entry.error_type, entry.error_code, entry.message),
    }
}

fn decoration_specs(record: &DiagnosticRecord) -> Vec<DecorationSpec> {
    parse_diagnostics(&record.text)
        .iter()
        .map(diagnostic_to_decoration)
        .collect()
}

/// What a reconciliation pass did to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Unchanged,
    Installed { count: usize },
    Cleared { count: usize },
    Replaced { removed: usize, installed: usize },
    Reapplied { count: usize },
}

/// Bring a buffer's decorations in line with its current diagnostic.
///
/// Only the buffer's own decoration handles and `previous_diagnostic` are
/// touched. `selection_changed` asks for a repaint when the diagnostic itself
/// did not change but the buffer was just shown in a different pane.
pub fn reconcile(
    buffer: &mut Buffer,
    selection_changed: bool,
    surface: &mut dyn DecorationSurface,
) -> Reconciliation {
    let index = buffer.index;
    match (&buffer.previous_diagnostic, &buffer.diagnostic) {
        (None, None) => Reconciliation::Unchanged,

        (None, Some(current)) => {
            let current = current.clone();
            let handles = surface.add_decorations(index, decoration_specs(&current));
            let count = handles.len();
            buffer.decoration_handles = handles;
            buffer.previous_diagnostic = Some(current);
            tracing::debug!("Buffer {}: installed {} diagnostic decorations", index, count);
            Reconciliation::Installed { count }
        }

        (Some(_), None) => {
            let handles = std::mem::take(&mut buffer.decoration_handles);
            surface.remove_decorations(index, &handles);
            buffer.previous_diagnostic = None;
            tracing::debug!("Buffer {}: cleared {} diagnostic decorations", index, handles.len());
            Reconciliation::Cleared {
                count: handles.len(),
            }
        }

        (Some(previous), Some(current)) if previous.id != current.id => {
            let current = current.clone();
            let old = std::mem::take(&mut buffer.decoration_handles);
            surface.remove_decorations(index, &old);
            let handles = surface.add_decorations(index, decoration_specs(&current));
            let installed = handles.len();
            buffer.decoration_handles = handles;
            buffer.previous_diagnostic = Some(current);
            tracing::debug!(
                "Buffer {}: replaced {} diagnostic decorations with {}",
                index,
                old.len(),
                installed
            );
            Reconciliation::Replaced {
                removed: old.len(),
                installed,
            }
        }

        (Some(_), Some(current)) => {
            if !selection_changed {
                return Reconciliation::Unchanged;
            }
            let specs = decoration_specs(current);
            surface.rerender_decorations(index, &buffer.decoration_handles, &specs);
            Reconciliation::Reapplied {
                count: buffer.decoration_handles.len(),
            }
        }
    }
}
