use crate::decoration::DecorationHandle;
use crate::diagnostics::{self, DiagnosticRecord, ParsedDiagnostic};
use serde::{Deserialize, Serialize};

/// Cursor and scroll position of an editing surface.
///
/// The engine stores and restores it but never interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub cursor_line: u32,
    pub cursor_column: u32,
    pub scroll_top: u32,
    #[serde(default)]
    pub selection_anchor: Option<(u32, u32)>,
}

/// One editable shader source.
///
/// `index` is the only key the service uses to address a buffer and stays
/// fixed until the next full project load replaces the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub(crate) index: usize,
    pub(crate) content: String,
    pub(crate) file_path: String,
    pub(crate) saved_view_state: Option<ViewState>,
    pub(crate) diagnostic: Option<DiagnosticRecord>,
    /// `diagnostic` parsed into entries, refreshed whenever it changes
    pub(crate) diagnostic_entries: Vec<ParsedDiagnostic>,
    pub(crate) previous_diagnostic: Option<DiagnosticRecord>,
    pub(crate) decoration_handles: Vec<DecorationHandle>,
}

impl Buffer {
    pub fn new(index: usize, file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            file_path: file_path.into(),
            saved_view_state: None,
            diagnostic: None,
            diagnostic_entries: Vec::new(),
            previous_diagnostic: None,
            decoration_handles: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// File name without directories, for tab labels.
    pub fn basename(&self) -> &str {
        self.file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_path)
    }

    pub fn saved_view_state(&self) -> Option<&ViewState> {
        self.saved_view_state.as_ref()
    }

    pub fn diagnostic(&self) -> Option<&DiagnosticRecord> {
        self.diagnostic.as_ref()
    }

    pub fn diagnostic_entries(&self) -> &[ParsedDiagnostic] {
        &self.diagnostic_entries
    }

    pub(crate) fn set_diagnostic(&mut self, record: Option<DiagnosticRecord>) {
        self.diagnostic_entries = record
            .as_ref()
            .map(|d| diagnostics::parse_diagnostics(&d.text))
            .unwrap_or_default();
        self.diagnostic = record;
    }

    pub fn previous_diagnostic(&self) -> Option<&DiagnosticRecord> {
        self.previous_diagnostic.as_ref()
    }

    pub fn decoration_handles(&self) -> &[DecorationHandle] {
        &self.decoration_handles
    }
}
