use serde::{Deserialize, Serialize};

/// Opaque id for one decoration installed on an editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecorationHandle(pub u64);

/// Decoration face - defines the visual appearance of a line marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationFace {
    /// Whole-line highlight plus gutter glyph for compile errors
    ErrorLine,
    /// Whole-line highlight for warnings
    WarningLine,
    /// Anything the compiler reports that is neither
    InfoLine,
}

impl DecorationFace {
    /// CSS-style class name the hosting surface keys its styling on
    pub fn class_name(self) -> &'static str {
        match self {
            DecorationFace::ErrorLine => "diagnostic-line-error",
            DecorationFace::WarningLine => "diagnostic-line-warning",
            DecorationFace::InfoLine => "diagnostic-line-info",
        }
    }
}

/// Priority for decoration z-ordering
/// Higher priority decorations are rendered on top of lower priority ones
pub type Priority = i32;

/// A marker on one line of one buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub handle: DecorationHandle,

    pub buffer_index: usize,

    /// 1-based line number, as reported by the compiler
    pub line: u32,

    pub face: DecorationFace,

    /// Priority for z-ordering (higher = on top)
    pub priority: Priority,

    /// Hover text
    pub message: Option<String>,
}

/// What the editing surface must provide so diagnostics can be shown.
///
/// Handles returned by `add_decorations` are owned by the caller; the surface
/// never drops a decoration on its own.
pub trait DecorationSurface {
    /// Install one decoration per spec and return their handles, in order.
    fn add_decorations(
        &mut self,
        buffer_index: usize,
        specs: Vec<DecorationSpec>,
    ) -> Vec<DecorationHandle>;

    fn remove_decorations(&mut self, buffer_index: usize, handles: &[DecorationHandle]);

    /// Paint already-installed decorations again, e.g. after the buffer was
    /// moved to another pane. Must not invalidate `handles`.
    fn rerender_decorations(
        &mut self,
        buffer_index: usize,
        handles: &[DecorationHandle],
        specs: &[DecorationSpec],
    );
}

/// Everything needed to create a decoration except its handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationSpec {
    pub line: u32,
    pub face: DecorationFace,
    pub priority: Priority,
    pub message: String,
}

/// In-process decoration store.
///
/// Keeps decorations sorted by priority so the presentation layer can paint
/// them in order, and counts render passes so callers can tell a re-render
/// from a rebuild.
#[derive(Debug, Clone, Default)]
pub struct DecorationStore {
    decorations: Vec<Decoration>,
    next_handle: u64,
    render_passes: u64,
}

impl DecorationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get decorations for a buffer, sorted by priority
    pub fn for_buffer(&self, buffer_index: usize) -> Vec<&Decoration> {
        self.decorations
            .iter()
            .filter(|d| d.buffer_index == buffer_index)
            .collect()
    }

    /// Get decorations on a specific line of a buffer
    pub fn at_line(&self, buffer_index: usize, line: u32) -> Vec<&Decoration> {
        self.decorations
            .iter()
            .filter(|d| d.buffer_index == buffer_index && d.line == line)
            .collect()
    }

    pub fn get(&self, handle: DecorationHandle) -> Option<&Decoration> {
        self.decorations.iter().find(|d| d.handle == handle)
    }

    /// Get total number of decorations
    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    /// Check if there are any decorations
    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    /// Number of times installed decorations were painted again
    pub fn render_passes(&self) -> u64 {
        self.render_passes
    }

    /// Get all decorations (for rendering)
    pub fn all(&self) -> &[Decoration] {
        &self.decorations
    }
}

impl DecorationSurface for DecorationStore {
    fn add_decorations(
        &mut self,
        buffer_index: usize,
        specs: Vec<DecorationSpec>,
    ) -> Vec<DecorationHandle> {
        let mut handles = Vec::with_capacity(specs.len());
        for spec in specs {
            self.next_handle += 1;
            let handle = DecorationHandle(self.next_handle);
            self.decorations.push(Decoration {
                handle,
                buffer_index,
                line: spec.line,
                face: spec.face,
                priority: spec.priority,
                message: Some(spec.message),
            });
            handles.push(handle);
        }
        // Keep sorted by priority (ascending - lower priority first)
        self.decorations.sort_by_key(|d| d.priority);
        handles
    }

    fn remove_decorations(&mut self, buffer_index: usize, handles: &[DecorationHandle]) {
        self.decorations
            .retain(|d| !(d.buffer_index == buffer_index && handles.contains(&d.handle)));
    }

    fn rerender_decorations(
        &mut self,
        buffer_index: usize,
        handles: &[DecorationHandle],
        _specs: &[DecorationSpec],
    ) {
        tracing::trace!(
            "Re-rendering {} decorations for buffer {}",
            handles.len(),
            buffer_index
        );
        self.render_passes += 1;
    }
}
