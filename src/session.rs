//! Session state
//!
//! The single owner of everything the engine knows: the buffer list, the pane
//! layout and focus, the connection, the pending writes and the diagnostic
//! decorations. The presentation layer talks to it through intent methods and
//! reads [`SessionSnapshot`]s back; sub-components never touch each other's
//! fields, every mutation goes through a `Session` method.

use crate::buffer::{Buffer, ViewState};
use crate::config::Config;
use crate::connection::{ConnectionState, ConnectionSupervisor, FrameSender, Outbox};
use crate::decoration::{DecorationStore, DecorationSurface};
use crate::diagnostics::{self, DiagnosticRecord, ParsedDiagnostic, Reconciliation};
use crate::project::{ProjectData, ProjectMeta};
use crate::protocol::{
    decode_inbound, CompileFailedMsg, CompileSucceededMsg, Inbound, NewProjectMsg,
    NewProjectTemplate, Outbound, ProtocolError, SetProjectMsg,
};
use crate::scheduler::{FlushReport, UpdateScheduler};
use crate::version::{HistoryToken, VersionWindow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Identity of a visible editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(pub u32);

impl std::fmt::Display for PaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pane {}", self.0)
    }
}

/// One editing surface showing one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    id: PaneId,
    buffer_index: usize,
    /// View state to apply when the surface (re)mounts
    view_state: Option<ViewState>,
    /// `None` until the surface mounts with its starting history token
    version: Option<VersionWindow>,
}

impl Pane {
    fn new(id: PaneId, buffer_index: usize, view_state: Option<ViewState>) -> Self {
        Self {
            id,
            buffer_index,
            view_state,
            version: None,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }

    pub fn view_state(&self) -> Option<&ViewState> {
        self.view_state.as_ref()
    }

    pub fn version(&self) -> Option<&VersionWindow> {
        self.version.as_ref()
    }
}

/// Ordered panes plus the one holding input focus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    panes: Vec<Pane>,
    current: Option<PaneId>,
}

impl Layout {
    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn current(&self) -> Option<PaneId> {
        self.current
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.iter().find(|p| p.id == id)
    }

    fn pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes.iter_mut().find(|p| p.id == id)
    }
}

/// Requested layout, as sent by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub panes: Vec<PaneSpec>,
    #[serde(default)]
    pub current: Option<PaneId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneSpec {
    pub id: PaneId,
    pub buffer_index: usize,
}

/// Session error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownPane(PaneId),
    UnknownBuffer(usize),
    InvalidLayout(String),
    NoProject,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownPane(id) => write!(f, "Unknown {id}"),
            SessionError::UnknownBuffer(index) => write!(f, "Unknown buffer index {index}"),
            SessionError::InvalidLayout(msg) => write!(f, "Invalid layout: {msg}"),
            SessionError::NoProject => write!(f, "No project loaded"),
        }
    }
}

impl std::error::Error for SessionError {}

pub struct Session<D: DecorationSurface = DecorationStore> {
    buffers: Vec<Buffer>,
    layout: Layout,
    project: Option<ProjectData>,
    meta: ProjectMeta,
    connection: ConnectionSupervisor,
    scheduler: UpdateScheduler,
    decorations: D,
    next_diagnostic_id: u64,
    /// Buffers shown in a different pane since the last reconciliation
    reselected: BTreeSet<usize>,
    /// `FetchProject` went out on this connection and has not been answered
    awaiting_fetch: bool,
    /// Written while `awaiting_fetch`; the answer may predate these
    unconfirmed: BTreeSet<usize>,
    project_unconfirmed: bool,
    current_time: f64,
    preview_open: bool,
    last_error: Option<String>,
}

impl Session<DecorationStore> {
    pub fn new(config: &Config) -> Self {
        Self::with_surface(config, DecorationStore::new())
    }
}

impl<D: DecorationSurface> Session<D> {
    pub fn with_surface(config: &Config, decorations: D) -> Self {
        Self {
            buffers: Vec::new(),
            layout: Layout::default(),
            project: None,
            meta: ProjectMeta::default(),
            connection: ConnectionSupervisor::new(),
            scheduler: UpdateScheduler::new(config.max_project_payload_bytes),
            decorations,
            next_diagnostic_id: 0,
            reselected: BTreeSet::new(),
            awaiting_fetch: false,
            unconfirmed: BTreeSet::new(),
            project_unconfirmed: false,
            current_time: 0.0,
            preview_open: false,
            last_error: None,
        }
    }

    // ---- read access ------------------------------------------------------

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn buffer(&self, index: usize) -> Option<&Buffer> {
        self.buffers.get(index)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn connection(&self) -> &ConnectionSupervisor {
        &self.connection
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn decorations(&self) -> &D {
        &self.decorations
    }

    pub fn project(&self) -> Option<&ProjectData> {
        self.project.as_ref()
    }

    pub fn project_meta(&self) -> &ProjectMeta {
        &self.meta
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn preview_open(&self) -> bool {
        self.preview_open
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn undo_available(&self, pane: PaneId) -> bool {
        self.layout
            .pane(pane)
            .and_then(|p| p.version.as_ref())
            .is_some_and(|v| v.undo_available())
    }

    pub fn redo_available(&self, pane: PaneId) -> bool {
        self.layout
            .pane(pane)
            .and_then(|p| p.version.as_ref())
            .is_some_and(|v| v.redo_available())
    }

    // ---- connection events -----------------------------------------------

    /// Reconnect poll tick. Returns the generation to connect with, if any.
    pub fn begin_connect(&mut self) -> Option<u64> {
        self.connection.begin_connect()
    }

    /// The transport opened. `FetchProject` goes out first, then whatever
    /// was edited while disconnected, without waiting for the flush tick.
    pub fn connection_opened(&mut self, generation: u64, sender: FrameSender) {
        if !self.connection.on_open(generation, sender) {
            return;
        }
        self.awaiting_fetch = true;
        let report = self.flush();
        if !report.is_idle() {
            tracing::debug!("Sent offline edits after reconnect: {:?}", report);
        }
    }

    pub fn connection_closed(&mut self, generation: u64) {
        if !self.connection.on_closed(generation) {
            return;
        }
        // Writes the service may never have applied go out again next time
        for index in std::mem::take(&mut self.unconfirmed) {
            self.scheduler.mark_buffer(index);
        }
        if std::mem::take(&mut self.project_unconfirmed) {
            self.scheduler.mark_project();
        }
        self.awaiting_fetch = false;
    }

    /// A text frame arrived from the transport of `generation`.
    pub fn frame_received(&mut self, generation: u64, frame: &str) {
        if !self.connection.accepts_frames_from(generation) {
            tracing::debug!("Ignoring frame from stale connection {}", generation);
            return;
        }
        self.handle_frame(frame);
    }

    /// Decode and apply one inbound frame. Never fails: bad frames are logged.
    pub fn handle_frame(&mut self, frame: &str) {
        match decode_inbound(frame) {
            Ok(msg) => self.apply_inbound(msg),
            Err(ProtocolError::UnknownKind(kind)) => {
                tracing::warn!("Ignoring unknown message kind '{}'", kind);
            }
            Err(e) => tracing::warn!("Ignoring bad frame: {}", e),
        }
    }

    pub fn apply_inbound(&mut self, msg: Inbound) {
        tracing::debug!("Received {}", msg.kind());
        match msg {
            Inbound::SetProjectInline(msg) => self.load_project(&msg),
            Inbound::SetDmoTime(seconds) => self.current_time = seconds,
            Inbound::PreviewOpened => self.preview_open = true,
            Inbound::PreviewClosed => self.preview_open = false,
            Inbound::CompileSucceeded(CompileSucceededMsg { index }) => {
                self.compile_succeeded(index)
            }
            Inbound::CompileFailed(CompileFailedMsg {
                index,
                error_message,
            }) => self.compile_failed(index, error_message),
            Inbound::ShowErrorMessage(text) => {
                tracing::warn!("Service reported: {}", text);
                self.last_error = Some(text);
            }
        }
        self.reconcile_diagnostics();
    }

    /// Replace the whole buffer list with the service's project.
    fn load_project(&mut self, msg: &SetProjectMsg) {
        let mut data = match ProjectData::from_json(&msg.project_json) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Ignoring project snapshot: {}", e);
                return;
            }
        };

        let (kept, kept_settings) = self.take_unsynced_edits();
        if let Some(settings) = kept_settings.clone() {
            data.settings = settings;
        }

        // Old buffers go away together with their decorations
        for buffer in &mut self.buffers {
            let handles = std::mem::take(&mut buffer.decoration_handles);
            if !handles.is_empty() {
                self.decorations.remove_decorations(buffer.index, &handles);
            }
        }

        let sources = std::mem::take(&mut data.shader_sources);
        self.buffers = sources
            .into_iter()
            .enumerate()
            .map(|(index, content)| Buffer::new(index, data.shader_path(index), content))
            .collect();
        self.meta = ProjectMeta::from_message(msg);
        self.project = Some(data);
        self.scheduler.reset();
        self.reselected.clear();
        self.repair_layout();

        let mut restored = 0;
        for (index, content) in kept {
            let Some(buffer) = self.buffers.get_mut(index) else {
                tracing::warn!("Dropping local edit to buffer {}, no longer in the project", index);
                continue;
            };
            if buffer.content != content {
                buffer.content = content;
                self.scheduler.mark_buffer(index);
                restored += 1;
            }
        }
        if kept_settings.is_some() {
            self.scheduler.mark_project();
        }
        if restored > 0 {
            tracing::info!("Kept {} local edits newer than the fetched project", restored);
        }

        tracing::info!(
            "Loaded project with {} buffers{}",
            self.buffers.len(),
            self.meta
                .project_root
                .as_ref()
                .map(|p| format!(" from {}", p.display()))
                .unwrap_or_default()
        );
    }

    /// Local edits an answer to our own `FetchProject` may not include: those
    /// still pending plus those written while the fetch was outstanding.
    /// Any other project load replaces them.
    fn take_unsynced_edits(&mut self) -> (Vec<(usize, String)>, Option<serde_json::Value>) {
        let unconfirmed = std::mem::take(&mut self.unconfirmed);
        let project_unconfirmed = std::mem::take(&mut self.project_unconfirmed);
        if !std::mem::take(&mut self.awaiting_fetch) {
            return (Vec::new(), None);
        }

        let indices: BTreeSet<usize> = unconfirmed
            .into_iter()
            .chain(self.scheduler.pending().touched())
            .collect();
        let kept = indices
            .into_iter()
            .filter_map(|i| self.buffers.get(i).map(|b| (i, b.content.clone())))
            .collect();
        let settings = if project_unconfirmed || self.scheduler.project_dirty() {
            self.project.as_ref().map(|p| p.settings.clone())
        } else {
            None
        };
        (kept, settings)
    }

    /// Keep every pane pointing at an existing buffer after a project load.
    fn repair_layout(&mut self) {
        let count = self.buffers.len();
        if count == 0 {
            self.layout = Layout::default();
            return;
        }
        if self.layout.panes.is_empty() {
            self.layout.panes.push(Pane::new(PaneId(0), 0, None));
            self.layout.current = Some(PaneId(0));
        }
        for pane in &mut self.layout.panes {
            if pane.buffer_index >= count {
                pane.buffer_index = 0;
            }
            // The surfaces remount with the new content, so history restarts
            pane.version = None;
            pane.view_state = None;
        }
    }

    fn compile_succeeded(&mut self, index: Option<usize>) {
        match index {
            None => {
                for buffer in &mut self.buffers {
                    buffer.set_diagnostic(None);
                }
            }
            Some(index) => match self.buffers.get_mut(index) {
                Some(buffer) => buffer.set_diagnostic(None),
                None => tracing::warn!("Compile success for unknown buffer {}", index),
            },
        }
    }

    fn compile_failed(&mut self, index: usize, text: String) {
        let Some(buffer) = self.buffers.get_mut(index) else {
            tracing::warn!("Compile failure for unknown buffer {}", index);
            return;
        };
        if buffer.diagnostic.as_ref().is_some_and(|d| d.text == text) {
            // Same failure reported again on a recompile tick
            return;
        }
        self.next_diagnostic_id += 1;
        buffer.set_diagnostic(Some(DiagnosticRecord {
            id: self.next_diagnostic_id,
            text,
        }));
    }

    /// Run the diagnostics mapper over every buffer.
    pub fn reconcile_diagnostics(&mut self) -> Vec<(usize, Reconciliation)> {
        let reselected = std::mem::take(&mut self.reselected);
        let mut changes = Vec::new();
        for buffer in &mut self.buffers {
            let selection_changed = reselected.contains(&buffer.index);
            let result = diagnostics::reconcile(buffer, selection_changed, &mut self.decorations);
            if result != Reconciliation::Unchanged {
                changes.push((buffer.index, result));
            }
        }
        changes
    }

    // ---- timers -----------------------------------------------------------

    /// Flush tick: send pending edits.
    pub fn flush(&mut self) -> FlushReport {
        let project = if self.scheduler.project_dirty() {
            self.project_message()
        } else {
            None
        };
        let before: Vec<usize> = if self.awaiting_fetch {
            self.scheduler.pending().touched().collect()
        } else {
            Vec::new()
        };

        let report = self
            .scheduler
            .flush(&self.buffers, project, &mut self.connection);

        if self.awaiting_fetch {
            let pending = self.scheduler.pending();
            self.unconfirmed
                .extend(before.into_iter().filter(|i| !pending.contains(*i)));
            self.project_unconfirmed |= report.project_sent;
        }
        report
    }

    /// Secondary poll tick: ask for the playhead position.
    pub fn poll_time(&mut self) {
        if self.connection.is_open() {
            self.connection.send(&Outbound::GetDmoTime);
        }
    }

    /// Current whole-project message with buffer contents folded back in.
    pub fn project_message(&self) -> Option<SetProjectMsg> {
        let mut data = self.project.clone()?;
        data.shader_sources = self.buffers.iter().map(|b| b.content.clone()).collect();
        match self.meta.to_message(&data) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }

    // ---- presentation intents -------------------------------------------

    pub fn edit_buffer(&mut self, index: usize, content: String) -> Result<(), SessionError> {
        let buffer = self
            .buffers
            .get_mut(index)
            .ok_or(SessionError::UnknownBuffer(index))?;
        buffer.content = content;
        self.scheduler.mark_buffer(index);
        Ok(())
    }

    /// Edit coming from a pane's surface together with its new history token.
    pub fn edit_in_pane(
        &mut self,
        pane: PaneId,
        content: String,
        token: HistoryToken,
    ) -> Result<(), SessionError> {
        let index = self
            .layout
            .pane(pane)
            .ok_or(SessionError::UnknownPane(pane))?
            .buffer_index;
        self.edit_buffer(index, content)?;
        self.history_changed(pane, token)
    }

    /// Show `buffer_index` in `pane`, restoring that buffer's saved view.
    pub fn select_pane(&mut self, pane: PaneId, buffer_index: usize) -> Result<(), SessionError> {
        let saved = self
            .buffers
            .get(buffer_index)
            .ok_or(SessionError::UnknownBuffer(buffer_index))?
            .saved_view_state
            .clone();
        let target = self
            .layout
            .pane_mut(pane)
            .ok_or(SessionError::UnknownPane(pane))?;
        if target.buffer_index == buffer_index {
            return Ok(());
        }
        target.buffer_index = buffer_index;
        target.view_state = saved;
        target.version = None;
        self.reselected.insert(buffer_index);
        self.reconcile_diagnostics();
        Ok(())
    }

    pub fn focus_pane(&mut self, pane: PaneId) -> Result<(), SessionError> {
        if self.layout.pane(pane).is_none() {
            return Err(SessionError::UnknownPane(pane));
        }
        self.layout.current = Some(pane);
        Ok(())
    }

    /// The pane lost focus; remember where its buffer was scrolled to.
    pub fn blur_pane(&mut self, pane: PaneId, view_state: ViewState) -> Result<(), SessionError> {
        let target = self
            .layout
            .pane_mut(pane)
            .ok_or(SessionError::UnknownPane(pane))?;
        target.view_state = Some(view_state.clone());
        let index = target.buffer_index;
        if let Some(buffer) = self.buffers.get_mut(index) {
            buffer.saved_view_state = Some(view_state);
        }
        if self.layout.current == Some(pane) {
            self.layout.current = None;
        }
        Ok(())
    }

    /// Replace the pane layout. Panes keeping their buffer keep their view
    /// and history; all others start from the buffer's saved view.
    pub fn set_layout(&mut self, descriptor: LayoutDescriptor) -> Result<(), SessionError> {
        let mut seen = BTreeSet::new();
        for spec in &descriptor.panes {
            if !seen.insert(spec.id) {
                return Err(SessionError::InvalidLayout(format!(
                    "duplicate {}",
                    spec.id
                )));
            }
            if spec.buffer_index >= self.buffers.len() {
                return Err(SessionError::UnknownBuffer(spec.buffer_index));
            }
        }
        if let Some(current) = descriptor.current {
            if !seen.contains(&current) {
                return Err(SessionError::UnknownPane(current));
            }
        }

        let mut old = std::mem::take(&mut self.layout.panes);
        let mut panes = Vec::with_capacity(descriptor.panes.len());
        for spec in descriptor.panes {
            let kept = old
                .iter()
                .position(|p| p.id == spec.id && p.buffer_index == spec.buffer_index)
                .map(|i| old.swap_remove(i));
            let pane = match kept {
                Some(pane) => pane,
                None => {
                    self.reselected.insert(spec.buffer_index);
                    let saved = self.buffers[spec.buffer_index].saved_view_state.clone();
                    Pane::new(spec.id, spec.buffer_index, saved)
                }
            };
            panes.push(pane);
        }
        self.layout = Layout {
            panes,
            current: descriptor.current,
        };
        self.reconcile_diagnostics();
        Ok(())
    }

    /// A pane's editing surface mounted and reported its starting token.
    pub fn mount_editor(&mut self, pane: PaneId, token: HistoryToken) -> Result<(), SessionError> {
        let target = self
            .layout
            .pane_mut(pane)
            .ok_or(SessionError::UnknownPane(pane))?;
        target.version = Some(VersionWindow::mount(token));
        Ok(())
    }

    /// A pane's editing surface changed and reported its new history token.
    pub fn history_changed(&mut self, pane: PaneId, token: HistoryToken) -> Result<(), SessionError> {
        let target = self
            .layout
            .pane_mut(pane)
            .ok_or(SessionError::UnknownPane(pane))?;
        match target.version.as_mut() {
            Some(window) => window.record(token),
            None => target.version = Some(VersionWindow::mount(token)),
        }
        Ok(())
    }

    /// Move the playhead. Sent right away, not batched.
    pub fn set_time(&mut self, seconds: f64) {
        self.current_time = seconds;
        self.connection.send(&Outbound::SetDmoTime(seconds));
    }

    pub fn toggle_preview(&mut self) {
        let msg = if self.preview_open {
            Outbound::StopPreview
        } else {
            Outbound::StartPreview
        };
        self.connection.send(&msg);
    }

    /// Replace the project settings; sent with the next whole-project upsert.
    pub fn set_settings(&mut self, settings: serde_json::Value) -> Result<(), SessionError> {
        let project = self
            .project
            .as_mut()
            .ok_or(SessionError::NoProject)?;
        project.settings = settings;
        self.scheduler.mark_project();
        Ok(())
    }

    pub fn save_project(&mut self) {
        self.connection.send(&Outbound::SaveProject);
    }

    pub fn reload_project(&mut self) {
        self.connection.send(&Outbound::ReloadProject);
    }

    pub fn open_project_dialog(&mut self) {
        self.connection.send(&Outbound::OpenProjectDialog);
    }

    pub fn new_project(&mut self, template: NewProjectTemplate) {
        self.connection
            .send(&Outbound::NewProject(NewProjectMsg { template }));
    }

    /// Ask the service to exit. The only terminal action.
    pub fn exit_app(&mut self) {
        self.connection.send(&Outbound::ExitApp);
    }

    /// Close the channel. Timers belong to the runtime and are dropped there.
    pub fn teardown(&mut self) {
        self.connection.close();
    }

    // ---- snapshot ---------------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        let pending = self.scheduler.pending();
        SessionSnapshot {
            connection_state: self.connection.state(),
            buffers: self
                .buffers
                .iter()
                .map(|b| BufferSnapshot {
                    index: b.index,
                    file_path: b.file_path.clone(),
                    content: b.content.clone(),
                    diagnostic: b.diagnostic.clone(),
                    diagnostics: b.diagnostic_entries.clone(),
                    dirty: pending.contains(b.index),
                })
                .collect(),
            panes: self
                .layout
                .panes
                .iter()
                .map(|p| PaneSnapshot {
                    id: p.id,
                    buffer_index: p.buffer_index,
                    focused: self.layout.current == Some(p.id),
                    view_state: p.view_state.clone(),
                    undo_available: p.version.as_ref().is_some_and(|v| v.undo_available()),
                    redo_available: p.version.as_ref().is_some_and(|v| v.redo_available()),
                })
                .collect(),
            current_pane: self.layout.current,
            current_time: self.current_time,
            preview_open: self.preview_open,
            last_error: self.last_error.clone(),
            project_root: self.meta.project_root.clone(),
        }
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub connection_state: ConnectionState,
    pub buffers: Vec<BufferSnapshot>,
    pub panes: Vec<PaneSnapshot>,
    pub current_pane: Option<PaneId>,
    pub current_time: f64,
    pub preview_open: bool,
    pub last_error: Option<String>,
    pub project_root: Option<PathBuf>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            connection_state: ConnectionState::Disconnected,
            buffers: Vec::new(),
            panes: Vec::new(),
            current_pane: None,
            current_time: 0.0,
            preview_open: false,
            last_error: None,
            project_root: None,
        }
    }
}

impl SessionSnapshot {
    pub fn pane(&self, id: PaneId) -> Option<&PaneSnapshot> {
        self.panes.iter().find(|p| p.id == id)
    }

    pub fn undo_available(&self, pane: PaneId) -> bool {
        self.pane(pane).is_some_and(|p| p.undo_available)
    }

    pub fn redo_available(&self, pane: PaneId) -> bool {
        self.pane(pane).is_some_and(|p| p.redo_available)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferSnapshot {
    pub index: usize,
    pub file_path: String,
    pub content: String,
    pub diagnostic: Option<DiagnosticRecord>,
    pub diagnostics: Vec<ParsedDiagnostic>,
    /// Edited locally and not yet flushed
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSnapshot {
    pub id: PaneId,
    pub buffer_index: usize,
    pub focused: bool,
    pub view_state: Option<ViewState>,
    pub undo_available: bool,
    pub redo_available: bool,
}
