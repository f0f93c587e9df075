//! Update scheduler
//!
//! Edits are never sent as they happen. Each edit marks its buffer dirty and a
//! fixed-period flush sends one `SetBuffer` per touched buffer with the
//! content as of the flush, so a burst of keystrokes becomes a single write.
//!
//! A flush while the channel is not open sends nothing and keeps everything
//! dirty; the next tick tries again. Whole-project upserts ride the same
//! cycle but are dropped with a warning when their payload exceeds the
//! configured cap.

use crate::buffer::Buffer;
use crate::connection::Outbox;
use crate::protocol::{Outbound, SetBufferMsg, SetProjectMsg};
use std::collections::BTreeSet;

/// Buffers edited since the last successful flush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingWriteSet {
    dirty: bool,
    touched: BTreeSet<usize>,
}

impl PendingWriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, index: usize) {
        self.dirty = true;
        self.touched.insert(index);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn contains(&self, index: usize) -> bool {
        self.touched.contains(&index)
    }

    pub fn touched(&self) -> impl Iterator<Item = usize> + '_ {
        self.touched.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.touched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    pub fn clear(&mut self) {
        self.dirty = false;
        self.touched.clear();
    }

    fn remove(&mut self, index: usize) {
        self.touched.remove(&index);
        self.dirty = !self.touched.is_empty();
    }
}

/// Outcome of one flush tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub buffers_sent: usize,
    pub project_sent: bool,
    /// Payload size of a project upsert that was over the cap and dropped
    pub project_dropped: Option<usize>,
    /// Nothing could be sent; pending state was kept for the next tick
    pub deferred: bool,
}

impl FlushReport {
    pub fn is_idle(&self) -> bool {
        *self == FlushReport::default()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    pending: PendingWriteSet,
    project_dirty: bool,
    max_project_bytes: usize,
}

impl UpdateScheduler {
    pub fn new(max_project_bytes: usize) -> Self {
        Self {
            pending: PendingWriteSet::new(),
            project_dirty: false,
            max_project_bytes,
        }
    }

    pub fn pending(&self) -> &PendingWriteSet {
        &self.pending
    }

    pub fn project_dirty(&self) -> bool {
        self.project_dirty
    }

    pub fn max_project_bytes(&self) -> usize {
        self.max_project_bytes
    }

    pub fn mark_buffer(&mut self, index: usize) {
        self.pending.mark(index);
    }

    pub fn mark_project(&mut self) {
        self.project_dirty = true;
    }

    /// Forget everything pending, e.g. after the service sent a new project.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.project_dirty = false;
    }

    /// Send pending writes.
    ///
    /// `project` is the current whole-project message; it is only consulted
    /// when the project is dirty. Buffer content is read at flush time.
    pub fn flush(
        &mut self,
        buffers: &[Buffer],
        project: Option<SetProjectMsg>,
        outbox: &mut dyn Outbox,
    ) -> FlushReport {
        let mut report = FlushReport::default();
        if !self.pending.is_dirty() && !self.project_dirty {
            return report;
        }
        if !outbox.is_open() {
            tracing::debug!(
                "Flush deferred, not connected ({} buffers pending)",
                self.pending.len()
            );
            report.deferred = true;
            return report;
        }

        let touched: Vec<usize> = self.pending.touched().collect();
        for index in touched {
            let Some(buffer) = buffers.get(index) else {
                // Buffer list was replaced since the edit
                self.pending.remove(index);
                continue;
            };
            let msg = Outbound::SetBuffer(SetBufferMsg {
                index,
                content: buffer.content().to_string(),
            });
            if !outbox.send(&msg) {
                report.deferred = true;
                return report;
            }
            self.pending.remove(index);
            report.buffers_sent += 1;
        }

        if self.project_dirty {
            match project {
                Some(msg) => self.flush_project(msg, outbox, &mut report),
                None => {
                    tracing::warn!("Project marked dirty but no project is loaded");
                    self.project_dirty = false;
                }
            }
        }

        report
    }

    fn flush_project(&mut self, msg: SetProjectMsg, outbox: &mut dyn Outbox, report: &mut FlushReport) {
        let outbound = Outbound::SetProjectInline(msg);
        let frame = outbound.to_envelope().and_then(|envelope| {
            let size = envelope.payload.len();
            envelope.to_frame().map(|frame| (size, frame))
        });
        let (size, frame) = match frame {
            Ok(sized) => sized,
            Err(e) => {
                tracing::error!("{}", e);
                self.project_dirty = false;
                return;
            }
        };

        // The cap applies to the payload, not to the escaped envelope around it
        if size > self.max_project_bytes {
            tracing::warn!(
                "Project upsert of {} bytes exceeds the {} byte limit, not sending",
                size,
                self.max_project_bytes
            );
            report.project_dropped = Some(size);
            self.project_dirty = false;
            return;
        }

        if outbox.send_frame(outbound.kind(), frame) {
            report.project_sent = true;
            self.project_dirty = false;
        } else {
            report.deferred = true;
        }
    }
}
