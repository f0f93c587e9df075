// Decoration surface that records every call made to it.

use shader_sync::decoration::{DecorationHandle, DecorationSpec, DecorationSurface};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Add { buffer: usize, lines: Vec<u32> },
    Remove { buffer: usize, handles: Vec<DecorationHandle> },
    Rerender { buffer: usize, handles: Vec<DecorationHandle> },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    /// Live decorations: handle -> (buffer, line)
    pub live: BTreeMap<DecorationHandle, (usize, u32)>,
    next: u64,
}

impl RecordingSurface {
    pub fn live_for(&self, buffer: usize) -> Vec<u32> {
        self.live
            .values()
            .filter(|(b, _)| *b == buffer)
            .map(|(_, line)| *line)
            .collect()
    }
}

impl DecorationSurface for RecordingSurface {
    fn add_decorations(
        &mut self,
        buffer_index: usize,
        specs: Vec<DecorationSpec>,
    ) -> Vec<DecorationHandle> {
        self.calls.push(SurfaceCall::Add {
            buffer: buffer_index,
            lines: specs.iter().map(|s| s.line).collect(),
        });
        specs
            .into_iter()
            .map(|spec| {
                self.next += 1;
                let handle = DecorationHandle(self.next);
                self.live.insert(handle, (buffer_index, spec.line));
                handle
            })
            .collect()
    }

    fn remove_decorations(&mut self, buffer_index: usize, handles: &[DecorationHandle]) {
        self.calls.push(SurfaceCall::Remove {
            buffer: buffer_index,
            handles: handles.to_vec(),
        });
        for handle in handles {
            if self.live.get(handle).map(|(b, _)| *b) == Some(buffer_index) {
                self.live.remove(handle);
            }
        }
    }

    fn rerender_decorations(
        &mut self,
        buffer_index: usize,
        handles: &[DecorationHandle],
        _specs: &[DecorationSpec],
    ) {
        self.calls.push(SurfaceCall::Rerender {
            buffer: buffer_index,
            handles: handles.to_vec(),
        });
    }
}
