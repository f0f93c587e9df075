//! Connection supervisor
//!
//! Owns the lifecycle of the single duplex channel to the service:
//!
//! ```text
//!   Disconnected ──poll tick──▶ Connecting ──opened──▶ Open
//!        ▲                          │                   │
//!        └────────── closed / error ┴───────────────────┘
//! ```
//!
//! The reconnect poll only runs while `Disconnected`. Sends are dropped, not
//! queued, unless the channel is `Open`; the update scheduler re-flushes
//! still-dirty state, which is the only retry mechanism.
//!
//! Every connection attempt gets a generation number. Events coming from an
//! older attempt's transport task are ignored, so a late `Closed` from a dead
//! socket can never tear down its replacement.

use crate::protocol::Outbound;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
}

/// Text frames handed to the transport task for writing.
pub type FrameSender = UnboundedSender<String>;

/// Something outbound messages can be handed to.
pub trait Outbox {
    fn is_open(&self) -> bool;

    /// Hand over an already encoded frame. Returns false if it was dropped.
    fn send_frame(&mut self, kind: &'static str, frame: String) -> bool;

    fn send(&mut self, msg: &Outbound) -> bool {
        if !self.is_open() {
            tracing::debug!("Dropping {} while not connected", msg.kind());
            return false;
        }
        match msg.encode() {
            Ok(frame) => self.send_frame(msg.kind(), frame),
            Err(e) => {
                tracing::error!("{}", e);
                false
            }
        }
    }
}

#[derive(Debug)]
pub struct ConnectionSupervisor {
    state: ConnectionState,
    sender: Option<FrameSender>,
    generation: u64,
    frames_sent: u64,
}

impl Default for ConnectionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSupervisor {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            sender: None,
            generation: 0,
            frames_sent: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Generation of the most recent connection attempt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Whether the reconnect poll should be running
    pub fn wants_reconnect_poll(&self) -> bool {
        self.state == ConnectionState::Disconnected
    }

    /// Called on a reconnect poll tick. Returns the generation for the new
    /// attempt, or `None` if a channel is already open or being opened.
    pub fn begin_connect(&mut self) -> Option<u64> {
        if self.state != ConnectionState::Disconnected {
            return None;
        }
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        tracing::info!("Connecting to service (attempt {})", self.generation);
        Some(self.generation)
    }

    /// The transport for `generation` finished its handshake.
    ///
    /// Immediately requests the authoritative project. Returns false if the
    /// event belongs to a stale attempt.
    pub fn on_open(&mut self, generation: u64, sender: FrameSender) -> bool {
        if generation != self.generation || self.state != ConnectionState::Connecting {
            tracing::debug!(
                "Ignoring open from stale connection attempt {} (current {})",
                generation,
                self.generation
            );
            return false;
        }
        self.sender = Some(sender);
        self.state = ConnectionState::Open;
        tracing::info!("Connected to service");
        self.send(&Outbound::FetchProject);
        true
    }

    /// The transport for `generation` closed or failed to connect.
    pub fn on_closed(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.state == ConnectionState::Disconnected {
            return false;
        }
        match self.state {
            ConnectionState::Open => tracing::warn!("Connection to service closed"),
            _ => tracing::info!("Service not reachable, will retry"),
        }
        self.sender = None;
        self.state = ConnectionState::Disconnected;
        true
    }

    /// Whether a frame from `generation` should be processed
    pub fn accepts_frames_from(&self, generation: u64) -> bool {
        generation == self.generation && self.state == ConnectionState::Open
    }

    /// Close the channel on teardown. Frames already handed over are still
    /// written by the transport before it closes the socket.
    pub fn close(&mut self) {
        if self.sender.take().is_some() {
            tracing::info!("Closing connection to service");
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl Outbox for ConnectionSupervisor {
    fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    fn send_frame(&mut self, kind: &'static str, frame: String) -> bool {
        let Some(sender) = self.sender.as_ref() else {
            tracing::debug!("Dropping {} while not connected", kind);
            return false;
        };
        if sender.send(frame).is_err() {
            // Transport task is gone; its Closed event may still be in flight.
            tracing::warn!("Transport gone while sending {}", kind);
            self.sender = None;
            self.state = ConnectionState::Disconnected;
            return false;
        }
        tracing::debug!("Sent {}", kind);
        self.frames_sent += 1;
        true
    }
}
