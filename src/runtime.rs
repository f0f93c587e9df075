//! Event loop driving a [`Session`].
//!
//! Everything runs on one task: timer ticks, transport events and
//! presentation intents are interleaved by a single `select!`, so no two of
//! them ever touch the session at the same time. Timers are plain
//! [`Interval`]s; dropping one cancels it.

use crate::buffer::ViewState;
use crate::config::Config;
use crate::connection::FrameSender;
use crate::protocol::NewProjectTemplate;
use crate::session::{LayoutDescriptor, PaneId, Session, SessionError, SessionSnapshot};
use crate::version::HistoryToken;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};

/// How long teardown waits for the transport to write what it was handed
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Something the presentation layer asks the session to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    EditBuffer {
        index: usize,
        content: String,
    },
    EditInPane {
        pane: PaneId,
        content: String,
        token: HistoryToken,
    },
    SelectPane {
        pane: PaneId,
        buffer_index: usize,
    },
    FocusPane {
        pane: PaneId,
    },
    BlurPane {
        pane: PaneId,
        view_state: ViewState,
    },
    SetLayout {
        layout: LayoutDescriptor,
    },
    MountEditor {
        pane: PaneId,
        token: HistoryToken,
    },
    HistoryChanged {
        pane: PaneId,
        token: HistoryToken,
    },
    SetTime {
        seconds: f64,
    },
    TogglePreview,
    SetSettings {
        settings: serde_json::Value,
    },
    SaveProject,
    ReloadProject,
    OpenProjectDialog,
    NewProject {
        template: NewProjectTemplate,
    },
    /// Ask the service to exit, then tear down
    ExitApp,
    /// Tear down without telling the service
    Shutdown,
}

/// Reported by a transport task back to the loop.
#[derive(Debug)]
pub enum ConnectionEvent {
    Opened { generation: u64, sender: FrameSender },
    Frame { generation: u64, text: String },
    Closed { generation: u64 },
}

/// Opens connections. Each call starts one attempt in the background and
/// must eventually report `Closed` for `generation`, whether or not the
/// attempt ever opened.
pub trait Connector {
    fn connect(
        &self,
        endpoint: &str,
        generation: u64,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> JoinHandle<()>;
}

/// Run the session until shutdown.
///
/// Snapshots are published on `snapshots` after every event that can change
/// what the presentation layer sees.
pub async fn run<C: Connector>(
    config: Config,
    connector: C,
    mut intents: mpsc::UnboundedReceiver<Intent>,
    snapshots: watch::Sender<SessionSnapshot>,
) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    let mut session = Session::new(&config);
    let (event_tx, mut events) = mpsc::unbounded_channel();
    let mut transport: Option<JoinHandle<()>> = None;

    // First reconnect tick fires right away
    let mut reconnect = Some(interval(config.reconnect_interval()));
    let mut flush = periodic(config.flush_interval());
    let mut time_poll = periodic(config.time_poll_interval());

    tracing::info!("Session started, service at {}", config.endpoint);

    // Time polls and idle flushes leave the session as it was; skip the
    // snapshot after those
    let mut changed = true;
    loop {
        sync_reconnect_timer(&session, &mut reconnect, config.reconnect_interval());
        if changed {
            publish(&session, &snapshots);
        }

        changed = tokio::select! {
            _ = tick_optional(&mut reconnect) => {
                match session.begin_connect() {
                    Some(generation) => {
                        transport = Some(connector.connect(&config.endpoint, generation, event_tx.clone()));
                        true
                    }
                    None => false,
                }
            }
            _ = flush.tick() => {
                let report = session.flush();
                if !report.is_idle() {
                    tracing::debug!("Flush: {:?}", report);
                }
                !report.is_idle()
            }
            _ = time_poll.tick() => {
                session.poll_time();
                false
            }
            Some(event) = events.recv() => {
                apply_event(&mut session, event);
                true
            }
            intent = intents.recv() => match intent {
                None => {
                    tracing::info!("Intent channel closed");
                    break;
                }
                Some(Intent::Shutdown) => break,
                Some(Intent::ExitApp) => {
                    session.exit_app();
                    break;
                }
                Some(intent) => {
                    if let Err(e) = apply_intent(&mut session, intent) {
                        tracing::warn!("Rejected intent: {}", e);
                    }
                    true
                }
            },
        };
    }

    drop(reconnect);
    drop(flush);
    drop(time_poll);
    session.teardown();
    publish(&session, &snapshots);

    if let Some(handle) = transport {
        if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
            tracing::warn!("Transport did not finish within {:?}", SHUTDOWN_GRACE);
        }
    }
    tracing::info!("Session stopped");
    Ok(())
}

fn periodic(period: Duration) -> Interval {
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Run the reconnect poll only while disconnected.
fn sync_reconnect_timer(session: &Session, timer: &mut Option<Interval>, period: Duration) {
    let wanted = session.connection().wants_reconnect_poll();
    match (wanted, timer.is_some()) {
        (true, false) => *timer = Some(periodic(period)),
        (false, true) => *timer = None,
        _ => {}
    }
}

async fn tick_optional(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn publish(session: &Session, snapshots: &watch::Sender<SessionSnapshot>) {
    let snapshot = session.snapshot();
    snapshots.send_if_modified(|current| {
        if *current == snapshot {
            false
        } else {
            *current = snapshot;
            true
        }
    });
}

fn apply_event(session: &mut Session, event: ConnectionEvent) {
    match event {
        ConnectionEvent::Opened { generation, sender } => {
            session.connection_opened(generation, sender)
        }
        ConnectionEvent::Frame { generation, text } => session.frame_received(generation, &text),
        ConnectionEvent::Closed { generation } => session.connection_closed(generation),
    }
}

/// Apply one presentation intent. `ExitApp` and `Shutdown` are handled by the
/// loop and are no-ops here.
pub fn apply_intent(session: &mut Session, intent: Intent) -> Result<(), SessionError> {
    match intent {
        Intent::EditBuffer { index, content } => session.edit_buffer(index, content),
        Intent::EditInPane {
            pane,
            content,
            token,
        } => session.edit_in_pane(pane, content, token),
        Intent::SelectPane { pane, buffer_index } => session.select_pane(pane, buffer_index),
        Intent::FocusPane { pane } => session.focus_pane(pane),
        Intent::BlurPane { pane, view_state } => session.blur_pane(pane, view_state),
        Intent::SetLayout { layout } => session.set_layout(layout),
        Intent::MountEditor { pane, token } => session.mount_editor(pane, token),
        Intent::HistoryChanged { pane, token } => session.history_changed(pane, token),
        Intent::SetTime { seconds } => {
            session.set_time(seconds);
            Ok(())
        }
        Intent::TogglePreview => {
            session.toggle_preview();
            Ok(())
        }
        Intent::SetSettings { settings } => session.set_settings(settings),
        Intent::SaveProject => {
            session.save_project();
            Ok(())
        }
        Intent::ReloadProject => {
            session.reload_project();
            Ok(())
        }
        Intent::OpenProjectDialog => {
            session.open_project_dialog();
            Ok(())
        }
        Intent::NewProject { template } => {
            session.new_project(template);
            Ok(())
        }
        Intent::ExitApp | Intent::Shutdown => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_json_shape() {
        let intent: Intent =
            serde_json::from_str(r#"{"intent":"edit_buffer","index":0,"content":"void main(){}"}"#)
                .unwrap();
        assert_eq!(
            intent,
            Intent::EditBuffer {
                index: 0,
                content: "void main(){}".to_string()
            }
        );

        let intent: Intent = serde_json::from_str(
            r#"{"intent":"set_layout","layout":{"panes":[{"id":0,"buffer_index":1}],"current":0}}"#,
        )
        .unwrap();
        assert!(matches!(intent, Intent::SetLayout { .. }));

        let intent: Intent =
            serde_json::from_str(r#"{"intent":"new_project","template":"ShadertoyTunnel"}"#)
                .unwrap();
        assert_eq!(
            intent,
            Intent::NewProject {
                template: NewProjectTemplate::ShadertoyTunnel
            }
        );
    }

    #[test]
    fn test_rejected_intent_reports_error() {
        let mut session = Session::new(&Config::default());
        assert_eq!(
            apply_intent(&mut session, Intent::FocusPane { pane: PaneId(3) }),
            Err(SessionError::UnknownPane(PaneId(3)))
        );
        assert_eq!(
            apply_intent(&mut session, Intent::SetSettings { settings: serde_json::json!({}) }),
            Err(SessionError::NoProject)
        );
    }
}
