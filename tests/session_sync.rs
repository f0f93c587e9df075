// End-to-end tests driving a Session the way the runtime does: frames in,
// intents in, flush ticks, and frames out on the connection channel.

mod common;

use common::fixtures::{
    compile_failed, compile_succeeded, frame, project_data, project_frame, project_frame_from,
    ServicePeer,
};
use common::surface::{RecordingSurface, SurfaceCall};
use shader_sync::buffer::ViewState;
use shader_sync::config::Config;
use shader_sync::connection::ConnectionState;
use shader_sync::decoration::DecorationFace;
use shader_sync::project::ProjectData;
use shader_sync::protocol::SetProjectMsg;
use shader_sync::session::{LayoutDescriptor, PaneId, PaneSpec, Session};
use shader_sync::version::HistoryToken;

fn loaded_session(sources: &[&str]) -> (Session, ServicePeer) {
    common::tracing::init_tracing_from_env();
    let mut session = Session::new(&Config::default());
    let peer = ServicePeer::connect(&mut session);
    session.handle_frame(&project_frame(sources));
    (session, peer)
}

#[test]
fn test_idle_flush_sends_nothing() {
    let (mut session, mut peer) = loaded_session(&["a", "b"]);

    session.edit_buffer(0, "a2".into()).unwrap();
    assert_eq!(session.flush().buffers_sent, 1);
    assert_eq!(peer.kinds(), vec!["SetBuffer"]);

    assert!(session.flush().is_idle());
    assert!(peer.drain().is_empty());
}

#[test]
fn test_keystroke_burst_becomes_one_write() {
    let (mut session, mut peer) = loaded_session(&["", "x"]);

    let mut text = String::new();
    for c in "void main() { gl_FragColor = vec4(1.0); }".chars() {
        text.push(c);
        session.edit_buffer(0, text.clone()).unwrap();
    }
    session.flush();

    let writes = peer.buffer_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].index, 0);
    assert_eq!(writes[0].content, text);
}

#[test]
fn test_edit_while_disconnected_is_sent_after_reconnect() {
    let (mut session, _peer) = loaded_session(&["a", "b"]);

    let generation = session.connection().generation();
    session.connection_closed(generation);
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);

    session.edit_buffer(1, "b while offline".into()).unwrap();
    let report = session.flush();
    assert!(report.deferred);
    assert!(session.snapshot().buffers[1].dirty);

    // Still nothing while the attempt is in progress
    let generation = session.begin_connect().unwrap();
    assert!(session.flush().deferred);

    // Sent right behind the fetch, no flush tick needed
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    session.connection_opened(generation, tx);
    let mut peer = ServicePeer::from_receiver(rx);

    let frames = peer.drain();
    let kinds: Vec<_> = frames.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["FetchProject", "SetBuffer"]);
    assert!(frames[1].payload.contains("b while offline"));
    assert!(!session.snapshot().buffers[1].dirty);
    assert!(session.flush().is_idle());
}

fn reconnect(session: &mut Session) -> ServicePeer {
    let generation = session.connection().generation();
    session.connection_closed(generation);
    let generation = session.begin_connect().unwrap();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    session.connection_opened(generation, tx);
    ServicePeer::from_receiver(rx)
}

#[test]
fn test_stale_fetch_answer_keeps_offline_edit() {
    let (mut session, _peer) = loaded_session(&["a", "b"]);
    let generation = session.connection().generation();
    session.connection_closed(generation);
    session.edit_buffer(1, "offline edit".into()).unwrap();

    let generation = session.begin_connect().unwrap();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    session.connection_opened(generation, tx);
    let mut peer = ServicePeer::from_receiver(rx);
    assert_eq!(peer.kinds(), vec!["FetchProject", "SetBuffer"]);

    // The service answered the fetch before applying the write
    session.handle_frame(&project_frame(&["a", "b"]));
    assert_eq!(session.buffer(1).unwrap().content(), "offline edit");
    assert!(session.snapshot().buffers[1].dirty);
    assert!(!session.snapshot().buffers[0].dirty);

    session.flush();
    let writes = peer.buffer_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].index, 1);
    assert_eq!(writes[0].content, "offline edit");
}

#[test]
fn test_edit_pending_when_fetch_answer_arrives_is_kept() {
    let (mut session, _peer) = loaded_session(&["a", "b"]);
    let mut peer = reconnect(&mut session);
    assert_eq!(peer.kinds(), vec!["FetchProject"]);

    session.edit_buffer(0, "typed while fetching".into()).unwrap();
    session.handle_frame(&project_frame(&["a", "b"]));

    assert_eq!(session.buffer(0).unwrap().content(), "typed while fetching");
    session.flush();
    let writes = peer.buffer_writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].content, "typed while fetching");
}

#[test]
fn test_write_lost_with_connection_is_sent_again() {
    let (mut session, _peer) = loaded_session(&["a", "b"]);
    let generation = session.connection().generation();
    session.connection_closed(generation);
    session.edit_buffer(1, "offline edit".into()).unwrap();

    // Written behind the fetch, then the connection drops before any answer
    let mut first = reconnect(&mut session);
    assert_eq!(first.kinds(), vec!["FetchProject", "SetBuffer"]);
    let mut second = reconnect(&mut session);
    assert!(first.drain().is_empty());

    let frames = second.drain();
    let kinds: Vec<_> = frames.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["FetchProject", "SetBuffer"]);
    assert!(frames[1].payload.contains("offline edit"));
}

#[test]
fn test_pushed_project_replaces_pending_edits() {
    let (mut session, mut peer) = loaded_session(&["a", "b"]);
    session.edit_buffer(1, "local".into()).unwrap();

    // Not an answer to a fetch: the service loaded another project
    session.handle_frame(&project_frame(&["x", "y"]));
    assert_eq!(session.buffer(1).unwrap().content(), "y");
    assert!(!session.snapshot().buffers[1].dirty);
    assert!(session.flush().is_idle());
    assert!(peer.drain().is_empty());
}

#[test]
fn test_same_diagnostic_twice_touches_nothing() {
    let mut session = Session::with_surface(&Config::default(), RecordingSurface::default());
    session.handle_frame(&project_frame(&["a", "b"]));

    let failure = compile_failed(1, "0(3) : error C0000: syntax error, unexpected '}'");
    session.handle_frame(&failure);
    assert_eq!(
        session.decorations().calls,
        vec![SurfaceCall::Add {
            buffer: 1,
            lines: vec![3]
        }]
    );

    session.handle_frame(&failure);
    assert_eq!(session.decorations().calls.len(), 1);
}

#[test]
fn test_clearing_one_buffer_leaves_others_alone() {
    let mut session = Session::with_surface(&Config::default(), RecordingSurface::default());
    session.handle_frame(&project_frame(&["a", "b"]));
    session.handle_frame(&compile_failed(0, "0(1) : error C0000: a\n0(7) : warning C7022: b"));
    session.handle_frame(&compile_failed(1, "0(4) : error C1008: undefined variable"));
    assert_eq!(session.decorations().live_for(0), vec![1, 7]);
    assert_eq!(session.decorations().live_for(1), vec![4]);

    session.handle_frame(&compile_succeeded(Some(0)));

    assert!(session.decorations().live_for(0).is_empty());
    assert_eq!(session.decorations().live_for(1), vec![4]);
    let removes: Vec<_> = session
        .decorations()
        .calls
        .iter()
        .filter(|c| matches!(c, SurfaceCall::Remove { .. }))
        .collect();
    assert_eq!(removes.len(), 1);
    assert!(matches!(removes[0], SurfaceCall::Remove { buffer: 0, .. }));
}

#[test]
fn test_changed_diagnostic_replaces_decorations() {
    let (mut session, _peer) = loaded_session(&["a"]);
    session.handle_frame(&compile_failed(0, "0(2) : error C0000: first"));
    session.handle_frame(&compile_failed(0, "0(5) : warning C7502: second"));

    let markers = session.decorations().for_buffer(0);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].line, 5);
    assert_eq!(markers[0].face, DecorationFace::WarningLine);
}

#[test]
fn test_history_window_scenario() {
    let (mut session, _peer) = loaded_session(&["a"]);
    let pane = PaneId(0);

    session.mount_editor(pane, HistoryToken(0)).unwrap();
    assert!(!session.undo_available(pane));

    session.edit_in_pane(pane, "a1".into(), HistoryToken(1)).unwrap();
    assert!(session.undo_available(pane));
    assert!(!session.redo_available(pane));

    session.edit_in_pane(pane, "a".into(), HistoryToken(0)).unwrap();
    assert!(!session.undo_available(pane));
    assert!(session.redo_available(pane));

    session.edit_in_pane(pane, "a1".into(), HistoryToken(1)).unwrap();
    assert!(session.undo_available(pane));
    assert!(!session.redo_available(pane));

    session.edit_in_pane(pane, "a12".into(), HistoryToken(2)).unwrap();
    assert!(session.undo_available(pane));
    assert!(!session.redo_available(pane));
    let window = session.layout().pane(pane).unwrap().version().unwrap();
    assert_eq!(window.last(), HistoryToken(2));

    // Content is the same as at token 0 but history position is not
    session.edit_in_pane(pane, "a".into(), HistoryToken(3)).unwrap();
    assert!(session.undo_available(pane));
}

#[test]
fn test_compiler_output_in_snapshot() {
    let (mut session, _peer) = loaded_session(&["a"]);
    session.handle_frame(&compile_failed(
        0,
        "0(10) : warning C7022: unrecognized profile specifier \"l\"",
    ));

    let snapshot = session.snapshot();
    let entries = &snapshot.buffers[0].diagnostics;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_index, 0);
    assert_eq!(entries[0].line_number, 10);
    assert_eq!(entries[0].error_type, "warning");
    assert_eq!(entries[0].error_code, "C7022");
    assert_eq!(entries[0].message, "unrecognized profile specifier \"l\"");
}

#[test]
fn test_project_upsert_size_cap() {
    let (mut session, mut peer) = loaded_session(&[]);

    // Settings that push the project payload past 50 KiB are not sent
    session
        .set_settings(serde_json::json!({ "notes": "x".repeat(60 * 1024) }))
        .unwrap();
    let report = session.flush();
    assert!(report.project_dropped.is_some());
    assert!(peer.drain().is_empty());

    session
        .set_settings(serde_json::json!({ "notes": "x".repeat(40 * 1024) }))
        .unwrap();
    assert!(session.flush().project_sent);

    let frames = peer.drain();
    assert_eq!(frames.len(), 1);
    let msg: SetProjectMsg = serde_json::from_str(&frames[0].payload).unwrap();
    assert_eq!(msg.project_file.as_deref(), Some(std::path::Path::new("demo.json")));
    let data = ProjectData::from_json(&msg.project_json).unwrap();
    assert_eq!(data.settings["notes"].as_str().unwrap().len(), 40 * 1024);
}

#[test]
fn test_pane_reassignment_restores_view_state() {
    let (mut session, _peer) = loaded_session(&["a", "b"]);
    let pane = PaneId(0);
    let view = ViewState {
        cursor_line: 42,
        cursor_column: 7,
        scroll_top: 30,
        selection_anchor: Some((40, 0)),
    };

    session.focus_pane(pane).unwrap();
    session.blur_pane(pane, view.clone()).unwrap();
    assert_eq!(session.layout().current(), None);

    session.select_pane(pane, 1).unwrap();
    assert_eq!(session.layout().pane(pane).unwrap().view_state(), None);

    session
        .blur_pane(
            pane,
            ViewState {
                cursor_line: 1,
                ..Default::default()
            },
        )
        .unwrap();

    session.select_pane(pane, 0).unwrap();
    assert_eq!(session.layout().pane(pane).unwrap().view_state(), Some(&view));
    assert_eq!(session.buffer(0).unwrap().saved_view_state(), Some(&view));
}

#[test]
fn test_moving_buffer_to_other_pane_repaints_decorations() {
    let mut session = Session::with_surface(&Config::default(), RecordingSurface::default());
    session.handle_frame(&project_frame(&["a", "b"]));
    session
        .set_layout(LayoutDescriptor {
            panes: vec![
                PaneSpec { id: PaneId(0), buffer_index: 0 },
                PaneSpec { id: PaneId(1), buffer_index: 0 },
            ],
            current: Some(PaneId(0)),
        })
        .unwrap();
    session.handle_frame(&compile_failed(1, "0(2) : error C0000: x"));
    let handles = session.buffer(1).unwrap().decoration_handles().to_vec();
    assert_eq!(handles.len(), 1);
    let seen = session.decorations().calls.len();

    session.select_pane(PaneId(1), 1).unwrap();
    assert_eq!(
        session.decorations().calls[seen..],
        [SurfaceCall::Rerender { buffer: 1, handles }]
    );
    assert_eq!(session.decorations().live_for(1), vec![2]);
}

#[test]
fn test_project_reload_keeps_unknown_fields() {
    let (mut session, mut peer) = loaded_session(&[]);
    let mut data = project_data(&["void main() {}"]);
    data.extra
        .insert("timeline".to_string(), serde_json::json!({ "tracks": [1, 2] }));
    session.handle_frame(&project_frame_from(&data));

    session.edit_buffer(0, "void main() { discard; }".into()).unwrap();
    session
        .set_settings(serde_json::json!({ "total_length": 10.0 }))
        .unwrap();
    session.flush();

    let frames = peer.drain();
    let project = frames
        .iter()
        .find(|e| e.kind == "SetProjectInline")
        .unwrap();
    let msg: SetProjectMsg = serde_json::from_str(&project.payload).unwrap();
    let sent = ProjectData::from_json(&msg.project_json).unwrap();
    assert_eq!(sent.extra["timeline"]["tracks"], serde_json::json!([1, 2]));
    assert_eq!(sent.shader_sources[0], "void main() { discard; }");
}

#[test]
fn test_unknown_and_malformed_frames_are_survivable() {
    let (mut session, _peer) = loaded_session(&["a"]);
    let before = session.snapshot();

    session.handle_frame("{{{");
    session.handle_frame(&frame("Telemetry", "{}"));
    session.handle_frame(&frame("CompileFailed", "not json"));
    session.handle_frame(&compile_failed(9, "0(1) : error C0000: wrong buffer"));

    assert_eq!(session.snapshot(), before);
}
