// Service-side fixtures: frames the service would send and a peer that reads
// what the client wrote.

use shader_sync::decoration::DecorationSurface;
use shader_sync::project::ProjectData;
use shader_sync::protocol::{
    CompileFailedMsg, CompileSucceededMsg, Envelope, Outbound, SetBufferMsg, SetProjectMsg,
};
use shader_sync::session::Session;
use std::path::PathBuf;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

pub fn project_data(sources: &[&str]) -> ProjectData {
    ProjectData {
        settings: serde_json::json!({ "total_length": 60.0, "bpm": 120 }),
        shader_sources: sources.iter().map(|s| s.to_string()).collect(),
        shader_paths: (0..sources.len())
            .map(|i| format!("data/shader_{i}.frag"))
            .collect(),
        ..Default::default()
    }
}

pub fn project_frame(sources: &[&str]) -> String {
    project_frame_from(&project_data(sources))
}

pub fn project_frame_from(data: &ProjectData) -> String {
    let msg = SetProjectMsg {
        project_root: Some(PathBuf::from("/home/demo/intro")),
        project_file: Some(PathBuf::from("demo.json")),
        project_json: data.to_json().unwrap(),
        embedded: false,
    };
    Outbound::SetProjectInline(msg).encode().unwrap()
}

pub fn frame(kind: &str, payload: impl Into<String>) -> String {
    serde_json::to_string(&Envelope::new(kind, payload.into())).unwrap()
}

pub fn compile_failed(index: usize, text: &str) -> String {
    let payload = serde_json::to_string(&CompileFailedMsg {
        index,
        error_message: text.to_string(),
    })
    .unwrap();
    frame("CompileFailed", payload)
}

pub fn compile_succeeded(index: Option<usize>) -> String {
    match index {
        Some(index) => frame(
            "CompileSucceeded",
            serde_json::to_string(&CompileSucceededMsg { index: Some(index) }).unwrap(),
        ),
        None => frame("CompileSucceeded", ""),
    }
}

/// The far end of the client's frame channel.
pub struct ServicePeer {
    rx: UnboundedReceiver<String>,
}

impl ServicePeer {
    /// Open a connection on `session` and swallow the initial `FetchProject`.
    pub fn connect<D: DecorationSurface>(session: &mut Session<D>) -> Self {
        let (tx, rx) = unbounded_channel();
        let generation = session.begin_connect().expect("session was disconnected");
        session.connection_opened(generation, tx);
        let mut peer = Self { rx };
        assert_eq!(peer.kinds(), vec!["FetchProject"]);
        peer
    }

    pub fn from_receiver(rx: UnboundedReceiver<String>) -> Self {
        Self { rx }
    }

    pub fn drain(&mut self) -> Vec<Envelope> {
        std::iter::from_fn(|| self.rx.try_recv().ok())
            .map(|frame| serde_json::from_str(&frame).unwrap())
            .collect()
    }

    pub fn kinds(&mut self) -> Vec<String> {
        self.drain().into_iter().map(|e| e.kind).collect()
    }

    pub fn buffer_writes(&mut self) -> Vec<SetBufferMsg> {
        self.drain()
            .into_iter()
            .filter(|e| e.kind == "SetBuffer")
            .map(|e| serde_json::from_str(&e.payload).unwrap())
            .collect()
    }
}
