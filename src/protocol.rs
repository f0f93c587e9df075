//! Wire protocol spoken with the preview/compiler service.
//!
//! Every frame on the socket is a JSON envelope `{ "kind": ..., "payload": ... }`.
//! The payload is a UTF-8 string whose shape depends on the kind; structured
//! payloads are themselves JSON documents serialized into that string.
//!
//! Outbound and inbound kinds are closed enums so that adding a kind forces a
//! decision at every dispatch site.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw frame as it travels over the socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: String,
    #[serde(default)]
    pub payload: String,
}

impl Envelope {
    pub fn new(kind: &str, payload: String) -> Self {
        Self {
            kind: kind.to_string(),
            payload,
        }
    }

    pub fn empty(kind: &str) -> Self {
        Self::new(kind, String::new())
    }

    /// Serialize to the text frame that goes on the wire.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode {
            kind: self.kind.clone(),
            reason: e.to_string(),
        })
    }
}

/// Whole-project snapshot. `project_json` is the serialized project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetProjectMsg {
    #[serde(default)]
    pub project_root: Option<PathBuf>,
    #[serde(default)]
    pub project_file: Option<PathBuf>,
    pub project_json: String,
    #[serde(default)]
    pub embedded: bool,
}

/// Upsert of a single buffer's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBufferMsg {
    pub index: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileFailedMsg {
    pub index: usize,
    pub error_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileSucceededMsg {
    #[serde(default)]
    pub index: Option<usize>,
}

/// Starter templates the service knows how to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewProjectTemplate {
    QuadShader,
    PolygonScene,
    ShadertoyDefault,
    ShadertoyRaymarch,
    ShadertoyTunnel,
    ShadertoyVolumetric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProjectMsg {
    pub template: NewProjectTemplate,
}

/// Messages the client sends to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    FetchProject,
    SetProjectInline(SetProjectMsg),
    SetBuffer(SetBufferMsg),
    SetDmoTime(f64),
    GetDmoTime,
    StartPreview,
    StopPreview,
    ExitApp,
    SaveProject,
    ReloadProject,
    OpenProjectDialog,
    NewProject(NewProjectMsg),
}

impl Outbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Outbound::FetchProject => "FetchProject",
            Outbound::SetProjectInline(_) => "SetProjectInline",
            Outbound::SetBuffer(_) => "SetBuffer",
            Outbound::SetDmoTime(_) => "SetDmoTime",
            Outbound::GetDmoTime => "GetDmoTime",
            Outbound::StartPreview => "StartPreview",
            Outbound::StopPreview => "StopPreview",
            Outbound::ExitApp => "ExitApp",
            Outbound::SaveProject => "SaveProject",
            Outbound::ReloadProject => "ReloadProject",
            Outbound::OpenProjectDialog => "OpenProjectDialog",
            Outbound::NewProject(_) => "NewProject",
        }
    }

    pub fn to_envelope(&self) -> Result<Envelope, ProtocolError> {
        let kind = self.kind();
        let payload = match self {
            Outbound::SetProjectInline(msg) => to_payload(kind, msg)?,
            Outbound::SetBuffer(msg) => to_payload(kind, msg)?,
            Outbound::SetDmoTime(seconds) => to_payload(kind, seconds)?,
            Outbound::NewProject(msg) => to_payload(kind, msg)?,
            Outbound::FetchProject
            | Outbound::GetDmoTime
            | Outbound::StartPreview
            | Outbound::StopPreview
            | Outbound::ExitApp
            | Outbound::SaveProject
            | Outbound::ReloadProject
            | Outbound::OpenProjectDialog => String::new(),
        };
        Ok(Envelope::new(kind, payload))
    }

    /// Serialize to the text frame written on the socket.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        self.to_envelope()?.to_frame()
    }
}

fn to_payload<T: Serialize>(kind: &str, value: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(value).map_err(|e| ProtocolError::Encode {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

/// Messages the service sends to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    SetProjectInline(SetProjectMsg),
    SetDmoTime(f64),
    PreviewOpened,
    PreviewClosed,
    CompileSucceeded(CompileSucceededMsg),
    CompileFailed(CompileFailedMsg),
    ShowErrorMessage(String),
}

impl Inbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Inbound::SetProjectInline(_) => "SetProjectInline",
            Inbound::SetDmoTime(_) => "SetDmoTime",
            Inbound::PreviewOpened => "PreviewOpened",
            Inbound::PreviewClosed => "PreviewClosed",
            Inbound::CompileSucceeded(_) => "CompileSucceeded",
            Inbound::CompileFailed(_) => "CompileFailed",
            Inbound::ShowErrorMessage(_) => "ShowErrorMessage",
        }
    }
}

/// Decode a text frame received from the service.
pub fn decode_inbound(frame: &str) -> Result<Inbound, ProtocolError> {
    let envelope: Envelope = serde_json::from_str(frame)
        .map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))?;
    decode_envelope(&envelope)
}

pub fn decode_envelope(envelope: &Envelope) -> Result<Inbound, ProtocolError> {
    let kind = envelope.kind.as_str();
    let payload = envelope.payload.as_str();
    let msg = match kind {
        "SetProjectInline" => Inbound::SetProjectInline(from_payload(kind, payload)?),
        "SetDmoTime" => Inbound::SetDmoTime(from_payload(kind, payload)?),
        "PreviewOpened" => Inbound::PreviewOpened,
        "PreviewClosed" => Inbound::PreviewClosed,
        // A bare success carries no payload at all and means "every buffer compiled".
        "CompileSucceeded" if payload.trim().is_empty() => {
            Inbound::CompileSucceeded(CompileSucceededMsg::default())
        }
        "CompileSucceeded" => Inbound::CompileSucceeded(from_payload(kind, payload)?),
        "CompileFailed" => Inbound::CompileFailed(from_payload(kind, payload)?),
        "ShowErrorMessage" => Inbound::ShowErrorMessage(payload.to_string()),
        other => return Err(ProtocolError::UnknownKind(other.to_string())),
    };
    Ok(msg)
}

fn from_payload<T: serde::de::DeserializeOwned>(
    kind: &str,
    payload: &str,
) -> Result<T, ProtocolError> {
    serde_json::from_str(payload).map_err(|e| ProtocolError::MalformedPayload {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

/// Protocol error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame is not a `{kind, payload}` envelope.
    MalformedEnvelope(String),
    /// The envelope is fine but the payload does not match its kind.
    MalformedPayload { kind: String, reason: String },
    /// The kind is not one this client understands.
    UnknownKind(String),
    Encode { kind: String, reason: String },
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::MalformedEnvelope(msg) => write!(f, "Malformed envelope: {msg}"),
            ProtocolError::MalformedPayload { kind, reason } => {
                write!(f, "Malformed {kind} payload: {reason}")
            }
            ProtocolError::UnknownKind(kind) => write!(f, "Unknown message kind '{kind}'"),
            ProtocolError::Encode { kind, reason } => {
                write!(f, "Can't encode {kind} message: {reason}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_kinds_have_empty_payload() {
        let frame = Outbound::FetchProject.encode().unwrap();
        let envelope: Envelope = serde_json::from_str(&frame).unwrap();
        assert_eq!(envelope, Envelope::empty("FetchProject"));
    }

    #[test]
    fn test_set_buffer_payload_is_nested_json() {
        let msg = Outbound::SetBuffer(SetBufferMsg {
            index: 3,
            content: "void main() {}\n".to_string(),
        });
        let envelope = msg.to_envelope().unwrap();
        assert_eq!(envelope.kind, "SetBuffer");

        let inner: SetBufferMsg = serde_json::from_str(&envelope.payload).unwrap();
        assert_eq!(inner.index, 3);
        assert_eq!(inner.content, "void main() {}\n");
    }

    #[test]
    fn test_new_project_template_on_the_wire() {
        let msg = Outbound::NewProject(NewProjectMsg {
            template: NewProjectTemplate::ShadertoyRaymarch,
        });
        let envelope = msg.to_envelope().unwrap();
        assert_eq!(envelope.payload, r#"{"template":"ShadertoyRaymarch"}"#);
    }

    #[test]
    fn test_decode_compile_failed() {
        let payload = serde_json::to_string(&CompileFailedMsg {
            index: 1,
            error_message: "0(3) : error C0000: syntax error".to_string(),
        })
        .unwrap();
        let frame = serde_json::to_string(&Envelope::new("CompileFailed", payload)).unwrap();

        match decode_inbound(&frame).unwrap() {
            Inbound::CompileFailed(msg) => {
                assert_eq!(msg.index, 1);
                assert!(msg.error_message.contains("syntax error"));
            }
            other => panic!("Expected CompileFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_compile_succeeded_without_index() {
        let frame = serde_json::to_string(&Envelope::empty("CompileSucceeded")).unwrap();
        assert_eq!(
            decode_inbound(&frame).unwrap(),
            Inbound::CompileSucceeded(CompileSucceededMsg { index: None })
        );

        let frame = r#"{"kind":"CompileSucceeded","payload":"{\"index\":2}"}"#;
        assert_eq!(
            decode_inbound(frame).unwrap(),
            Inbound::CompileSucceeded(CompileSucceededMsg { index: Some(2) })
        );
    }

    #[test]
    fn test_decode_time_echo() {
        let frame = r#"{"kind":"SetDmoTime","payload":"12.5"}"#;
        assert_eq!(decode_inbound(frame).unwrap(), Inbound::SetDmoTime(12.5));
    }

    #[test]
    fn test_unknown_kind_is_reported_not_panicking() {
        let frame = r#"{"kind":"GetDmoTime","payload":""}"#;
        assert_eq!(
            decode_inbound(frame),
            Err(ProtocolError::UnknownKind("GetDmoTime".to_string()))
        );
    }

    #[test]
    fn test_malformed_frames() {
        assert!(matches!(
            decode_inbound("not json"),
            Err(ProtocolError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            decode_inbound(r#"{"kind":"CompileFailed","payload":"{}"}"#),
            Err(ProtocolError::MalformedPayload { .. })
        ));
    }
}
