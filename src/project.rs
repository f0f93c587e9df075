//! Project document carried by `SetProjectInline`.
//!
//! The client only interprets the shader sources and their paths; every other
//! field of the document (settings, scenes, timeline, ...) is kept verbatim so
//! that a whole-project upsert never loses data it did not understand.

use crate::protocol::{ProtocolError, SetProjectMsg};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub settings: Value,

    #[serde(default)]
    pub shader_sources: Vec<String>,

    #[serde(default)]
    pub shader_paths: Vec<String>,

    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectData {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(|e| ProtocolError::MalformedPayload {
            kind: "SetProjectInline".to_string(),
            reason: format!("project document: {e}"),
        })
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode {
            kind: "SetProjectInline".to_string(),
            reason: e.to_string(),
        })
    }

    /// Display label for the shader at `index`.
    pub fn shader_path(&self, index: usize) -> String {
        self.shader_paths
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("shader-{index}"))
    }
}

/// Where the project lives on the service side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub project_root: Option<PathBuf>,
    pub project_file: Option<PathBuf>,
    pub embedded: bool,
}

impl ProjectMeta {
    pub fn from_message(msg: &SetProjectMsg) -> Self {
        Self {
            project_root: msg.project_root.clone(),
            project_file: msg.project_file.clone(),
            embedded: msg.embedded,
        }
    }

    pub fn to_message(&self, data: &ProjectData) -> Result<SetProjectMsg, ProtocolError> {
        Ok(SetProjectMsg {
            project_root: self.project_root.clone(),
            project_file: self.project_file.clone(),
            project_json: data.to_json()?,
            embedded: self.embedded,
        })
    }
}
