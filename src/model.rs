use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::media;

/// A file the user picked or dropped. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    /// The type is not checked here; ingestion does that.
    pub async fn from_path(path: &Path) -> Result<Self, WorkflowError> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(name, media::detect_mime_type(path), data))
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        media::is_image(&self.mime_type)
    }

    pub fn kind_label(&self) -> String {
        media::kind_label(&self.mime_type)
    }

    pub fn size_label(&self) -> String {
        media::format_file_size(self.size_bytes())
    }
}

/// Inline preview of an image file as a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef {
    pub data_uri: String,
}

/// Server-assigned identity of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    pub file_id: String,
}

/// What the service computed for one file. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub word_count: Option<u64>,
}

impl ProcessResult {
    /// The string sent for every export format: OCR text, else the description, else empty.
    pub fn exportable_content(&self) -> &str {
        self.text
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("")
    }

    pub fn has_exportable_content(&self) -> bool {
        !self.exportable_content().trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Srt,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Txt, ExportFormat::Srt];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Srt => "srt",
        }
    }

    /// Name the exported artifact is saved under.
    pub fn artifact_name(self, file_id: &str) -> String {
        format!("voxaccess_{file_id}.{}", self.as_str())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "srt" => Ok(ExportFormat::Srt),
            other => Err(format!("unknown export format '{other}' (expected txt or srt)")),
        }
    }
}

/// Where a session currently stands. Errors are reported alongside, not as a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    FileSelected,
    Uploading,
    Uploaded,
    Processing,
    Processed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::FileSelected => "File selected",
            WorkflowState::Uploading => "Uploading...",
            WorkflowState::Uploaded => "Uploaded",
            WorkflowState::Processing => "Processing...",
            WorkflowState::Processed => "Processed",
        };
        f.write_str(label)
    }
}
