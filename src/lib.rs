//! Client for the VoxAccess document service.
//!
//! A user picks or drops one image or PDF, uploads it, asks the service to run OCR, image
//! description and speech synthesis on it, then reviews and exports the result. [`Workflow`]
//! owns that sequence; the binaries only feed it user actions and redraw from its
//! [`Session`].

pub mod client;
pub mod config;
pub mod drag;
pub mod error;
pub mod export;
pub mod media;
pub mod model;
pub mod preview;
pub mod session;
pub mod workflow;

pub use client::ServiceClient;
pub use config::Config;
pub use error::{ServiceError, WorkflowError};
pub use model::{ExportFormat, PreviewRef, ProcessResult, SelectedFile, UploadHandle, WorkflowState};
pub use session::{LoadTicket, Session};
pub use workflow::{Outcome, Workflow, WorkflowEvent};
