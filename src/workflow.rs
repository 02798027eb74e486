//! Drives a [`Session`] against the service.
//!
//! Network calls and preview encoding run on the tokio runtime; their results come back as
//! [`WorkflowEvent`]s on a channel and are applied by [`Workflow::handle_event`] on whichever
//! thread owns the workflow (the GTK main loop, or the CLI's own task).

use std::path::{Path, PathBuf};

use async_channel::Sender;
use bytes::Bytes;
use reqwest::Url;
use tokio::runtime::Handle;

use crate::client::ServiceClient;
use crate::error::{ServiceError, WorkflowError};
use crate::export;
use crate::model::{ExportFormat, PreviewRef, ProcessResult, SelectedFile, UploadHandle};
use crate::preview;
use crate::session::{Generation, LoadTicket, PreviewJob, Session};

/// Completions sent from background tasks to the owning thread.
#[derive(Debug)]
pub enum WorkflowEvent {
    PreviewReady {
        generation: Generation,
        preview: Option<PreviewRef>,
    },
    UploadComplete {
        generation: Generation,
        result: Result<UploadHandle, ServiceError>,
    },
    ProcessComplete {
        generation: Generation,
        result: Result<ProcessResult, ServiceError>,
    },
    ExportComplete {
        generation: Generation,
        file_id: String,
        format: ExportFormat,
        result: Result<Bytes, ServiceError>,
    },
}

/// What applying an event changed.
#[derive(Debug)]
pub enum Outcome {
    /// The event belonged to a file that has since been replaced or reset.
    Stale,
    PreviewReady,
    Uploaded(UploadHandle),
    Processed,
    Exported(PathBuf),
    Failed(WorkflowError),
}

pub struct Workflow {
    session: Session,
    client: ServiceClient,
    export_dir: PathBuf,
    runtime: Handle,
    sender: Sender<WorkflowEvent>,
}

impl Workflow {
    pub fn new(
        client: ServiceClient,
        export_dir: PathBuf,
        runtime: Handle,
        sender: Sender<WorkflowEvent>,
    ) -> Self {
        Self {
            session: Session::new(),
            client,
            export_dir,
            runtime,
            sender,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Resolved link to the synthesized speech of the current result, if any.
    pub fn audio_url(&self) -> Option<Url> {
        let reference = self.session.result()?.audio_url.as_deref()?;
        self.client.resolve_audio_url(reference)
    }

    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), WorkflowError> {
        let job = self.session.select_file(file)?;
        self.dispatch_preview(job);
        Ok(())
    }

    pub fn drag_enter(&mut self) {
        self.session.drag_enter();
    }

    pub fn drag_leave(&mut self) {
        self.session.drag_leave();
    }

    /// The pointer let go over the drop zone; the file itself may arrive later.
    pub fn end_drag(&mut self) {
        self.session.end_drag();
    }

    /// Call before reading a picked or dropped file; pass the ticket to [`Self::accept_loaded`].
    pub fn begin_load(&mut self) -> LoadTicket {
        self.session.begin_load()
    }

    /// Select a file read under `ticket`. Returns `false` if a newer pick or a reset won.
    pub fn accept_loaded(
        &mut self,
        ticket: LoadTicket,
        file: SelectedFile,
    ) -> Result<bool, WorkflowError> {
        match self.session.finish_load(ticket, file)? {
            Some(job) => {
                self.dispatch_preview(job);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn reset(&mut self) {
        log::info!("Session reset");
        self.session.reset();
    }

    /// Encode the preview off the owning thread.
    fn dispatch_preview(&self, job: Option<PreviewJob>) {
        let Some(job) = job else { return };
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            let file = job.file;
            let preview = match tokio::task::spawn_blocking(move || preview::build_preview(&file))
                .await
            {
                Ok(preview) => preview,
                Err(e) => {
                    log::warn!("Preview task failed: {e}");
                    None
                }
            };
            let _ = sender
                .send(WorkflowEvent::PreviewReady {
                    generation: job.generation,
                    preview,
                })
                .await;
        });
    }

    /// Start an upload. Returns `false` when there is nothing to send or one is pending.
    pub fn upload(&mut self) -> bool {
        let Some(job) = self.session.begin_upload() else {
            return false;
        };
        log::info!("Uploading {} ({})", job.file.name, job.file.size_label());
        let client = self.client.clone();
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            let result = client.upload(&job.file).await;
            let _ = sender
                .send(WorkflowEvent::UploadComplete {
                    generation: job.generation,
                    result,
                })
                .await;
        });
        true
    }

    /// Start processing the uploaded file. Returns `false` without an upload or while pending.
    pub fn process(&mut self) -> bool {
        let Some(job) = self.session.begin_process() else {
            return false;
        };
        log::info!("Processing {}", job.handle.file_id);
        let client = self.client.clone();
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            let result = client.process(&job.handle).await;
            let _ = sender
                .send(WorkflowEvent::ProcessComplete {
                    generation: job.generation,
                    result,
                })
                .await;
        });
        true
    }

    /// Start an export. Blank content fails right here without a request.
    pub fn export(&mut self, format: ExportFormat) -> Result<bool, WorkflowError> {
        let Some(job) = self.session.begin_export(format)? else {
            return Ok(false);
        };
        log::info!("Exporting {} as {}", job.file_id, job.format);
        let client = self.client.clone();
        let sender = self.sender.clone();

        self.runtime.spawn(async move {
            let result = client.export(&job.file_id, job.format, &job.content).await;
            let _ = sender
                .send(WorkflowEvent::ExportComplete {
                    generation: job.generation,
                    file_id: job.file_id,
                    format: job.format,
                    result,
                })
                .await;
        });
        Ok(true)
    }

    /// Apply a completion. This is the only place background results touch the session.
    pub fn handle_event(&mut self, event: WorkflowEvent) -> Outcome {
        match event {
            WorkflowEvent::PreviewReady {
                generation,
                preview,
            } => {
                if self.session.finish_preview(generation, preview) {
                    Outcome::PreviewReady
                } else {
                    Outcome::Stale
                }
            }
            WorkflowEvent::UploadComplete { generation, result } => {
                match self.session.finish_upload(generation, result) {
                    Ok(Some(handle)) => Outcome::Uploaded(handle),
                    Ok(None) => Outcome::Stale,
                    Err(e) => Outcome::Failed(e),
                }
            }
            WorkflowEvent::ProcessComplete { generation, result } => {
                match self.session.finish_process(generation, result) {
                    Ok(true) => {
                        if let Some(result) = self.session.result() {
                            log::info!(
                                "Processed: text={} description={} audio={} words={:?}",
                                result.text.is_some(),
                                result.description.is_some(),
                                result.audio_url.is_some(),
                                result.word_count
                            );
                        }
                        Outcome::Processed
                    }
                    Ok(false) => Outcome::Stale,
                    Err(e) => Outcome::Failed(e),
                }
            }
            WorkflowEvent::ExportComplete {
                generation,
                file_id,
                format,
                result,
            } => match self.session.finish_export(generation, &file_id, format, result) {
                Ok(Some(artifact)) => match export::save_artifact(&self.export_dir, &artifact) {
                    Ok(path) => Outcome::Exported(path),
                    Err(e) => {
                        log::error!("Saving {} failed: {e:?}", artifact.file_name);
                        let err = WorkflowError::ExportFailed {
                            message: format!("could not save {}: {e}", artifact.file_name),
                            detail: None,
                        };
                        self.session.report_error(&err);
                        Outcome::Failed(err)
                    }
                },
                Ok(None) => Outcome::Stale,
                Err(e) => Outcome::Failed(e),
            },
        }
    }
}
