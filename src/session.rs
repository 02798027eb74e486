//! The workflow state machine, free of I/O.
//!
//! Every operation that has to wait on something (preview encoding, the three network calls)
//! is split in two: a `begin_*` call that checks the guard, flips the in-flight flag and hands
//! back a job tagged with the current generation, and a `finish_*` call that applies the
//! outcome only if the generation still matches. Selecting a new file or resetting bumps the
//! generation, so late answers for a file that is gone are dropped instead of applied.

use bytes::Bytes;

use crate::drag::DragTracker;
use crate::error::{ServiceError, WorkflowError};
use crate::media;
use crate::model::{
    ExportFormat, PreviewRef, ProcessResult, SelectedFile, UploadHandle, WorkflowState,
};

/// Identity of the session contents a job was issued against.
pub type Generation = u64;

/// Identity of a file read that has not reached the session yet.
pub type LoadTicket = u64;

#[derive(Debug, Clone)]
pub struct PreviewJob {
    pub generation: Generation,
    pub file: SelectedFile,
}

#[derive(Debug, Clone)]
pub struct UploadJob {
    pub generation: Generation,
    pub file: SelectedFile,
}

#[derive(Debug, Clone)]
pub struct ProcessJob {
    pub generation: Generation,
    pub handle: UploadHandle,
}

#[derive(Debug, Clone)]
pub struct ExportJob {
    pub generation: Generation,
    pub file_id: String,
    pub format: ExportFormat,
    pub content: String,
}

/// A finished export ready to be written out.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub payload: Bytes,
}

#[derive(Debug, Default)]
pub struct Session {
    generation: Generation,
    load_seq: LoadTicket,
    file: Option<SelectedFile>,
    preview: Option<PreviewRef>,
    upload: Option<UploadHandle>,
    result: Option<ProcessResult>,
    error: Option<String>,
    loading: bool,
    processing: bool,
    exporting: bool,
    drag: DragTracker,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewRef> {
        self.preview.as_ref()
    }

    pub fn upload_handle(&self) -> Option<&UploadHandle> {
        self.upload.as_ref()
    }

    pub fn result(&self) -> Option<&ProcessResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Upload in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Processing in flight.
    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn state(&self) -> WorkflowState {
        if self.file.is_none() {
            WorkflowState::Idle
        } else if self.loading {
            WorkflowState::Uploading
        } else if self.upload.is_none() {
            WorkflowState::FileSelected
        } else if self.processing {
            WorkflowState::Processing
        } else if self.result.is_none() {
            WorkflowState::Uploaded
        } else {
            WorkflowState::Processed
        }
    }

    /// Accept a picked or dropped file. A rejected candidate leaves everything as it was.
    ///
    /// On success all downstream state is dropped and, for images, a preview job is returned.
    pub fn select_file(
        &mut self,
        candidate: SelectedFile,
    ) -> Result<Option<PreviewJob>, WorkflowError> {
        if !media::is_accepted(&candidate.mime_type) {
            log::warn!(
                "Rejected {} ({}): unsupported media type",
                candidate.name,
                candidate.mime_type
            );
            return Err(WorkflowError::UnsupportedMediaType {
                mime: candidate.mime_type,
            });
        }

        log::info!(
            "Selected {} ({}, {})",
            candidate.name,
            candidate.mime_type,
            candidate.size_label()
        );
        self.clear_contents();
        let job = candidate.is_image().then(|| PreviewJob {
            generation: self.generation,
            file: candidate.clone(),
        });
        self.file = Some(candidate);
        Ok(job)
    }

    pub fn drag_enter(&mut self) {
        self.drag.enter();
    }

    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    /// A drop ends the drag at once, whether or not the file is later accepted.
    pub fn end_drag(&mut self) {
        self.drag.clear();
    }

    /// Reserve a ticket for a file that is still being read from disk.
    ///
    /// Only the newest ticket may select its file. Selecting or resetting invalidates every
    /// ticket issued before it.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_seq = self.load_seq.wrapping_add(1);
        self.load_seq
    }

    /// Select a file whose read was started with `ticket`. `Ok(None)` means the read was
    /// superseded and the candidate was dropped unseen.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        candidate: SelectedFile,
    ) -> Result<Option<Option<PreviewJob>>, WorkflowError> {
        if ticket != self.load_seq {
            log::debug!(
                "Discarding superseded read of {} (ticket {ticket}, now {})",
                candidate.name,
                self.load_seq
            );
            return Ok(None);
        }
        self.select_file(candidate).map(Some)
    }

    pub fn finish_preview(&mut self, generation: Generation, preview: Option<PreviewRef>) -> bool {
        if !self.is_current(generation, "preview") {
            return false;
        }
        self.preview = preview;
        true
    }

    /// `None` when there is no file, or an upload or processing call is already pending.
    pub fn begin_upload(&mut self) -> Option<UploadJob> {
        if self.loading {
            log::info!("Ignoring upload while one is pending");
            return None;
        }
        if self.processing {
            log::info!("Ignoring upload while processing is pending");
            return None;
        }
        let file = self.file.clone()?;
        self.error = None;
        self.loading = true;
        Some(UploadJob {
            generation: self.generation,
            file,
        })
    }

    pub fn finish_upload(
        &mut self,
        generation: Generation,
        outcome: Result<UploadHandle, ServiceError>,
    ) -> Result<Option<UploadHandle>, WorkflowError> {
        if !self.is_current(generation, "upload") {
            return Ok(None);
        }
        self.loading = false;
        match outcome {
            Ok(handle) => {
                // A re-upload supersedes the previous handle and anything computed from it.
                self.result = None;
                self.upload = Some(handle.clone());
                Ok(Some(handle))
            }
            Err(err) => Err(self.fail(&err, WorkflowError::upload(&err))),
        }
    }

    /// `None` when nothing is uploaded yet or processing is already pending.
    pub fn begin_process(&mut self) -> Option<ProcessJob> {
        if self.processing {
            log::info!("Ignoring process while one is pending");
            return None;
        }
        if self.loading {
            log::info!("Ignoring process while an upload is pending");
            return None;
        }
        let handle = self.upload.clone()?;
        self.error = None;
        self.processing = true;
        Some(ProcessJob {
            generation: self.generation,
            handle,
        })
    }

    pub fn finish_process(
        &mut self,
        generation: Generation,
        outcome: Result<ProcessResult, ServiceError>,
    ) -> Result<bool, WorkflowError> {
        if !self.is_current(generation, "process") {
            return Ok(false);
        }
        self.processing = false;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                Ok(true)
            }
            Err(err) => Err(self.fail(&err, WorkflowError::processing(&err))),
        }
    }

    /// `Ok(None)` when there is no result yet or an export is already pending.
    /// Blank content fails locally and leaves the session untouched.
    pub fn begin_export(
        &mut self,
        format: ExportFormat,
    ) -> Result<Option<ExportJob>, WorkflowError> {
        let (Some(handle), Some(result)) = (&self.upload, &self.result) else {
            return Ok(None);
        };
        let content = result.exportable_content();
        if content.trim().is_empty() {
            log::warn!("Export {format} refused: nothing to export");
            return Err(WorkflowError::NoContentAvailable);
        }
        if self.exporting {
            log::info!("Ignoring export while one is pending");
            return Ok(None);
        }
        let job = ExportJob {
            generation: self.generation,
            file_id: handle.file_id.clone(),
            format,
            content: content.to_string(),
        };
        self.error = None;
        self.exporting = true;
        Ok(Some(job))
    }

    pub fn finish_export(
        &mut self,
        generation: Generation,
        file_id: &str,
        format: ExportFormat,
        outcome: Result<Bytes, ServiceError>,
    ) -> Result<Option<ExportArtifact>, WorkflowError> {
        if !self.is_current(generation, "export") {
            return Ok(None);
        }
        self.exporting = false;
        match outcome {
            Ok(payload) => Ok(Some(ExportArtifact {
                file_name: format.artifact_name(file_id),
                format,
                payload,
            })),
            Err(err) => Err(self.fail(&err, WorkflowError::export(&err))),
        }
    }

    /// Record a failure that happened after a remote call came back, e.g. saving the export.
    pub fn report_error(&mut self, err: &WorkflowError) {
        self.error = Some(err.to_string());
    }

    /// Back to the initial state. Anything still in flight will be discarded on arrival.
    pub fn reset(&mut self) {
        self.clear_contents();
        self.drag.clear();
    }

    fn clear_contents(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.load_seq = self.load_seq.wrapping_add(1);
        self.file = None;
        self.preview = None;
        self.upload = None;
        self.result = None;
        self.error = None;
        self.loading = false;
        self.processing = false;
        self.exporting = false;
    }

    fn is_current(&self, generation: Generation, what: &str) -> bool {
        if generation == self.generation {
            return true;
        }
        log::debug!(
            "Discarding stale {what} response (generation {generation}, now {})",
            self.generation
        );
        false
    }

    fn fail(&mut self, raw: &ServiceError, err: WorkflowError) -> WorkflowError {
        log::error!("{err}: {raw:?}");
        self.error = Some(err.to_string());
        err
    }
}
