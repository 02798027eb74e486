use gtk4::glib;
use gtk4::prelude::*;
use libadwaita::prelude::*;

use voxaccess::{Outcome, WorkflowError, WorkflowEvent, WorkflowState};

use super::state::SharedState;
use crate::ui::results::show_result;
use crate::ui::window::{set_dragging, show_toast};

/// Apply a background completion and redraw. This is the core of the event loop.
pub fn handle_workflow_event(state: &SharedState, event: WorkflowEvent) {
    let outcome = state.borrow_mut().workflow.handle_event(event);
    match outcome {
        Outcome::Stale => return,
        Outcome::PreviewReady => show_preview(state),
        Outcome::Uploaded(handle) => {
            log::info!("Ready to process {}", handle.file_id);
        }
        Outcome::Processed => {}
        Outcome::Exported(path) => on_exported(state, path),
        Outcome::Failed(err) => report_workflow_error(state, &err),
    }
    refresh(state);
}

/// Sync every widget with the session.
pub fn refresh(state: &SharedState) {
    let s = state.borrow();
    let Some(ref win) = s.window else { return };
    let session = s.workflow.session();
    let flow_state = session.state();

    win.status_label.set_text(&flow_state.to_string());
    set_dragging(win, session.is_dragging());

    match session.file() {
        Some(file) => {
            win.file_row.set_visible(true);
            win.file_row.set_title(&glib::markup_escape_text(&file.name));
            win.file_row
                .set_subtitle(&format!("{} \u{2022} {}", file.kind_label(), file.size_label()));
        }
        None => {
            win.file_row.set_visible(false);
            win.preview.set_paintable(gtk4::gdk::Paintable::NONE);
        }
    }

    let busy = session.is_loading() || session.is_processing();
    win.upload_button
        .set_sensitive(session.file().is_some() && !busy);
    win.upload_button.set_label(if session.is_loading() {
        "Uploading\u{2026}"
    } else {
        "Upload"
    });

    win.process_button
        .set_visible(session.upload_handle().is_some());
    win.process_button.set_sensitive(!busy);
    win.process_button.set_label(if flow_state == WorkflowState::Processing {
        "Processing\u{2026}"
    } else {
        "Process File"
    });

    match session.error() {
        Some(message) => {
            win.error_label.set_text(message);
            win.error_label.set_visible(true);
        }
        None => win.error_label.set_visible(false),
    }

    let audio_url = s.workflow.audio_url().map(|u| u.to_string());
    show_result(
        &win.results,
        session.result(),
        audio_url.as_deref(),
        session.is_exporting(),
    );
}

/// Decode the preview data URI into a texture for the file row.
pub fn show_preview(state: &SharedState) {
    let s = state.borrow();
    let Some(ref win) = s.window else { return };

    let texture = s
        .workflow
        .session()
        .preview()
        .and_then(|preview| preview.decode())
        .and_then(|bytes| {
            gtk4::gdk::Texture::from_bytes(&glib::Bytes::from_owned(bytes))
                .map_err(|e| log::warn!("Preview could not be decoded: {e}"))
                .ok()
        });
    win.preview.set_paintable(texture.as_ref());
}

fn on_exported(state: &SharedState, path: std::path::PathBuf) {
    let s = state.borrow();
    let Some(ref win) = s.window else { return };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let toast = libadwaita::Toast::new(&format!("Saved {name}"));
    toast.set_timeout(5);
    toast.set_button_label(Some("Open"));

    let window = win.window.clone();
    toast.connect_button_clicked(move |_| {
        let launcher = gtk4::FileLauncher::new(Some(&gtk4::gio::File::for_path(&path)));
        launcher.launch(Some(&window), gtk4::gio::Cancellable::NONE, |res| {
            if let Err(e) = res {
                log::warn!("Could not open export: {e}");
            }
        });
    });
    win.toast_overlay.add_toast(toast);
}

/// Local precondition failures get a toast. Remote failures are already in the session and
/// show in the error banner on the next refresh.
pub fn report_workflow_error(state: &SharedState, err: &WorkflowError) {
    if err.is_local() {
        report_local_error(state, &err.to_string());
    } else {
        log::debug!("Operation failed: {err}");
    }
}

/// Surface a failure that never reached the session.
pub fn report_local_error(state: &SharedState, message: &str) {
    let s = state.borrow();
    if let Some(ref win) = s.window {
        show_toast(win, message);
    }
}
