use std::path::PathBuf;

use gtk4::prelude::*;
use gtk4::{gdk, gio, glib};

use voxaccess::{ExportFormat, SelectedFile};

use super::event_handler::{refresh, report_local_error, report_workflow_error};
use super::state::SharedState;

/// Connect every button and the drop target to the workflow.
pub fn wire_actions(state: &SharedState) {
    let s = state.borrow();
    let Some(ref win) = s.window else { return };

    {
        let state = state.clone();
        let window = win.window.clone();
        win.choose_button
            .connect_clicked(move |_| open_file_dialog(&state, &window));
    }
    {
        let state = state.clone();
        win.remove_button.connect_clicked(move |_| {
            state.borrow_mut().workflow.reset();
            refresh(&state);
        });
    }
    {
        let state = state.clone();
        win.upload_button.connect_clicked(move |_| {
            state.borrow_mut().workflow.upload();
            refresh(&state);
        });
    }
    {
        let state = state.clone();
        win.process_button.connect_clicked(move |_| {
            state.borrow_mut().workflow.process();
            refresh(&state);
        });
    }
    for (button, format) in [
        (&win.results.export_txt_button, ExportFormat::Txt),
        (&win.results.export_srt_button, ExportFormat::Srt),
    ] {
        let state = state.clone();
        button.connect_clicked(move |_| {
            let result = state.borrow_mut().workflow.export(format);
            if let Err(e) = result {
                report_workflow_error(&state, &e);
            }
            refresh(&state);
        });
    }

    let target = gtk4::DropTarget::new(gio::File::static_type(), gdk::DragAction::COPY);
    {
        let state = state.clone();
        target.connect_enter(move |_, _, _| {
            state.borrow_mut().workflow.drag_enter();
            refresh(&state);
            gdk::DragAction::COPY
        });
    }
    {
        let state = state.clone();
        target.connect_leave(move |_| {
            state.borrow_mut().workflow.drag_leave();
            refresh(&state);
        });
    }
    {
        let state = state.clone();
        target.connect_drop(move |_, value, _, _| {
            state.borrow_mut().workflow.end_drag();
            refresh(&state);
            let Ok(file) = value.get::<gio::File>() else {
                return false;
            };
            load_candidate(&state, file);
            true
        });
    }
    win.drop_zone.add_controller(target);
}

fn open_file_dialog(state: &SharedState, window: &libadwaita::ApplicationWindow) {
    let filter = gtk4::FileFilter::new();
    filter.set_name(Some("Images and PDFs"));
    filter.add_mime_type("image/*");
    filter.add_mime_type("application/pdf");
    let filters = gio::ListStore::new::<gtk4::FileFilter>();
    filters.append(&filter);

    let dialog = gtk4::FileDialog::builder()
        .title("Choose a File")
        .modal(true)
        .build();
    dialog.set_filters(Some(&filters));

    let state = state.clone();
    dialog.open(Some(window), gio::Cancellable::NONE, move |res| match res {
        Ok(file) => load_candidate(&state, file),
        Err(e) => log::debug!("File dialog closed: {e}"),
    });
}

/// Read the file on the tokio runtime, then hand it to the workflow on the main thread.
///
/// The read is ticketed: if another file is picked or the session is reset before it
/// finishes, the bytes are dropped when they arrive.
fn load_candidate(state: &SharedState, file: gio::File) {
    let Some(path) = file.path() else {
        log::warn!("Ignoring non-local file {}", file.uri());
        report_local_error(state, "Only local files can be uploaded");
        return;
    };

    let ticket = state.borrow_mut().workflow.begin_load();
    let (file_tx, file_rx) = async_channel::bounded::<Result<SelectedFile, String>>(1);
    state.borrow().tokio_rt.spawn(read_file(path, file_tx));

    let state = state.clone();
    glib::spawn_future_local(async move {
        let Ok(loaded) = file_rx.recv().await else { return };
        match loaded {
            Ok(candidate) => {
                let accepted = state.borrow_mut().workflow.accept_loaded(ticket, candidate);
                match accepted {
                    Ok(true) => {}
                    Ok(false) => return,
                    Err(e) => report_workflow_error(&state, &e),
                }
            }
            Err(message) => report_local_error(&state, &message),
        }
        refresh(&state);
    });
}

async fn read_file(path: PathBuf, tx: async_channel::Sender<Result<SelectedFile, String>>) {
    let result = SelectedFile::from_path(&path).await.map_err(|e| {
        log::error!("Failed to read {}: {e:?}", path.display());
        format!("Could not read {}: {e}", path.display())
    });
    let _ = tx.send(result).await;
}
