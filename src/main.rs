mod app;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use app::AppState;
use voxaccess::WorkflowEvent;

fn main() {
    env_logger::init();
    log::info!("VoxAccess starting");

    let application = libadwaita::Application::builder()
        .application_id("io.github.voxaccess.VoxAccess")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Background tasks report back to the GTK main thread through this channel
    let (event_tx, event_rx) = async_channel::unbounded::<WorkflowEvent>();

    let state = Rc::new(RefCell::new(AppState::new(event_tx)));

    let window = ui::window::build_main_window(app, &state.borrow().config.backend_url);
    window.window.present();
    state.borrow_mut().window = Some(window);

    app::wire_actions(&state);
    app::refresh(&state);

    // Attach workflow event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = event_rx.recv().await {
                app::handle_workflow_event(&state_clone, event);
            }
        });
    }
}
