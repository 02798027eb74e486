use gtk4::prelude::*;
use libadwaita::prelude::*;

use super::results::{build_results, ResultsWidgets};

/// Handles returned from building the main window.
pub struct MainWindow {
    pub window: libadwaita::ApplicationWindow,
    pub toast_overlay: libadwaita::ToastOverlay,
    pub status_label: gtk4::Label,
    pub drop_zone: gtk4::Box,
    pub drop_hint: gtk4::Label,
    pub choose_button: gtk4::Button,
    pub file_row: libadwaita::ActionRow,
    pub preview: gtk4::Picture,
    pub remove_button: gtk4::Button,
    pub upload_button: gtk4::Button,
    pub process_button: gtk4::Button,
    pub error_label: gtk4::Label,
    pub results: ResultsWidgets,
}

const DROP_HINT: &str = "Drag and drop a file here, or choose one";
const DROP_HINT_ACTIVE: &str = "Drop the file here";

/// Build the main application window.
pub fn build_main_window(app: &libadwaita::Application, backend: &str) -> MainWindow {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("VoxAccess")
        .default_width(560)
        .default_height(720)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Status group ---
    let status_group = libadwaita::PreferencesGroup::new();
    status_group.set_title("Status");

    let status_row = libadwaita::ActionRow::builder()
        .title("Current State")
        .subtitle(backend)
        .build();
    let status_label = gtk4::Label::new(Some("Idle"));
    status_label.add_css_class("dim-label");
    status_row.add_suffix(&status_label);
    status_group.add(&status_row);
    content.append(&status_group);

    // --- Drop zone ---
    let drop_zone = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    drop_zone.add_css_class("card");
    drop_zone.set_margin_top(6);
    drop_zone.set_height_request(160);
    drop_zone.set_valign(gtk4::Align::Start);

    let icon = gtk4::Image::from_icon_name("document-send-symbolic");
    icon.set_pixel_size(48);
    icon.set_margin_top(24);
    drop_zone.append(&icon);

    let drop_hint = gtk4::Label::new(Some(DROP_HINT));
    drop_zone.append(&drop_hint);

    let formats = gtk4::Label::new(Some("Supports: JPG, PNG, PDF"));
    formats.add_css_class("dim-label");
    formats.add_css_class("caption");
    drop_zone.append(&formats);

    let choose_button = gtk4::Button::builder()
        .label("Choose File\u{2026}")
        .halign(gtk4::Align::Center)
        .margin_bottom(16)
        .build();
    drop_zone.append(&choose_button);
    content.append(&drop_zone);

    // --- Selected file ---
    let file_row = libadwaita::ActionRow::builder().title("No file").build();
    let preview = gtk4::Picture::new();
    preview.set_size_request(64, 64);
    preview.set_content_fit(gtk4::ContentFit::Cover);
    file_row.add_prefix(&preview);

    let remove_button = gtk4::Button::from_icon_name("window-close-symbolic");
    remove_button.set_valign(gtk4::Align::Center);
    remove_button.set_tooltip_text(Some("Remove file"));
    remove_button.add_css_class("flat");
    file_row.add_suffix(&remove_button);

    let file_list = gtk4::ListBox::new();
    file_list.add_css_class("boxed-list");
    file_list.set_selection_mode(gtk4::SelectionMode::None);
    file_list.append(&file_row);
    file_row.set_visible(false);
    content.append(&file_list);

    // --- Actions ---
    let actions = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    actions.set_homogeneous(true);
    let upload_button = gtk4::Button::with_label("Upload");
    upload_button.add_css_class("suggested-action");
    let process_button = gtk4::Button::with_label("Process File");
    process_button.add_css_class("suggested-action");
    process_button.set_visible(false);
    actions.append(&upload_button);
    actions.append(&process_button);
    content.append(&actions);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error");
    error_label.set_wrap(true);
    error_label.set_xalign(0.0);
    error_label.set_visible(false);
    content.append(&error_label);

    let results = build_results();
    content.append(&results.container);

    // Assemble
    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    let toast_overlay = libadwaita::ToastOverlay::new();
    toast_overlay.set_child(Some(&toolbar_view));
    window.set_content(Some(&toast_overlay));

    MainWindow {
        window,
        toast_overlay,
        status_label,
        drop_zone,
        drop_hint,
        choose_button,
        file_row,
        preview,
        remove_button,
        upload_button,
        process_button,
        error_label,
        results,
    }
}

/// Highlight the drop zone while a drag hovers over it.
pub fn set_dragging(win: &MainWindow, dragging: bool) {
    if dragging {
        win.drop_zone.add_css_class("accent");
        win.drop_hint.set_text(DROP_HINT_ACTIVE);
    } else {
        win.drop_zone.remove_css_class("accent");
        win.drop_hint.set_text(DROP_HINT);
    }
}

pub fn show_toast(win: &MainWindow, message: &str) {
    let toast = libadwaita::Toast::new(message);
    toast.set_timeout(3);
    win.toast_overlay.add_toast(toast);
}
