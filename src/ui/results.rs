use gtk4::prelude::*;
use libadwaita::prelude::*;

use voxaccess::ProcessResult;

/// Widgets of the results section, hidden until a result arrives.
pub struct ResultsWidgets {
    pub container: gtk4::Box,
    pub text_group: libadwaita::PreferencesGroup,
    pub text_label: gtk4::Label,
    pub description_group: libadwaita::PreferencesGroup,
    pub description_label: gtk4::Label,
    pub audio_group: libadwaita::PreferencesGroup,
    pub audio_link: gtk4::LinkButton,
    pub export_box: gtk4::Box,
    pub export_txt_button: gtk4::Button,
    pub export_srt_button: gtk4::Button,
}

fn body_label() -> gtk4::Label {
    let label = gtk4::Label::new(None);
    label.set_wrap(true);
    label.set_xalign(0.0);
    label.set_selectable(true);
    label.set_margin_top(4);
    label.set_margin_bottom(4);
    label.set_margin_start(8);
    label.set_margin_end(8);
    label
}

pub fn build_results() -> ResultsWidgets {
    let container = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    container.set_margin_top(12);
    container.set_visible(false);

    let text_group = libadwaita::PreferencesGroup::new();
    text_group.set_title("Extracted Text (OCR)");
    let text_label = body_label();
    let text_scroll = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .max_content_height(256)
        .propagate_natural_height(true)
        .child(&text_label)
        .build();
    text_scroll.add_css_class("card");
    text_group.add(&text_scroll);
    container.append(&text_group);

    let description_group = libadwaita::PreferencesGroup::new();
    description_group.set_title("Image Description (AI)");
    let description_label = body_label();
    description_group.add(&description_label);
    container.append(&description_group);

    let audio_group = libadwaita::PreferencesGroup::new();
    audio_group.set_title("Generated Audio");
    let audio_link = gtk4::LinkButton::with_label("", "Play audio");
    audio_link.set_halign(gtk4::Align::Start);
    audio_group.add(&audio_link);
    container.append(&audio_group);

    let export_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    export_box.set_homogeneous(true);
    let export_txt_button = gtk4::Button::with_label("Export as TXT");
    let export_srt_button = gtk4::Button::with_label("Export as SRT");
    export_box.append(&export_txt_button);
    export_box.append(&export_srt_button);
    container.append(&export_box);

    ResultsWidgets {
        container,
        text_group,
        text_label,
        description_group,
        description_label,
        audio_group,
        audio_link,
        export_box,
        export_txt_button,
        export_srt_button,
    }
}

/// Show `result`, or hide the whole section when there is none.
pub fn show_result(
    widgets: &ResultsWidgets,
    result: Option<&ProcessResult>,
    audio_url: Option<&str>,
    exporting: bool,
) {
    let Some(result) = result else {
        widgets.container.set_visible(false);
        return;
    };
    widgets.container.set_visible(true);

    match &result.text {
        Some(text) => {
            widgets.text_group.set_visible(true);
            widgets.text_label.set_text(text);
            let words = result
                .word_count
                .map(|n| format!("{n} words found"))
                .unwrap_or_default();
            widgets.text_group.set_description(Some(&words));
        }
        None => widgets.text_group.set_visible(false),
    }

    match &result.description {
        Some(description) => {
            widgets.description_group.set_visible(true);
            widgets.description_label.set_text(description);
        }
        None => widgets.description_group.set_visible(false),
    }

    match audio_url {
        Some(url) => {
            widgets.audio_group.set_visible(true);
            widgets.audio_link.set_uri(url);
        }
        None => widgets.audio_group.set_visible(false),
    }

    widgets
        .export_box
        .set_visible(result.has_exportable_content());
    widgets.export_txt_button.set_sensitive(!exporting);
    widgets.export_srt_button.set_sensitive(!exporting);
}
