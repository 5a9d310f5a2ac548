use gtk4::prelude::*;
use libadwaita::prelude::*;

use super::render::{BOLD_TAG, HEADER_TAG};

/// Handles returned from building the main window.
pub struct RecognizerWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub input_view: gtk4::TextView,
    pub output_view: gtk4::TextView,
    pub search_button: gtk4::Button,
    pub clear_button: gtk4::Button,
    pub progress_bar: gtk4::ProgressBar,
    pub status_label: gtk4::Label,
}

impl RecognizerWidgets {
    /// Current contents of the input field.
    pub fn input_text(&self) -> String {
        let buffer = self.input_view.buffer();
        let (start, end) = buffer.bounds();
        buffer.text(&start, &end, false).to_string()
    }
}

/// Build the main recognizer window.
pub fn build_window(app: &libadwaita::Application, initial_status: &str) -> RecognizerWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("AI Song Recognizer")
        .default_width(1200)
        .default_height(850)
        .width_request(1000)
        .height_request(700)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    content.set_margin_start(24);
    content.set_margin_end(24);
    content.set_margin_top(16);
    content.set_margin_bottom(16);

    // --- Title ---
    let title = gtk4::Label::new(Some("\u{1F3B5} AI Song Recognizer \u{1F3B5}"));
    title.add_css_class("title-1");
    content.append(&title);

    let subtitle = gtk4::Label::new(Some(
        "Powered by Google Gemini AI \u{2022} Find Any Song Instantly",
    ));
    subtitle.add_css_class("dim-label");
    content.append(&subtitle);

    // --- Input ---
    let input_heading = gtk4::Label::builder()
        .label("\u{1F3A4} Enter Song Details")
        .xalign(0.0)
        .build();
    input_heading.add_css_class("title-4");
    content.append(&input_heading);

    let input_hint = gtk4::Label::builder()
        .label("Type song name, lyrics, or even broken sentences...")
        .xalign(0.0)
        .build();
    input_hint.add_css_class("dim-label");
    content.append(&input_hint);

    let input_view = gtk4::TextView::builder()
        .wrap_mode(gtk4::WrapMode::WordChar)
        .top_margin(8)
        .bottom_margin(8)
        .left_margin(8)
        .right_margin(8)
        .build();
    let input_scroll = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .min_content_height(110)
        .child(&input_view)
        .build();
    input_scroll.add_css_class("card");
    content.append(&input_scroll);

    // --- Buttons ---
    let button_row = gtk4::Box::new(gtk4::Orientation::Horizontal, 12);
    button_row.set_halign(gtk4::Align::Center);

    let search_button = gtk4::Button::builder()
        .label("\u{1F50D}  Recognize Song")
        .build();
    search_button.add_css_class("suggested-action");
    search_button.add_css_class("pill");
    button_row.append(&search_button);

    let clear_button = gtk4::Button::builder()
        .label("\u{1F5D1}\u{FE0F}  Clear All")
        .build();
    clear_button.add_css_class("pill");
    button_row.append(&clear_button);

    content.append(&button_row);

    // --- Busy indicator ---
    let progress_bar = gtk4::ProgressBar::new();
    progress_bar.set_visible(false);
    progress_bar.set_pulse_step(0.1);
    content.append(&progress_bar);

    // --- Output ---
    let output_heading = gtk4::Label::builder()
        .label("\u{1F4C0} Song Information")
        .xalign(0.0)
        .build();
    output_heading.add_css_class("title-4");
    content.append(&output_heading);

    let output_view = gtk4::TextView::builder()
        .editable(false)
        .cursor_visible(false)
        .wrap_mode(gtk4::WrapMode::Word)
        .top_margin(12)
        .bottom_margin(12)
        .left_margin(12)
        .right_margin(12)
        .build();
    register_tags(&output_view.buffer());

    let output_scroll = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&output_view)
        .build();
    output_scroll.add_css_class("card");
    content.append(&output_scroll);

    // --- Status ---
    let status_label = gtk4::Label::new(Some(initial_status));
    status_label.add_css_class("dim-label");
    content.append(&status_label);

    toolbar_view.set_content(Some(&content));
    window.set_content(Some(&toolbar_view));

    RecognizerWidgets {
        window,
        input_view,
        output_view,
        search_button,
        clear_button,
        progress_bar,
        status_label,
    }
}

fn register_tags(buffer: &gtk4::TextBuffer) {
    let bold = gtk4::TextTag::builder()
        .name(BOLD_TAG)
        .weight(700)
        .foreground("#fbbf24")
        .build();
    let header = gtk4::TextTag::builder()
        .name(HEADER_TAG)
        .weight(700)
        .scale(1.2)
        .foreground("#c084fc")
        .build();

    let table = buffer.tag_table();
    table.add(&bold);
    table.add(&header);
}
