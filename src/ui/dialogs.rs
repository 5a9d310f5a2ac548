use gtk4::prelude::*;
use libadwaita::prelude::*;

/// Modal warning shown when the user submits an empty query.
pub fn show_empty_input_warning(parent: &libadwaita::ApplicationWindow) {
    let dialog = libadwaita::AlertDialog::builder()
        .heading("\u{26A0}\u{FE0F} Empty Input")
        .body("Please enter song details to search!")
        .build();
    dialog.add_response("ok", "OK");
    dialog.set_default_response(Some("ok"));

    let parent_widget: Option<&gtk4::Widget> = Some(parent.upcast_ref());
    dialog.choose(parent_widget, None::<&gtk4::gio::Cancellable>, |_response_id| {});
}

/// Error dialog for a fatal startup problem. Exits the process with
/// status 1 once dismissed; no main window is ever shown.
pub fn show_fatal_error(app: &libadwaita::Application, message: &str) {
    let guard = app.hold();
    let dialog = gtk4::AlertDialog::builder()
        .message("Error")
        .detail(message)
        .modal(true)
        .buttons(["Quit"])
        .build();

    dialog.choose(
        None::<&gtk4::Window>,
        None::<&gtk4::gio::Cancellable>,
        move |_response| {
            drop(guard);
            std::process::exit(1);
        },
    );
}
