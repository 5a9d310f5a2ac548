mod app;
mod config;
mod error;
mod gemini;
mod markup;
mod prompt;
mod recognizer;
mod ui;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;

use app::{AppState, BackendEvent};
use config::{ApiCredential, Config};

fn main() {
    env_logger::init();
    log::info!("Song Recognizer starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.songrecognizer.SongRecognizer")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    if let Some(ref window) = app.active_window() {
        window.present();
        return;
    }

    let credential = match ApiCredential::from_env() {
        Ok(credential) => credential,
        Err(e) => {
            log::error!("{e}");
            ui::dialogs::show_fatal_error(app, &format!("{e}"));
            return;
        }
    };
    let config = Config::load();
    log::info!(
        "Using {} (preferring \"{}\" models, {} attempts)",
        config.api_base_url,
        config.preferred_model_keyword,
        config.retry.max_attempts
    );

    // Create async channel for backend → UI communication
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let state = match AppState::new(backend_tx, &config, credential) {
        Ok(state) => Rc::new(RefCell::new(state)),
        Err(e) => {
            log::error!("Failed to create tokio runtime: {e}");
            ui::dialogs::show_fatal_error(app, &format!("Failed to start background runtime: {e}"));
            return;
        }
    };

    // Build UI
    let widgets = ui::window::build_window(app, app::IDLE_STATUS);

    // Wire up the buttons
    {
        let state_clone = state.clone();
        widgets.search_button.connect_clicked(move |_| {
            app::submit(&state_clone);
        });
    }
    {
        let state_clone = state.clone();
        widgets.clear_button.connect_clicked(move |_| {
            app::clear(&state_clone);
        });
    }

    widgets.window.present();
    state.borrow_mut().window = Some(widgets);

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }
}
