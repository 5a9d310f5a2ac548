use std::cell::RefCell;
use std::rc::Rc;

use gtk4::glib;
use gtk4::prelude::*;

use super::gate::Completion;
use super::pipeline::dispatch_recognition;
use super::state::{
    update_status, AppState, BackendEvent, ANALYZING_STATUS, FAILURE_STATUS, IDLE_STATUS,
    SUCCESS_STATUS,
};
use crate::error::RecognizerError;
use crate::markup::parse_markup;
use crate::recognizer::RecognitionResult;
use crate::ui::dialogs::show_empty_input_warning;
use crate::ui::render::render_runs;

/// Handle a backend event on the GTK main thread.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    match event {
        BackendEvent::Status {
            generation,
            message,
        } => {
            if state.borrow().gate.accepts(generation) {
                update_status(state, &message);
            } else {
                log::debug!("Dropping status of stale request #{generation}: {message}");
            }
        }
        BackendEvent::Finished { generation, result } => {
            let completion = state.borrow_mut().gate.finish(generation);
            set_busy(state, false);
            match completion {
                Completion::Current => show_result(state, &result),
                Completion::Stale => {
                    log::info!("Discarding result of cleared request #{generation}");
                }
            }
        }
    }
}

/// Validate the input field and start a recognition request.
pub fn submit(state: &Rc<RefCell<AppState>>) {
    let raw = match state.borrow().window {
        Some(ref window) => window.input_text(),
        None => return,
    };

    let begun = state.borrow_mut().gate.begin(&raw);
    let ticket = match begun {
        Ok(ticket) => ticket,
        Err(RecognizerError::EmptyInput) => {
            log::info!("Rejecting empty query");
            if let Some(ref window) = state.borrow().window {
                show_empty_input_warning(&window.window);
            }
            return;
        }
        Err(e) => {
            let status = state.borrow().gate.status();
            log::info!("Ignoring submit while status={status:?}: {e}");
            return;
        }
    };

    log::info!("Recognizing query: {}", ticket.query);
    set_busy(state, true);
    update_status(state, ANALYZING_STATUS);
    dispatch_recognition(state, ticket);
}

/// Empty both text areas and reset the status line. An in-flight
/// request keeps running; its result will be discarded.
pub fn clear(state: &Rc<RefCell<AppState>>) {
    state.borrow_mut().gate.clear();
    if let Some(ref window) = state.borrow().window {
        window.input_view.buffer().set_text("");
        window.output_view.buffer().set_text("");
    }
    update_status(state, IDLE_STATUS);
}

fn show_result(state: &Rc<RefCell<AppState>>, result: &RecognitionResult) {
    let lines = parse_markup(result.text());
    if let Some(ref window) = state.borrow().window {
        render_runs(&window.output_view.buffer(), &lines);
    }

    let status = if result.is_error() {
        FAILURE_STATUS
    } else {
        SUCCESS_STATUS
    };
    update_status(state, status);
}

/// Toggle the submit button and the pulsing progress bar.
fn set_busy(state: &Rc<RefCell<AppState>>, busy: bool) {
    let mut s = state.borrow_mut();
    if let Some(source) = s.pulse_source.take() {
        source.remove();
    }

    let Some(ref window) = s.window else {
        return;
    };
    window.search_button.set_sensitive(!busy);
    window.progress_bar.set_visible(busy);

    if busy {
        let bar = window.progress_bar.clone();
        let source = glib::timeout_add_local(std::time::Duration::from_millis(100), move || {
            bar.pulse();
            glib::ControlFlow::Continue
        });
        s.pulse_source = Some(source);
    } else {
        window.progress_bar.set_fraction(0.0);
    }
}
