use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::gate::Ticket;
use super::state::{AppState, BackendEvent};
use crate::recognizer::{RecognitionResult, Recognizer};

/// Run recognition for a ticket on the app's tokio runtime.
pub fn dispatch_recognition(state: &Rc<RefCell<AppState>>, ticket: Ticket) {
    let s = state.borrow();
    log::info!("Dispatching request #{}", ticket.generation);
    spawn_recognition(
        s.tokio_rt.handle(),
        s.recognizer.clone(),
        s.backend_sender.clone(),
        ticket,
    );
}

/// Exactly one `Finished` event is sent per ticket, even if the task panics.
pub fn spawn_recognition(
    runtime: &tokio::runtime::Handle,
    recognizer: Arc<Recognizer>,
    sender: async_channel::Sender<BackendEvent>,
    ticket: Ticket,
) {
    let Ticket { generation, query } = ticket;

    runtime.spawn(async move {
        let status_sender = sender.clone();
        let task = tokio::spawn(async move {
            let report = move |message: String| {
                let _ = status_sender.try_send(BackendEvent::Status {
                    generation,
                    message,
                });
            };
            recognizer.recognize(&query, &report).await
        });

        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Recognition task for request #{generation} failed: {e}");
                RecognitionResult::Failed(format!(
                    "\u{274C} Error: recognition task panicked: {e}"
                ))
            }
        };
        let _ = sender
            .send(BackendEvent::Finished { generation, result })
            .await;
    });
}
