use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gtk4::glib;

use super::gate::SubmitGate;
use crate::config::{ApiCredential, Config};
use crate::gemini::GeminiClient;
use crate::recognizer::{RecognitionResult, Recognizer, TokioPause};
use crate::ui::window::RecognizerWidgets;

pub const IDLE_STATUS: &str = "\u{2728} Ready to recognize songs \u{2022} Powered by AI";
pub const ANALYZING_STATUS: &str = "\u{1F50D} Analyzing your query with AI...";
pub const SUCCESS_STATUS: &str = "\u{2705} Song recognized successfully! \u{1F389}";
pub const FAILURE_STATUS: &str = "\u{26A0}\u{FE0F} Request failed - see details above";

/// Events sent from the tokio runtime to the GTK main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Status { generation: u64, message: String },
    Finished { generation: u64, result: RecognitionResult },
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub gate: SubmitGate,
    pub recognizer: Arc<Recognizer>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // Busy indicator
    pub pulse_source: Option<glib::SourceId>,

    // UI handles
    pub window: Option<RecognizerWidgets>,
}

impl AppState {
    pub fn new(
        sender: async_channel::Sender<BackendEvent>,
        config: &Config,
        credential: ApiCredential,
    ) -> std::io::Result<Self> {
        let tokio_rt = tokio::runtime::Runtime::new()?;
        let client = GeminiClient::new(&config.api_base_url, credential);
        let recognizer = Recognizer::new(Arc::new(client), Arc::new(TokioPause), config);

        Ok(Self {
            gate: SubmitGate::default(),
            recognizer: Arc::new(recognizer),
            tokio_rt,
            backend_sender: sender,
            pulse_source: None,
            window: None,
        })
    }
}

/// Helper to update the status label.
pub fn update_status(state: &Rc<RefCell<AppState>>, label_text: &str) {
    if let Some(ref window) = state.borrow().window {
        window.status_label.set_text(label_text);
    }
}
