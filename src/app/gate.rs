use crate::error::RecognizerError;

/// Whether a request is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Idle,
    Busy,
}

/// A validated submission, tagged with its request generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub query: String,
}

/// What to do with a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Render it.
    Current,
    /// Superseded by a clear; discard it.
    Stale,
}

/// Admits one request at a time and tells current results from stale ones.
///
/// Every clear bumps the generation, so a result that arrives after the
/// user cleared the window is recognised as stale. Clearing never frees
/// the gate: the background request still owns it until it finishes.
#[derive(Debug, Default)]
pub struct SubmitGate {
    generation: u64,
    in_flight: Option<u64>,
}

impl SubmitGate {
    pub fn status(&self) -> AppStatus {
        match self.in_flight {
            Some(_) => AppStatus::Busy,
            None => AppStatus::Idle,
        }
    }

    /// Validate raw input and start a new request.
    pub fn begin(&mut self, raw_input: &str) -> Result<Ticket, RecognizerError> {
        if self.in_flight.is_some() {
            return Err(RecognizerError::Busy);
        }
        let query = raw_input.trim();
        if query.is_empty() {
            return Err(RecognizerError::EmptyInput);
        }

        self.generation += 1;
        self.in_flight = Some(self.generation);
        Ok(Ticket {
            generation: self.generation,
            query: query.to_string(),
        })
    }

    /// Whether progress from `generation` should still reach the UI.
    pub fn accepts(&self, generation: u64) -> bool {
        self.in_flight == Some(generation) && self.generation == generation
    }

    /// Release the gate for a finished request.
    pub fn finish(&mut self, generation: u64) -> Completion {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
        if self.generation == generation {
            Completion::Current
        } else {
            Completion::Stale
        }
    }

    pub fn clear(&mut self) {
        self.generation += 1;
    }
}
