//! Recognition running in the client.
//!
//! The browser owns the microphone and posts recognizer events to the
//! register. Starting the recognizer here only opens a new listening session
//! that the client polls for; its events come back through
//! [`VoiceListener::handle`](super::VoiceListener::handle).

use serde::Serialize;

use super::{SpeechError, SpeechRecognizer};

/// Session state a client polls to know whether to keep recognising.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemoteSession {
    pub active: bool,
    /// Bumped on every (re)start; a client seeing a new value restarts its recognizer.
    pub generation: u64,
}

/// A recognizer driven by a remote client.
#[derive(Debug, Clone, Default)]
pub struct RemoteRecognizer {
    supported: bool,
    session: RemoteSession,
}

impl RemoteRecognizer {
    #[must_use]
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            session: RemoteSession::default(),
        }
    }

    #[must_use]
    pub const fn session(&self) -> RemoteSession {
        self.session
    }
}

impl SpeechRecognizer for RemoteRecognizer {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn start(&mut self) -> Result<(), SpeechError> {
        self.session.active = true;
        self.session.generation += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.session.active = false;
    }
}
