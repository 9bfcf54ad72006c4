//! Continuous speech listening.
//!
//! A [`SpeechRecognizer`] produces [`SpeechEvent`]s. The [`VoiceListener`]
//! keeps the recognizer running across utterances, tracks the partial
//! transcript and hands final transcripts to the caller for dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from speech recognition.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Speech recognition is not available on this platform.
    #[error("speech recognition is not supported")]
    Unsupported,

    /// The recognizer failed to start.
    #[error("speech recognizer error: {0}")]
    Recognizer(String),
}

/// Something the recognizer heard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "transcript", rename_all = "snake_case")]
pub enum SpeechEvent {
    /// Interim transcript; may still change.
    Partial(String),
    /// Final transcript of one utterance.
    Final(String),
    /// The recognizer stopped on its own (silence, timeout).
    End,
    /// The recognizer reported an error.
    Error(String),
}

/// A platform speech recognizer.
pub trait SpeechRecognizer: Send {
    /// Whether recognition can run at all.
    fn is_supported(&self) -> bool;

    /// Start recognising. Events are fed back through [`VoiceListener::handle`].
    ///
    /// # Errors
    ///
    /// Returns an error if the recognizer cannot start.
    fn start(&mut self) -> Result<(), SpeechError>;

    /// Stop recognising.
    fn stop(&mut self);
}

/// Keeps a recognizer listening until told to stop.
pub struct VoiceListener<R> {
    recognizer: R,
    listening: bool,
    transcript: String,
}

impl<R: SpeechRecognizer> VoiceListener<R> {
    /// Wrap `recognizer`.
    ///
    /// # Errors
    ///
    /// Returns [`SpeechError::Unsupported`] if the recognizer cannot run here.
    pub fn new(recognizer: R) -> Result<Self, SpeechError> {
        if !recognizer.is_supported() {
            return Err(SpeechError::Unsupported);
        }
        Ok(Self {
            recognizer,
            listening: false,
            transcript: String::new(),
        })
    }

    #[must_use]
    pub const fn is_listening(&self) -> bool {
        self.listening
    }

    #[must_use]
    pub const fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// The live (partial) transcript. Empty between utterances.
    #[must_use]
    pub fn current_transcript(&self) -> &str {
        &self.transcript
    }

    /// Start listening. Returns `false` if already listening.
    ///
    /// # Errors
    ///
    /// Returns an error if the recognizer fails to start.
    pub fn start(&mut self) -> Result<bool, SpeechError> {
        if self.listening {
            return Ok(false);
        }
        self.recognizer.start()?;
        self.listening = true;
        info!("Voice listening started");
        Ok(true)
    }

    /// Stop listening. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.listening {
            return false;
        }
        self.listening = false;
        self.recognizer.stop();
        self.transcript.clear();
        info!("Voice listening stopped");
        true
    }

    /// Process one recognizer event. Returns the transcript to dispatch, if any.
    ///
    /// Events that arrive after [`stop`](Self::stop) are ignored.
    pub fn handle(&mut self, event: SpeechEvent) -> Option<String> {
        if !self.listening {
            debug!(?event, "Speech event ignored, not listening");
            return None;
        }
        match event {
            SpeechEvent::Partial(text) => {
                self.transcript = text;
                None
            }
            SpeechEvent::Final(text) => {
                self.transcript.clear();
                let text = text.trim().to_string();
                (!text.is_empty()).then_some(text)
            }
            SpeechEvent::End => {
                self.restart();
                None
            }
            SpeechEvent::Error(message) => {
                warn!(%message, "Speech recognizer error");
                None
            }
        }
    }

    fn restart(&mut self) {
        self.transcript.clear();
        match self.recognizer.start() {
            Ok(()) => debug!("Voice recognizer restarted"),
            Err(e) => {
                warn!(error = %e, "Voice recognizer failed to restart, listening stopped");
                self.listening = false;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Counts starts and stops; fails to restart once `fail_after` starts are used.
    #[derive(Default)]
    struct ScriptedRecognizer {
        supported: bool,
        fail_after: Option<usize>,
        starts: usize,
        stops: usize,
    }

    impl ScriptedRecognizer {
        fn new() -> Self {
            Self {
                supported: true,
                ..Self::default()
            }
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn start(&mut self) -> Result<(), SpeechError> {
            if self.fail_after.is_some_and(|limit| self.starts >= limit) {
                return Err(SpeechError::Recognizer("microphone busy".to_string()));
            }
            self.starts += 1;
            Ok(())
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    fn utterance(text: &str) -> Vec<SpeechEvent> {
        vec![
            SpeechEvent::Partial(text.split(' ').next().unwrap().to_string()),
            SpeechEvent::Final(text.to_string()),
            SpeechEvent::End,
        ]
    }

    #[test]
    fn test_unsupported() {
        let recognizer = ScriptedRecognizer::default();
        assert!(matches!(
            VoiceListener::new(recognizer),
            Err(SpeechError::Unsupported)
        ));
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut listener = VoiceListener::new(ScriptedRecognizer::new()).unwrap();
        assert!(listener.start().unwrap());
        assert!(!listener.start().unwrap());
        assert_eq!(listener.recognizer().starts, 1);

        assert!(listener.stop());
        assert!(!listener.stop());
        assert_eq!(listener.recognizer().stops, 1);
    }

    #[test]
    fn test_restarts_after_each_utterance() {
        let mut listener = VoiceListener::new(ScriptedRecognizer::new()).unwrap();
        listener.start().unwrap();

        let heard: Vec<String> = ["go home", "show orders"]
            .into_iter()
            .flat_map(utterance)
            .filter_map(|event| listener.handle(event))
            .collect();
        assert_eq!(heard, ["go home", "show orders"]);
        assert_eq!(listener.recognizer().starts, 3);
        assert!(listener.is_listening());
    }

    #[test]
    fn test_failed_restart_stops_listening() {
        let mut listener = VoiceListener::new(ScriptedRecognizer {
            fail_after: Some(1),
            ..ScriptedRecognizer::new()
        })
        .unwrap();
        listener.start().unwrap();
        listener.handle(SpeechEvent::End);
        assert!(!listener.is_listening());
        assert!(
            listener
                .handle(SpeechEvent::Final("home".to_string()))
                .is_none()
        );
    }

    #[test]
    fn test_partials_update_transcript_only() {
        let mut listener = VoiceListener::new(ScriptedRecognizer::new()).unwrap();
        listener.start().unwrap();

        assert!(listener.handle(SpeechEvent::Partial("add cof".to_string())).is_none());
        assert_eq!(listener.current_transcript(), "add cof");

        assert_eq!(
            listener.handle(SpeechEvent::Final("add coffee".to_string())),
            Some("add coffee".to_string())
        );
        assert_eq!(listener.current_transcript(), "");
    }

    #[test]
    fn test_no_restart_after_stop() {
        let mut listener = VoiceListener::new(ScriptedRecognizer::new()).unwrap();
        listener.start().unwrap();
        listener.stop();

        assert!(listener.handle(SpeechEvent::End).is_none());
        assert!(
            listener
                .handle(SpeechEvent::Final("home".to_string()))
                .is_none()
        );
        assert_eq!(listener.recognizer().starts, 1);
    }

    #[test]
    fn test_end_restarts_recognizer() {
        let mut listener = VoiceListener::new(ScriptedRecognizer::new()).unwrap();
        listener.start().unwrap();
        listener.handle(SpeechEvent::End);
        listener.handle(SpeechEvent::End);
        assert_eq!(listener.recognizer().starts, 3);
        assert!(listener.is_listening());
    }
}
