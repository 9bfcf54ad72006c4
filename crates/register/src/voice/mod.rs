//! Voice commands.
//!
//! # Modules
//!
//! - `commands` - Command registry and transcript resolution
//! - `listener` - Continuous listening around a [`SpeechRecognizer`]
//! - `matcher` - Phrase similarity scoring
//! - `pages` - The register's global and per-page commands
//! - `remote` - Recognizer driven by the browser

mod commands;
mod listener;
pub mod matcher;
pub mod pages;
mod remote;

pub use commands::{MatchKind, MatchSummary, Scope, VoiceCommand, VoiceDispatcher, VoiceMatch};
pub use listener::{SpeechError, SpeechEvent, SpeechRecognizer, VoiceListener};
pub use matcher::{MATCH_THRESHOLD, similarity};
pub use pages::{global_commands, page_commands};
pub use remote::{RemoteRecognizer, RemoteSession};
