//! Voice phrase testing.
//!
//! Resolves a transcript exactly as the register would on the given page and
//! prints the matched command, its score and the intent it runs.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use tillpoint_core::Feature;
use tillpoint_register::actions::PosIntent;
use tillpoint_register::payment::PaymentMethods;
use tillpoint_register::voice::{MatchSummary, VoiceDispatcher, global_commands, page_commands};

use super::{emit, load_catalog};

#[derive(Debug, Error)]
#[error("Unknown page: {0}")]
pub struct UnknownPage(String);

#[derive(Serialize)]
struct MatchReport {
    transcript: String,
    page: Feature,
    #[serde(rename = "match")]
    matched: Option<MatchSummary>,
    intent: Option<PosIntent>,
}

fn parse_page(page: &str) -> Result<Feature, UnknownPage> {
    match page.trim().to_lowercase().as_str() {
        "" | "home" | "dashboard" => Ok(Feature::Dashboard),
        other => Feature::for_route(other)
            .filter(|feature| *feature != Feature::Dashboard)
            .ok_or_else(|| UnknownPage(page.to_string())),
    }
}

/// Resolve `transcript` with the commands of `page`.
///
/// # Errors
///
/// Returns an error if the page is unknown or the seed cannot be loaded.
pub fn match_transcript(
    page: &str,
    transcript: &str,
    seed: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = parse_page(page)?;
    let catalog = load_catalog(seed)?;

    let mut dispatcher = VoiceDispatcher::new(global_commands());
    dispatcher.set_page_commands(
        page.route(),
        page_commands(page, &catalog, &PaymentMethods::default())?,
    );

    let found = dispatcher.resolve(transcript);
    let report = MatchReport {
        transcript: transcript.to_string(),
        page,
        matched: found.as_ref().map(tillpoint_register::voice::VoiceMatch::summary),
        intent: found.map(|m| m.command.action.clone()),
    };
    emit(&serde_yaml::to_string(&report)?, None)?;
    Ok(())
}
