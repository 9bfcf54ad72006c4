//! Voice route handlers.
//!
//! The client runs the speech recognizer and posts its events here. Final
//! transcripts are resolved against the global and page commands and the
//! matched intent runs through the same actions as the till buttons.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use tillpoint_core::Feature;

use crate::actions::{self, ActionEffect, PosIntent};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::permissions::{Access, PermissionGate};
use crate::state::AppState;
use crate::voice::{MatchSummary, RemoteSession, SpeechError, SpeechEvent, VoiceListener};

#[derive(Debug, Serialize)]
pub struct VoiceStatus {
    pub supported: bool,
    pub listening: bool,
    pub transcript: String,
    pub session: RemoteSession,
    pub page: Option<Feature>,
}

async fn status_of(state: &AppState) -> VoiceStatus {
    let voice = state.voice().await;
    let listener = voice.listener.as_ref();
    VoiceStatus {
        supported: listener.is_some(),
        listening: listener.is_some_and(VoiceListener::is_listening),
        transcript: listener
            .map(|l| l.current_transcript().to_string())
            .unwrap_or_default(),
        session: listener
            .map(|l| l.recognizer().session())
            .unwrap_or_default(),
        page: voice.page(),
    }
}

#[instrument(skip(state, _user))]
pub async fn status(State(state): State<AppState>, _user: CurrentUser) -> Json<VoiceStatus> {
    Json(status_of(&state).await)
}

#[instrument(skip(state, _user))]
pub async fn start(State(state): State<AppState>, _user: CurrentUser) -> Result<Json<VoiceStatus>> {
    {
        let mut voice = state.voice().await;
        let listener = voice.listener.as_mut().ok_or(SpeechError::Unsupported)?;
        listener.start()?;
    }
    Ok(Json(status_of(&state).await))
}

#[instrument(skip(state, _user))]
pub async fn stop(State(state): State<AppState>, _user: CurrentUser) -> Result<Json<VoiceStatus>> {
    {
        let mut voice = state.voice().await;
        let listener = voice.listener.as_mut().ok_or(SpeechError::Unsupported)?;
        listener.stop();
    }
    Ok(Json(status_of(&state).await))
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: Feature,
}

/// Register the commands of the page the client now shows.
#[instrument(skip(state, user))]
pub async fn page(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<PageRequest>,
) -> Result<Json<VoiceStatus>> {
    user.require(request.page)?;
    state.voice().await.show_page(
        request.page,
        state.catalog(),
        &state.config().checkout.payment_methods,
    )?;
    Ok(Json(status_of(&state).await))
}

#[derive(Debug, Default, Serialize)]
pub struct VoiceEventResponse {
    /// Final transcript, when the event completed an utterance.
    pub transcript: Option<String>,
    #[serde(rename = "match")]
    pub matched: Option<MatchSummary>,
    pub effect: Option<ActionEffect>,
}

/// Feed one recognizer event.
#[instrument(skip(state, user))]
pub async fn events(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(event): Json<SpeechEvent>,
) -> Result<Json<VoiceEventResponse>> {
    let payment_methods = &state.config().checkout.payment_methods;

    let (transcript, resolved) = {
        let mut voice = state.voice().await;
        let listener = voice.listener.as_mut().ok_or(SpeechError::Unsupported)?;
        let Some(transcript) = listener.handle(event) else {
            return Ok(Json(VoiceEventResponse::default()));
        };
        voice.refresh(state.catalog(), payment_methods)?;
        let resolved = voice
            .dispatcher
            .resolve(&transcript)
            .map(|found| (found.summary(), found.command.action.clone()));
        (transcript, resolved)
    };

    let Some((summary, intent)) = resolved else {
        debug!(%transcript, "No voice command matched");
        return Ok(Json(VoiceEventResponse {
            transcript: Some(transcript),
            ..VoiceEventResponse::default()
        }));
    };
    info!(
        command = %summary.command,
        score = summary.score,
        kind = ?summary.kind,
        "Voice command matched"
    );

    let effect = run_intent(&state, &user, intent).await?;
    Ok(Json(VoiceEventResponse {
        transcript: Some(transcript),
        matched: Some(summary),
        effect: Some(effect),
    }))
}

async fn run_intent(state: &AppState, user: &CurrentUser, intent: PosIntent) -> Result<ActionEffect> {
    match intent {
        PosIntent::Navigate { feature } => match PermissionGate::check(user.user(), feature) {
            Access::Allow => {
                state.voice().await.show_page(
                    feature,
                    state.catalog(),
                    &state.config().checkout.payment_methods,
                )?;
                Ok(ActionEffect::Navigate {
                    route: feature.route(),
                })
            }
            Access::Redirect(route) => Ok(ActionEffect::Navigate { route }),
        },
        PosIntent::Logout => Ok(ActionEffect::Logout),
        intent => {
            user.require(Feature::Pos)?;
            let mut register = state.register().await;
            actions::apply(&mut *register, intent)
                .await
                .map_err(AppError::from)
        }
    }
}
