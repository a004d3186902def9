//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! db service layer and the guide rendering services.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;

use super::dto::{
    HealthResponse, InvalidateResponse, LineupUpdateRequest, LineupUpdateResponse, WindowQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{Channel, ChannelId, ChannelLineup, ChannelList};
use crate::services::events::GuideEventKind;
use crate::services::session::{render_row, render_snapshot, GuideRow, GuideSnapshot};
use crate::services::settings::{GuideSettings, SettingsAction};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn window_query(query: Result<Query<WindowQuery>, QueryRejection>) -> Result<WindowQuery, AppError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn request_settings(state: &AppState, query: &WindowQuery) -> GuideSettings {
    match query.viewport {
        Some(viewport) => state.settings.reduce(SettingsAction::SetViewport(viewport)),
        None => state.settings.as_ref().clone(),
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repository = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "unavailable".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        repository,
    }))
}

// =============================================================================
// Channels & Lineups
// =============================================================================

/// GET /v1/channels
pub async fn list_channels(State(state): State<AppState>) -> HandlerResult<ChannelList> {
    let channels = db_services::list_channels(state.repository.as_ref()).await?;
    Ok(Json(ChannelList::from(channels)))
}

/// POST /v1/channels
///
/// Create or rename a channel. Sessions are told to refetch the channel list.
pub async fn create_channel(
    State(state): State<AppState>,
    body: Result<Json<Channel>, JsonRejection>,
) -> Result<(StatusCode, Json<Channel>), AppError> {
    let Json(channel) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    state.repository.store_channel(channel.clone()).await?;
    state.events.publish(GuideEventKind::GuideInvalidated);
    Ok((StatusCode::CREATED, Json(channel)))
}

/// DELETE /v1/channels/{channel_id}
pub async fn delete_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let channel_id = ChannelId::new(channel_id);
    db_services::remove_channel(state.repository.as_ref(), &channel_id).await?;
    state
        .events
        .publish(GuideEventKind::ChannelRemoved { channel_id });
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/channels/{channel_id}/lineup?from&to
///
/// Raw lineup: every stored program overlapping the window, untrimmed.
pub async fn get_lineup(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> HandlerResult<ChannelLineup> {
    let query = window_query(query)?;
    let window = query.window()?;
    let lineup = db_services::fetch_channel_lineup(
        state.repository.as_ref(),
        &ChannelId::new(channel_id),
        &window,
    )
    .await?;
    Ok(Json(lineup))
}

/// PUT /v1/channels/{channel_id}/lineup
///
/// Replace the stored lineup and publish `lineupUpdated`.
pub async fn put_lineup(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    body: Result<Json<LineupUpdateRequest>, JsonRejection>,
) -> HandlerResult<LineupUpdateResponse> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let channel_id = ChannelId::new(channel_id);
    let program_count =
        db_services::replace_lineup(state.repository.as_ref(), &channel_id, request.programs)
            .await?;
    let subscribers_notified = state.events.publish(GuideEventKind::LineupUpdated {
        channel_id: channel_id.clone(),
    });

    Ok(Json(LineupUpdateResponse {
        channel_id,
        program_count,
        subscribers_notified,
    }))
}

// =============================================================================
// Rendered Guide
// =============================================================================

/// GET /v1/channels/{channel_id}/guide?from&to[&now][&viewport]
pub async fn get_channel_guide(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> HandlerResult<GuideRow> {
    let query = window_query(query)?;
    let window = query.window()?;
    let now = query.now_or(state.clock.now());
    let settings = request_settings(&state, &query);

    let channel_id = ChannelId::new(channel_id);
    let channel = db_services::get_channel(state.repository.as_ref(), &channel_id).await?;
    let lineup =
        db_services::fetch_channel_lineup(state.repository.as_ref(), &channel_id, &window).await?;

    let row = render_row(&channel, &window, &lineup.programs, now, &settings)?;
    Ok(Json(row))
}

/// GET /v1/guide?from&to[&now][&viewport]
pub async fn get_guide(
    State(state): State<AppState>,
    query: Result<Query<WindowQuery>, QueryRejection>,
) -> HandlerResult<GuideSnapshot> {
    let query = window_query(query)?;
    let window = query.window()?;
    let now = query.now_or(state.clock.now());
    let settings = request_settings(&state, &query);

    let channels = db_services::list_channels(state.repository.as_ref()).await?;
    let mut lineups = Vec::with_capacity(channels.len());
    for channel in channels {
        let lineup =
            db_services::fetch_channel_lineup(state.repository.as_ref(), &channel.id, &window)
                .await?;
        lineups.push((channel, lineup.programs));
    }

    let snapshot = render_snapshot(&window, now, &settings, &lineups)?;
    Ok(Json(snapshot))
}

/// POST /v1/guide/invalidate
///
/// Ask every subscriber to refetch the whole guide.
pub async fn invalidate_guide(State(state): State<AppState>) -> HandlerResult<InvalidateResponse> {
    let subscribers_notified = state.events.publish(GuideEventKind::GuideInvalidated);
    Ok(Json(InvalidateResponse {
        subscribers_notified,
    }))
}

// =============================================================================
// Events
// =============================================================================

/// GET /v1/events
///
/// Server-Sent Events stream of guide events. The SSE event name is the event
/// kind (`lineupUpdated`, `channelRemoved`, `guideInvalidated`).
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.events.subscribe();
    let stream = async_stream::stream! {
        while let Some(event) = subscription.recv().await {
            let data = serde_json::to_string(&event).unwrap_or_default();
            yield Ok(Event::default()
                .event(event.kind.name())
                .id(event.id.clone())
                .data(data));
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
