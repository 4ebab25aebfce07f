//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! scheduling engine facade for business logic.

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{
    AdvanceResponse, BracketResponse, BuildZonesRequest, FixtureResponse, GenerateBracketRequest,
    HealthResponse, MatchResultRequest, StandingsResponse, TransitionPhaseRequest, ZonesResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{MatchId, TeamId, Tournament, TournamentId, ZoneId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the
/// repository is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repo_status = match state.engine.repository().health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        repository: repo_status,
    }))
}

// =============================================================================
// Scheduling operations
// =============================================================================

/// POST /v1/tournaments/{tournament_id}/zones
///
/// Partition the tournament's confirmed teams into balanced zones.
pub async fn build_zones(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
    Json(request): Json<BuildZonesRequest>,
) -> HandlerResult<ZonesResponse> {
    let zones = state
        .engine
        .build_zones(TournamentId::new(tournament_id), request.zone_count_hint)
        .await?;

    Ok(Json(ZonesResponse {
        total: zones.len(),
        zones,
    }))
}

/// POST /v1/tournaments/{tournament_id}/fixture
///
/// Generate the round-robin fixture. The response carries both the
/// scheduled matches and the ones that could not be placed.
pub async fn generate_fixture(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
) -> HandlerResult<FixtureResponse> {
    let outcome = state
        .engine
        .generate_fixture(TournamentId::new(tournament_id))
        .await?;
    Ok(Json(outcome.into()))
}

/// GET /v1/zones/{zone_id}/standings
///
/// Ranked standings table for one zone.
pub async fn get_standings(
    State(state): State<AppState>,
    Path(zone_id): Path<i64>,
) -> HandlerResult<StandingsResponse> {
    let rows = state.engine.get_standings(ZoneId::new(zone_id)).await?;
    Ok(Json(StandingsResponse { rows }))
}

/// POST /v1/tournaments/{tournament_id}/bracket
///
/// Build the elimination bracket from zone standings.
pub async fn generate_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
    Json(request): Json<GenerateBracketRequest>,
) -> HandlerResult<BracketResponse> {
    let nodes = state
        .engine
        .generate_bracket(TournamentId::new(tournament_id), request.classified_per_zone)
        .await?;

    Ok(Json(BracketResponse {
        total: nodes.len(),
        nodes,
    }))
}

/// POST /v1/matches/{match_id}/result
///
/// Confirm a group match result.
pub async fn confirm_result(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
    Json(request): Json<MatchResultRequest>,
) -> HandlerResult<crate::api::Match> {
    if request.sets.is_empty() {
        return Err(AppError::BadRequest(
            "A group match result requires at least one set".to_string(),
        ));
    }
    let confirmed = state
        .engine
        .confirm_result(
            MatchId::new(match_id),
            TeamId::new(request.winner),
            request.sets,
        )
        .await?;
    Ok(Json(confirmed))
}

/// POST /v1/bracket-matches/{match_id}/result
///
/// Record the winner of a bracket match and propagate it into the next
/// round.
pub async fn advance_winner(
    State(state): State<AppState>,
    Path(match_id): Path<i64>,
    Json(request): Json<MatchResultRequest>,
) -> HandlerResult<AdvanceResponse> {
    let next = state
        .engine
        .advance_winner(MatchId::new(match_id), TeamId::new(request.winner))
        .await?;

    Ok(Json(AdvanceResponse {
        finished: next.is_none(),
        next,
    }))
}

/// POST /v1/tournaments/{tournament_id}/phase
///
/// Apply an explicit phase transition.
pub async fn transition_phase(
    State(state): State<AppState>,
    Path(tournament_id): Path<i64>,
    Json(request): Json<TransitionPhaseRequest>,
) -> HandlerResult<Tournament> {
    let tournament = state
        .engine
        .transition_phase(TournamentId::new(tournament_id), request.target)
        .await?;
    Ok(Json(tournament))
}
