//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST
//! API. Domain types already derive Serialize/Deserialize and are carried
//! through directly where they match the wire shape.

use serde::{Deserialize, Serialize};

// Re-export domain types that already serialize the way the API needs.
pub use crate::api::{
    BracketNode, FixtureOutcome, Match, Phase, SchedulingFailure, SetScore, StandingsRow, Zone,
};

/// Request body for building zones.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildZonesRequest {
    /// Desired zone count; computed from the team count when absent.
    #[serde(default)]
    pub zone_count_hint: Option<usize>,
}

/// Response for zone building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZonesResponse {
    pub zones: Vec<Zone>,
    pub total: usize,
}

/// Response for fixture generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureResponse {
    pub scheduled: Vec<Match>,
    pub unscheduled: Vec<SchedulingFailure>,
    pub scheduled_count: usize,
    pub unscheduled_count: usize,
}

impl From<FixtureOutcome> for FixtureResponse {
    fn from(outcome: FixtureOutcome) -> Self {
        Self {
            scheduled_count: outcome.scheduled.len(),
            unscheduled_count: outcome.unscheduled.len(),
            scheduled: outcome.scheduled,
            unscheduled: outcome.unscheduled,
        }
    }
}

/// Response for standings queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub rows: Vec<StandingsRow>,
}

/// Request body for bracket generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateBracketRequest {
    /// Teams qualifying out of each zone.
    pub classified_per_zone: usize,
}

/// Response for bracket generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketResponse {
    pub nodes: Vec<BracketNode>,
    pub total: usize,
}

/// Request body for reporting a match result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResultRequest {
    /// Winning team id.
    pub winner: i64,
    /// Set-by-set score from the home side's perspective. Required for
    /// group matches; ignored for bracket matches.
    #[serde(default)]
    pub sets: Vec<SetScore>,
}

/// Response for reporting a bracket result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceResponse {
    /// The next-round node the winner advanced into, absent when the
    /// confirmed match was the final.
    pub next: Option<BracketNode>,
    /// Whether the tournament is now finished.
    pub finished: bool,
}

/// Request body for a phase transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionPhaseRequest {
    pub target: Phase,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Repository connection status
    pub repository: String,
}
