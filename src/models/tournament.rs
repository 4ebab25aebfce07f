//! Tournament aggregate, lifecycle phases and settings.

use serde::{Deserialize, Serialize};

use crate::api::{CourtId, TournamentId};
use crate::models::time::{DateRange, OperatingHours};

/// Tournament lifecycle phase.
///
/// Phases gate which scheduling operations may run. Transitions are
/// forward-only, with one explicit rollback: `BuildingZones` back to
/// `Registration` to re-open registration before any fixture exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Registration,
    BuildingZones,
    GroupStage,
    EliminationStage,
    Finished,
}

impl Phase {
    /// Whether a transition from `self` to `target` is legal.
    pub fn can_transition_to(self, target: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, target),
            (Registration, BuildingZones)
                | (BuildingZones, Registration)
                | (BuildingZones, GroupStage)
                | (GroupStage, EliminationStage)
                | (EliminationStage, Finished)
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Registration => "registration",
            Phase::BuildingZones => "building_zones",
            Phase::GroupStage => "group_stage",
            Phase::EliminationStage => "elimination_stage",
            Phase::Finished => "finished",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A playing court. Inactive courts are excluded from allocation but kept
/// for the history of matches already played on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    #[serde(default)]
    pub id: Option<CourtId>,
    pub name: String,
    pub active: bool,
}

impl Court {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            active: true,
        }
    }
}

/// Scheduling knobs for a tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSettings {
    /// Fixed match length; also the slot tick size.
    #[serde(default = "default_match_duration")]
    pub match_duration_min: u16,
    /// Minimum time between two match starts sharing a player.
    #[serde(default = "default_rest_window")]
    pub rest_window_min: u16,
    #[serde(default = "default_zone_size_min")]
    pub zone_size_min: usize,
    #[serde(default = "default_zone_size_max")]
    pub zone_size_max: usize,
    /// Hard cap on the elimination tree size.
    #[serde(default = "default_max_bracket_size")]
    pub max_bracket_size: usize,
    pub dates: DateRange,
    pub hours: OperatingHours,
}

fn default_match_duration() -> u16 {
    50
}

fn default_rest_window() -> u16 {
    60
}

fn default_zone_size_min() -> usize {
    2
}

fn default_zone_size_max() -> usize {
    3
}

fn default_max_bracket_size() -> usize {
    16
}

impl TournamentSettings {
    pub fn new(dates: DateRange, hours: OperatingHours) -> Self {
        Self {
            match_duration_min: default_match_duration(),
            rest_window_min: default_rest_window(),
            zone_size_min: default_zone_size_min(),
            zone_size_max: default_zone_size_max(),
            max_bracket_size: default_max_bracket_size(),
            dates,
            hours,
        }
    }
}

/// Top-level tournament record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    #[serde(default)]
    pub id: Option<TournamentId>,
    pub name: String,
    pub phase: Phase,
    pub settings: TournamentSettings,
    /// Fingerprint of the zone membership the current fixture was generated
    /// from; used to detect a fixture gone stale after zones are rebuilt.
    #[serde(default)]
    pub zone_checksum: Option<String>,
}

impl Tournament {
    pub fn new(name: impl Into<String>, settings: TournamentSettings) -> Self {
        Self {
            id: None,
            name: name.into(),
            phase: Phase::Registration,
            settings,
            zone_checksum: None,
        }
    }
}
