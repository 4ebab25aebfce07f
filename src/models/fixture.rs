//! Fixture domain types: zones, matches, standings rows, bracket nodes and
//! per-match scheduling failures.

use serde::{Deserialize, Serialize};

use crate::api::{CourtId, MatchId, TeamId, TournamentId, ZoneId};
use crate::models::time::SlotTime;

/// A round-robin group of 2-3 teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub tournament_id: TournamentId,
    /// Display label ("Zone A", "Zone B", ...).
    pub label: String,
    /// Stable position of this zone within the tournament (0-based); the
    /// allocator uses it for deterministic match ordering.
    pub position: usize,
    /// Member teams, in standings input order.
    pub team_ids: Vec<TeamId>,
}

/// Zone membership before persistence assigns identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAssignment {
    pub label: String,
    pub position: usize,
    pub team_ids: Vec<TeamId>,
}

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    Pending,
    Scheduled,
    InProgress,
    Confirmed,
    Bye,
    Cancelled,
}

/// Games won by each side within one set, from the home side's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    pub home: u8,
    pub away: u8,
}

impl SetScore {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }
}

/// A committed (slot, court) assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSlot {
    pub slot: SlotTime,
    pub court: CourtId,
}

/// A group-stage match between two teams of the same zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    #[serde(default)]
    pub id: Option<MatchId>,
    pub tournament_id: TournamentId,
    pub zone_id: ZoneId,
    pub home: TeamId,
    pub away: TeamId,
    /// Assigned slot and court; `None` until the allocator places the match.
    #[serde(default)]
    pub slot: Option<MatchSlot>,
    pub state: MatchState,
    #[serde(default)]
    pub winner: Option<TeamId>,
    #[serde(default)]
    pub score: Vec<SetScore>,
}

impl Match {
    pub fn pending(tournament_id: TournamentId, zone_id: ZoneId, home: TeamId, away: TeamId) -> Self {
        Self {
            id: None,
            tournament_id,
            zone_id,
            home,
            away,
            slot: None,
            state: MatchState::Pending,
            winner: None,
            score: Vec::new(),
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }

    /// Whether this match still needs a result before the group stage can
    /// close. Cancelled matches are not waited on.
    pub fn is_open(&self) -> bool {
        matches!(
            self.state,
            MatchState::Pending | MatchState::Scheduled | MatchState::InProgress
        )
    }
}

/// A node of the single-elimination tree.
///
/// Rounds are 1-based from the first elimination round; `number` is the
/// 1-based match number within the round. Input slots are `None` until an
/// earlier result (or a bye at creation time) fills them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketNode {
    #[serde(default)]
    pub id: Option<MatchId>,
    pub tournament_id: TournamentId,
    pub round: u32,
    pub number: u32,
    #[serde(default)]
    pub home: Option<TeamId>,
    #[serde(default)]
    pub away: Option<TeamId>,
    pub state: MatchState,
    #[serde(default)]
    pub winner: Option<TeamId>,
    #[serde(default)]
    pub score: Vec<SetScore>,
}

impl BracketNode {
    pub fn pending(tournament_id: TournamentId, round: u32, number: u32) -> Self {
        Self {
            id: None,
            tournament_id,
            round,
            number,
            home: None,
            away: None,
            state: MatchState::Pending,
            winner: None,
            score: Vec::new(),
        }
    }

    /// Create a first-round bye: the lone real team is the winner from the
    /// moment the node exists.
    pub fn bye(tournament_id: TournamentId, round: u32, number: u32, team: TeamId) -> Self {
        Self {
            id: None,
            tournament_id,
            round,
            number,
            home: Some(team),
            away: None,
            state: MatchState::Bye,
            winner: Some(team),
            score: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.winner.is_some()
    }
}

/// Reason a match could not be placed, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The two teams' bookable point sets never intersect.
    NoTimeOverlap,
    /// Every mutually bookable tick violates some player's rest window.
    RestWindowConflict,
    /// Ticks passed the time and rest checks but all courts were taken.
    NoCourtAvailable,
}

impl FailureReason {
    pub fn code(self) -> &'static str {
        match self {
            FailureReason::NoTimeOverlap => "no_time_overlap",
            FailureReason::RestWindowConflict => "rest_window_conflict",
            FailureReason::NoCourtAvailable => "no_court_available",
        }
    }
}

/// A match the allocator could not place, returned alongside the scheduled
/// ones for operator remediation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingFailure {
    pub zone_id: ZoneId,
    pub home: TeamId,
    pub away: TeamId,
    pub reason: FailureReason,
}

/// Outcome of fixture generation: a partial schedule is a normal,
/// actionable result, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FixtureOutcome {
    pub scheduled: Vec<Match>,
    pub unscheduled: Vec<SchedulingFailure>,
}

/// Per-team statistics within a zone, derived from confirmed matches.
/// Never persisted as a source of truth; always recomputable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub sets_for: u32,
    pub sets_against: u32,
    pub games_for: u32,
    pub games_against: u32,
    pub points: u32,
}

impl StandingsRow {
    pub fn empty(team_id: TeamId) -> Self {
        Self {
            team_id,
            played: 0,
            won: 0,
            lost: 0,
            sets_for: 0,
            sets_against: 0,
            games_for: 0,
            games_against: 0,
            points: 0,
        }
    }

    pub fn set_diff(&self) -> i64 {
        self.sets_for as i64 - self.sets_against as i64
    }

    pub fn game_diff(&self) -> i64 {
        self.games_for as i64 - self.games_against as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_match_is_open() {
        let m = Match::pending(
            TournamentId::new(1),
            ZoneId::new(1),
            TeamId::new(1),
            TeamId::new(2),
        );
        assert!(m.is_open());
        assert!(m.slot.is_none());
        assert!(m.involves(TeamId::new(2)));
        assert!(!m.involves(TeamId::new(3)));
    }

    #[test]
    fn test_cancelled_match_is_not_open() {
        let mut m = Match::pending(
            TournamentId::new(1),
            ZoneId::new(1),
            TeamId::new(1),
            TeamId::new(2),
        );
        m.state = MatchState::Cancelled;
        assert!(!m.is_open());
    }

    #[test]
    fn test_bye_node_is_resolved_at_creation() {
        let node = BracketNode::bye(TournamentId::new(1), 1, 3, TeamId::new(9));
        assert_eq!(node.state, MatchState::Bye);
        assert_eq!(node.winner, Some(TeamId::new(9)));
        assert!(node.is_resolved());
    }

    #[test]
    fn test_standings_row_diffs() {
        let mut row = StandingsRow::empty(TeamId::new(1));
        row.sets_for = 4;
        row.sets_against = 1;
        row.games_for = 24;
        row.games_against = 30;

        assert_eq!(row.set_diff(), 3);
        assert_eq!(row.game_diff(), -6);
    }

    #[test]
    fn test_failure_reason_codes() {
        assert_eq!(FailureReason::NoTimeOverlap.code(), "no_time_overlap");
        assert_eq!(FailureReason::NoCourtAvailable.code(), "no_court_available");
        assert_eq!(
            FailureReason::RestWindowConflict.code(),
            "rest_window_conflict"
        );
    }
}
