//! Scheduling engine: computations and the orchestrating facade.
//!
//! The computation modules ([`availability`], [`zones`], [`allocator`],
//! [`standings`], [`bracket`], [`phases`]) are pure transformations over
//! in-memory snapshots; persistence happens only here in the facade, after
//! a computation succeeds, so a failed validation leaves prior data
//! untouched.
//!
//! Operations for the same tournament are serialized through a
//! per-tournament lock; the slot allocator's occupancy bookkeeping is not
//! safe under concurrent mutation. Operations across different tournaments
//! run in parallel.

pub mod allocator;
pub mod availability;
pub mod bracket;
pub mod error;
pub mod phases;
pub mod standings;
pub mod zones;

pub use error::{EngineError, EngineResult};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rand::thread_rng;
use tracing::{debug, info};

use crate::api::{
    BracketNode, FixtureOutcome, Match, MatchId, MatchState, Phase, PlayerId, SetScore,
    StandingsRow, TeamId, Tournament, TournamentId, Zone, ZoneId,
};
use crate::db::{zone_fingerprint, TournamentRepository};
use crate::models::time::{enumerate_slots, DateRange, DayWindow, OperatingHours, SlotTime, TimeOfDay};
use crate::models::tournament::TournamentSettings;

use allocator::AllocatorInput;
use bracket::{Advance, ClassifiedTeam};

// =============================================================================
// Collaborator traits
// =============================================================================

/// Rating change for one player after a confirmed match.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingDelta {
    pub player: PlayerId,
    pub delta: f64,
}

/// External rating engine. The scheduler never computes or validates
/// rating math; it only triggers the call once a match is confirmed.
pub trait RatingEngine: Send + Sync {
    fn rate_match(&self, m: &Match, ratings: &[(PlayerId, f64)]) -> Vec<RatingDelta>;
}

/// Rating engine that produces no deltas; the default when no external
/// engine is wired in.
pub struct NoopRatingEngine;

impl RatingEngine for NoopRatingEngine {
    fn rate_match(&self, _m: &Match, _ratings: &[(PlayerId, f64)]) -> Vec<RatingDelta> {
        Vec::new()
    }
}

/// Clock abstraction so tests can pin the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// System clock (UTC).
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Utc::now().date_naive()
    }
}

// =============================================================================
// Per-tournament serialization
// =============================================================================

/// Lock map serializing scheduling operations per tournament.
#[derive(Default)]
struct TournamentLocks {
    inner: parking_lot::Mutex<HashMap<TournamentId, Arc<tokio::sync::Mutex<()>>>>,
}

impl TournamentLocks {
    fn lock_for(&self, id: TournamentId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock();
        map.entry(id).or_default().clone()
    }
}

// =============================================================================
// Engine facade
// =============================================================================

/// The scheduling engine facade exposed to the rest of the system.
///
/// Every operation loads the full relevant dataset for one tournament,
/// computes in memory and persists atomically. Validation errors abort
/// before any persistence.
pub struct ScheduleEngine {
    repository: Arc<dyn TournamentRepository>,
    rating: Arc<dyn RatingEngine>,
    clock: Arc<dyn Clock>,
    locks: TournamentLocks,
}

impl ScheduleEngine {
    pub fn new(repository: Arc<dyn TournamentRepository>) -> Self {
        Self {
            repository,
            rating: Arc::new(NoopRatingEngine),
            clock: Arc::new(SystemClock),
            locks: TournamentLocks::default(),
        }
    }

    /// Wire in an external rating engine.
    pub fn with_rating_engine(mut self, rating: Arc<dyn RatingEngine>) -> Self {
        self.rating = rating;
        self
    }

    /// Replace the clock (tests pin the current date through this).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn repository(&self) -> &Arc<dyn TournamentRepository> {
        &self.repository
    }

    /// Create a tournament. When no settings are supplied the date range
    /// defaults to two weeks starting today, 18:00-22:00 on weekdays and
    /// 09:00-21:00 on weekends.
    pub async fn create_tournament(
        &self,
        name: &str,
        settings: Option<TournamentSettings>,
    ) -> EngineResult<Tournament> {
        let settings = match settings {
            Some(s) => s,
            None => self.default_settings()?,
        };
        let mut tournament = Tournament::new(name, settings);
        let id = self.repository.store_tournament(&tournament).await?;
        tournament.id = Some(id);
        info!(tournament = %id, name, "tournament created");
        Ok(tournament)
    }

    fn default_settings(&self) -> EngineResult<TournamentSettings> {
        let start = self.clock.today();
        let end = start + Duration::days(13);
        let dates = DateRange::new(start, end)
            .ok_or_else(|| EngineError::configuration("Default date range is inverted"))?;
        let weekday = DayWindow::new(TimeOfDay::from_hm(18, 0), TimeOfDay::from_hm(22, 0))
            .ok_or_else(|| EngineError::configuration("Default weekday window is inverted"))?;
        let weekend = DayWindow::new(TimeOfDay::from_hm(9, 0), TimeOfDay::from_hm(21, 0))
            .ok_or_else(|| EngineError::configuration("Default weekend window is inverted"))?;
        Ok(TournamentSettings::new(
            dates,
            OperatingHours::new(weekday, weekend),
        ))
    }

    fn calendar(tournament: &Tournament) -> Vec<SlotTime> {
        enumerate_slots(
            &tournament.settings.dates,
            &tournament.settings.hours,
            tournament.settings.match_duration_min,
        )
    }

    // =========================================================================
    // Zone building
    // =========================================================================

    /// Partition the tournament's confirmed teams into balanced zones and
    /// persist them, discarding any previous zones and fixture.
    pub async fn build_zones(
        &self,
        tournament_id: TournamentId,
        zone_count_hint: Option<usize>,
    ) -> EngineResult<Vec<Zone>> {
        let guard = self.locks.lock_for(tournament_id);
        let _held = guard.lock().await;

        let mut tournament = self.repository.get_tournament(tournament_id).await?;
        phases::ensure_phase(&tournament, Phase::BuildingZones, "build zones")?;

        let teams = self.repository.list_teams(tournament_id).await?;
        let calendar = Self::calendar(&tournament);
        let points = availability::team_points(&teams, &calendar);

        let assignments =
            zones::build_zones(&teams, &points, zone_count_hint, &tournament.settings)?;

        let zones = self
            .repository
            .replace_zones(tournament_id, assignments)
            .await?;

        // Any previously generated fixture was discarded with the old
        // zones; the fingerprint goes stale with it.
        tournament.zone_checksum = None;
        self.repository.update_tournament(&tournament).await?;

        info!(
            tournament = %tournament_id,
            zones = zones.len(),
            "zones rebuilt"
        );
        Ok(zones)
    }

    // =========================================================================
    // Fixture generation
    // =========================================================================

    /// Generate the round-robin fixture for all zones and persist it.
    ///
    /// Returns the scheduled matches plus an explicit list of matches that
    /// could not be placed; a partial schedule is a normal outcome for
    /// operators to resolve, not an error.
    pub async fn generate_fixture(
        &self,
        tournament_id: TournamentId,
    ) -> EngineResult<FixtureOutcome> {
        let guard = self.locks.lock_for(tournament_id);
        let _held = guard.lock().await;

        let mut tournament = self.repository.get_tournament(tournament_id).await?;
        phases::ensure_phase(&tournament, Phase::BuildingZones, "generate fixture")?;

        let zones = self.repository.list_zones(tournament_id).await?;
        if zones.is_empty() {
            return Err(EngineError::validation(format!(
                "Tournament {} has no zones; build zones before generating a fixture",
                tournament_id
            )));
        }

        let teams = self.repository.list_teams(tournament_id).await?;
        let courts = self.repository.list_courts(tournament_id).await?;
        let slots = Self::calendar(&tournament);
        let points = availability::team_points(&teams, &slots);

        let outcome = allocator::allocate(&AllocatorInput {
            zones: &zones,
            teams: &teams,
            points: &points,
            courts: &courts,
            slots: &slots,
            rest_window_min: tournament.settings.rest_window_min,
        });

        // Unplaced matches are persisted as pending so the group stage
        // waits on them until the operator reschedules or cancels.
        let mut to_store = outcome.scheduled.clone();
        for failure in &outcome.unscheduled {
            to_store.push(Match::pending(
                tournament_id,
                failure.zone_id,
                failure.home,
                failure.away,
            ));
        }
        let stored = self
            .repository
            .replace_group_matches(tournament_id, to_store)
            .await?;

        tournament.zone_checksum = Some(zone_fingerprint(&zones));
        self.repository.update_tournament(&tournament).await?;

        let scheduled: Vec<Match> = stored
            .into_iter()
            .filter(|m| m.state == MatchState::Scheduled)
            .collect();
        info!(
            tournament = %tournament_id,
            scheduled = scheduled.len(),
            unscheduled = outcome.unscheduled.len(),
            "fixture generated"
        );
        Ok(FixtureOutcome {
            scheduled,
            unscheduled: outcome.unscheduled,
        })
    }

    // =========================================================================
    // Standings
    // =========================================================================

    /// Ranked standings table for one zone, derived from confirmed matches.
    pub async fn get_standings(&self, zone_id: ZoneId) -> EngineResult<Vec<StandingsRow>> {
        let zone = self.repository.get_zone(zone_id).await?;
        let tournament = self.repository.get_tournament(zone.tournament_id).await?;
        phases::ensure_phase_in(
            &tournament,
            &[Phase::GroupStage, Phase::EliminationStage, Phase::Finished],
            "read standings",
        )?;

        let matches = self.repository.matches_for_zone(zone_id).await?;
        Ok(standings::compute_standings(&zone, &matches))
    }

    // =========================================================================
    // Bracket
    // =========================================================================

    /// Build the elimination bracket from zone standings and persist it,
    /// transitioning the tournament into the elimination stage.
    ///
    /// `classified_per_zone` is how many teams qualify out of each zone
    /// (at least 1, at most the smallest zone's size).
    pub async fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        classified_per_zone: usize,
    ) -> EngineResult<Vec<BracketNode>> {
        let guard = self.locks.lock_for(tournament_id);
        let _held = guard.lock().await;

        let mut tournament = self.repository.get_tournament(tournament_id).await?;
        phases::ensure_phase(&tournament, Phase::GroupStage, "generate bracket")?;

        let matches = self.repository.list_group_matches(tournament_id).await?;
        if !phases::group_stage_complete(&matches) {
            return Err(EngineError::validation(format!(
                "Tournament {} still has open group matches; bracket generation requires a complete group stage",
                tournament_id
            )));
        }

        let zones = self.repository.list_zones(tournament_id).await?;
        match &tournament.zone_checksum {
            Some(stored) if *stored == zone_fingerprint(&zones) => {}
            Some(_) => {
                return Err(EngineError::validation(format!(
                    "Zones of tournament {} changed after the fixture was generated; regenerate the fixture first",
                    tournament_id
                )))
            }
            None => {
                return Err(EngineError::validation(format!(
                    "Tournament {} has no generated fixture",
                    tournament_id
                )))
            }
        }

        if classified_per_zone == 0 {
            return Err(EngineError::validation(
                "At least one team must classify per zone",
            ));
        }
        if let Some(smallest) = zones.iter().map(|z| z.team_ids.len()).min() {
            if classified_per_zone > smallest {
                return Err(EngineError::validation(format!(
                    "Cannot classify {} teams from zones of {}",
                    classified_per_zone, smallest
                )));
            }
        }

        let teams = self.repository.list_teams(tournament_id).await?;
        let ratings: HashMap<TeamId, f64> = teams
            .iter()
            .filter_map(|t| t.id.map(|id| (id, t.pair_rating())))
            .collect();

        let mut classified = Vec::new();
        for zone in &zones {
            let table = standings::compute_standings(zone, &matches);
            for (rank_index, row) in table.iter().take(classified_per_zone).enumerate() {
                classified.push(ClassifiedTeam {
                    team_id: row.team_id,
                    zone_rank: rank_index + 1,
                    points: row.points,
                    rating: ratings.get(&row.team_id).copied().unwrap_or(0.0),
                });
            }
        }

        let seeds = bracket::seed_order(classified, &mut thread_rng());
        let nodes = bracket::build_bracket(
            tournament_id,
            &seeds,
            tournament.settings.max_bracket_size,
        )?;

        let stored = self.repository.replace_bracket(tournament_id, nodes).await?;

        phases::transition(&mut tournament, Phase::EliminationStage)?;
        self.repository.update_tournament(&tournament).await?;

        info!(
            tournament = %tournament_id,
            teams = seeds.len(),
            nodes = stored.len(),
            "bracket generated"
        );
        Ok(stored)
    }

    /// Record the winner of a bracket match and propagate it.
    ///
    /// Returns the next-round node the winner advanced into, the bracket
    /// node itself when it was already resolved (a bye), or `None` when
    /// the confirmed match was the final — in which case the tournament
    /// transitions to finished.
    pub async fn advance_winner(
        &self,
        match_id: MatchId,
        winning_team: TeamId,
    ) -> EngineResult<Option<BracketNode>> {
        let node = self.repository.get_bracket_node(match_id).await?;
        let tournament_id = node.tournament_id;

        let guard = self.locks.lock_for(tournament_id);
        let _held = guard.lock().await;

        let mut tournament = self.repository.get_tournament(tournament_id).await?;
        phases::ensure_phase(&tournament, Phase::EliminationStage, "advance a winner")?;

        let mut nodes = self.repository.bracket_nodes(tournament_id).await?;
        let advance =
            bracket::advance_winner(&mut nodes, node.round, node.number, winning_team)?;

        match advance {
            Advance::AlreadyResolved(resolved) => {
                debug!(match_id = %match_id, "bye already resolved; nothing to advance");
                Ok(Some(resolved))
            }
            Advance::Next(next) => {
                self.repository.update_bracket_nodes(&nodes).await?;
                Ok(Some(next))
            }
            Advance::Final => {
                self.repository.update_bracket_nodes(&nodes).await?;
                phases::transition(&mut tournament, Phase::Finished)?;
                self.repository.update_tournament(&tournament).await?;
                info!(tournament = %tournament_id, winner = %winning_team, "final confirmed, tournament finished");
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Confirm a group match result: record the score and winner, then
    /// trigger the external rating engine.
    pub async fn confirm_result(
        &self,
        match_id: MatchId,
        winning_team: TeamId,
        score: Vec<SetScore>,
    ) -> EngineResult<Match> {
        let existing = self.repository.get_match(match_id).await?;
        let tournament_id = existing.tournament_id;

        let guard = self.locks.lock_for(tournament_id);
        let _held = guard.lock().await;

        let tournament = self.repository.get_tournament(tournament_id).await?;
        phases::ensure_phase(&tournament, Phase::GroupStage, "confirm a result")?;

        let mut m = self.repository.get_match(match_id).await?;
        if !matches!(m.state, MatchState::Scheduled | MatchState::InProgress) {
            return Err(EngineError::validation(format!(
                "Match {} cannot be confirmed from state {:?}",
                match_id, m.state
            )));
        }
        if !m.involves(winning_team) {
            return Err(EngineError::validation(format!(
                "Team {} did not play match {}",
                winning_team, match_id
            )));
        }
        if score.is_empty() {
            return Err(EngineError::validation(
                "A confirmed result requires at least one set",
            ));
        }

        m.state = MatchState::Confirmed;
        m.winner = Some(winning_team);
        m.score = score;
        self.repository.update_match(&m).await?;

        // Rating math is a black box elsewhere; only the trigger lives here.
        let teams = self.repository.list_teams(tournament_id).await?;
        let ratings: Vec<(PlayerId, f64)> = teams
            .iter()
            .filter(|t| t.id.map_or(false, |id| m.involves(id)))
            .flat_map(|t| [(t.player_a, t.rating_a), (t.player_b, t.rating_b)])
            .collect();
        let deltas = self.rating.rate_match(&m, &ratings);
        debug!(match_id = %match_id, deltas = deltas.len(), "rating engine notified");

        Ok(m)
    }

    // =========================================================================
    // Phase transitions
    // =========================================================================

    /// Apply an explicit phase transition, with the extra readiness guards
    /// the transition table alone cannot express.
    pub async fn transition_phase(
        &self,
        tournament_id: TournamentId,
        target: Phase,
    ) -> EngineResult<Tournament> {
        let guard = self.locks.lock_for(tournament_id);
        let _held = guard.lock().await;

        let mut tournament = self.repository.get_tournament(tournament_id).await?;

        match target {
            Phase::GroupStage => {
                let matches = self.repository.list_group_matches(tournament_id).await?;
                if matches.is_empty() {
                    return Err(EngineError::validation(format!(
                        "Tournament {} has no fixture; generate one before starting the group stage",
                        tournament_id
                    )));
                }
            }
            Phase::EliminationStage => {
                let matches = self.repository.list_group_matches(tournament_id).await?;
                if !phases::group_stage_complete(&matches) {
                    return Err(EngineError::validation(format!(
                        "Tournament {} still has open group matches",
                        tournament_id
                    )));
                }
                let nodes = self.repository.bracket_nodes(tournament_id).await?;
                if nodes.is_empty() {
                    return Err(EngineError::validation(format!(
                        "Tournament {} has no bracket; generate one to enter the elimination stage",
                        tournament_id
                    )));
                }
            }
            Phase::Finished => {
                let nodes = self.repository.bracket_nodes(tournament_id).await?;
                let final_resolved = nodes
                    .iter()
                    .max_by_key(|n| n.round)
                    .map_or(false, |f| f.is_resolved());
                if !final_resolved {
                    return Err(EngineError::validation(format!(
                        "Tournament {} has an unresolved final",
                        tournament_id
                    )));
                }
            }
            Phase::Registration | Phase::BuildingZones => {}
        }

        phases::transition(&mut tournament, target)?;
        self.repository.update_tournament(&tournament).await?;
        info!(tournament = %tournament_id, phase = %target, "phase transition applied");
        Ok(tournament)
    }
}
