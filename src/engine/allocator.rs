//! Slot allocation.
//!
//! Assigns every round-robin match to a unique (date, time, court) triple
//! with a single deterministic greedy pass:
//!
//! 1. Enumerate the tournament's slot ticks (chronological).
//! 2. Order matches by (zone position, pair order) so placement is
//!    reproducible.
//! 3. For each match, scan ticks chronologically and commit the first one
//!    where both teams are available, no player is within the rest window
//!    of another booked start, and an active court is free.
//!
//! A match with no acceptable (slot, court) is emitted as unscheduled with
//! a diagnostic reason; the allocator never fails the whole run.
//!
//! Complexity is O(matches x slots x courts), fine at tournament scale
//! (tens of matches, low hundreds of slots).

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::api::{
    Court, CourtId, FailureReason, FixtureOutcome, Match, MatchSlot, MatchState, PlayerId,
    SchedulingFailure, SlotTime, Team, TeamId, Zone,
};
use crate::engine::availability::BookablePoints;

/// Round-robin pairs for one zone, in stable pair order: (0,1), (0,2),
/// (1,2), ... for members in zone input order. A zone of n teams yields
/// exactly n * (n - 1) / 2 pairs.
pub fn round_robin_pairs(zone: &Zone) -> Vec<(TeamId, TeamId)> {
    let members = &zone.team_ids;
    let mut pairs = Vec::with_capacity(members.len() * members.len().saturating_sub(1) / 2);
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            pairs.push((members[i], members[j]));
        }
    }
    pairs
}

/// Everything the allocator needs for one run. Persistence is the caller's
/// concern; the allocator is a pure computation over this snapshot.
pub struct AllocatorInput<'a> {
    pub zones: &'a [Zone],
    pub teams: &'a [Team],
    pub points: &'a BTreeMap<TeamId, BookablePoints>,
    pub courts: &'a [Court],
    pub slots: &'a [SlotTime],
    pub rest_window_min: u16,
}

/// Tracks court occupancy and per-player booked starts during a run.
struct Ledger {
    occupied: HashMap<SlotTime, HashSet<CourtId>>,
    player_starts: HashMap<PlayerId, Vec<SlotTime>>,
}

impl Ledger {
    fn new() -> Self {
        Self {
            occupied: HashMap::new(),
            player_starts: HashMap::new(),
        }
    }

    fn free_court(&self, tick: SlotTime, courts: &[CourtId]) -> Option<CourtId> {
        let taken = self.occupied.get(&tick);
        courts
            .iter()
            .copied()
            .find(|court| taken.map_or(true, |set| !set.contains(court)))
    }

    fn rest_ok(&self, tick: SlotTime, players: &[PlayerId], rest_min: u16) -> bool {
        players.iter().all(|player| {
            self.player_starts
                .get(player)
                .map_or(true, |starts| {
                    starts
                        .iter()
                        .all(|booked| tick.minutes_between(booked) >= rest_min as i64)
                })
        })
    }

    fn commit(&mut self, tick: SlotTime, court: CourtId, players: &[PlayerId]) {
        self.occupied.entry(tick).or_default().insert(court);
        for player in players {
            self.player_starts.entry(*player).or_default().push(tick);
        }
    }
}

/// Place every round-robin match of every zone.
///
/// Matches are returned in placement order: scheduled ones carry a
/// committed `(slot, court)` and the `Scheduled` state; the rest are
/// reported in `unscheduled` with the most fundamental applicable reason.
pub fn allocate(input: &AllocatorInput<'_>) -> FixtureOutcome {
    let players_by_team: HashMap<TeamId, [PlayerId; 2]> = input
        .teams
        .iter()
        .filter_map(|t| t.id.map(|id| (id, t.players())))
        .collect();

    let mut active_courts: Vec<CourtId> = input
        .courts
        .iter()
        .filter(|c| c.active)
        .filter_map(|c| c.id)
        .collect();
    active_courts.sort();

    // Zones in stable position order, pairs in index order: placement is
    // deterministic and reproducible for testing.
    let mut ordered_zones: Vec<&Zone> = input.zones.iter().collect();
    ordered_zones.sort_by_key(|z| z.position);

    let mut outcome = FixtureOutcome::default();
    let mut ledger = Ledger::new();

    for zone in ordered_zones {
        for (home, away) in round_robin_pairs(zone) {
            match place_match(input, &mut ledger, &players_by_team, &active_courts, home, away) {
                Ok(slot) => {
                    let mut m = Match::pending(zone.tournament_id, zone.id, home, away);
                    m.slot = Some(slot);
                    m.state = MatchState::Scheduled;
                    outcome.scheduled.push(m);
                }
                Err(reason) => {
                    warn!(
                        zone = %zone.label,
                        home = %home,
                        away = %away,
                        reason = reason.code(),
                        "match could not be placed"
                    );
                    outcome.unscheduled.push(SchedulingFailure {
                        zone_id: zone.id,
                        home,
                        away,
                        reason,
                    });
                }
            }
        }
    }

    debug!(
        scheduled = outcome.scheduled.len(),
        unscheduled = outcome.unscheduled.len(),
        "fixture allocation finished"
    );
    outcome
}

/// Scan ticks chronologically for the first acceptable (slot, court) for
/// one match, committing it into the ledger on success.
fn place_match(
    input: &AllocatorInput<'_>,
    ledger: &mut Ledger,
    players_by_team: &HashMap<TeamId, [PlayerId; 2]>,
    active_courts: &[CourtId],
    home: TeamId,
    away: TeamId,
) -> Result<MatchSlot, FailureReason> {
    let empty = BookablePoints::new();
    let home_points = input.points.get(&home).unwrap_or(&empty);
    let away_points = input.points.get(&away).unwrap_or(&empty);

    let players: Vec<PlayerId> = [home, away]
        .iter()
        .flat_map(|team| {
            players_by_team
                .get(team)
                .map(|p| p.to_vec())
                .unwrap_or_default()
        })
        .collect();

    let mut any_overlap = false;
    let mut any_rest_ok = false;

    for tick in input.slots {
        if !home_points.contains(tick) || !away_points.contains(tick) {
            continue;
        }
        any_overlap = true;

        if !ledger.rest_ok(*tick, &players, input.rest_window_min) {
            continue;
        }
        any_rest_ok = true;

        if let Some(court) = ledger.free_court(*tick, active_courts) {
            ledger.commit(*tick, court, &players);
            return Ok(MatchSlot { slot: *tick, court });
        }
    }

    // Report the most fundamental reason that explains the failure.
    if !any_overlap {
        Err(FailureReason::NoTimeOverlap)
    } else if !any_rest_ok {
        Err(FailureReason::RestWindowConflict)
    } else {
        Err(FailureReason::NoCourtAvailable)
    }
}

#[cfg(test)]
#[path = "allocator_tests.rs"]
mod allocator_tests;
