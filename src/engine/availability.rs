//! Availability materialization.
//!
//! Each team's declared availability (forbidden windows, or none) is
//! normalized into the set of calendar slot ticks the team could actually
//! be scheduled into. Two teams are compatible at a tick iff both sets
//! contain it.
//!
//! An absent or empty restriction list short-circuits to "all tournament
//! ticks available" rather than "no ticks available"; the tagged
//! `AvailabilitySpec` type plus a regression test keep that edge case from
//! regressing.

use std::collections::{BTreeMap, BTreeSet};

use crate::api::{AvailabilitySpec, SlotTime, Team, TeamId};

/// Ordered set of bookable slot ticks for one team.
pub type BookablePoints = BTreeSet<SlotTime>;

/// Materialize the bookable point set for one availability spec over the
/// tournament calendar.
pub fn bookable_points(spec: &AvailabilitySpec, calendar: &[SlotTime]) -> BookablePoints {
    if spec.is_unrestricted() {
        return calendar.iter().copied().collect();
    }

    calendar
        .iter()
        .copied()
        .filter(|tick| !spec.blocks(tick.weekday(), tick.start))
        .collect()
}

/// Materialize bookable point sets for every team, keyed by team id.
/// Teams without an assigned id are skipped; persisted teams always carry
/// one.
pub fn team_points(teams: &[Team], calendar: &[SlotTime]) -> BTreeMap<TeamId, BookablePoints> {
    teams
        .iter()
        .filter_map(|team| {
            team.id
                .map(|id| (id, bookable_points(&team.availability, calendar)))
        })
        .collect()
}

/// Pairwise compatibility weight: the fraction of shared bookable ticks,
/// normalized by the smaller set. 1.0 for two unrestricted teams, 0.0 when
/// either set is empty or the sets never intersect.
pub fn compatibility(a: &BookablePoints, b: &BookablePoints) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / smaller as f64
}
