//! Zone building.
//!
//! Partitions confirmed teams into `k` balanced zones, maximizing pairwise
//! time compatibility within a zone and rating parity across zones:
//!
//! 1. Compute the compatibility graph (fraction of shared bookable ticks
//!    per pair of teams).
//! 2. Greedily form maximal cliques of mutually compatible teams, seeded
//!    from the most-constrained team; a team joins a candidate group only
//!    if compatible with every current member. Cliques are processed
//!    largest first.
//! 3. Within each clique, sort by pair rating descending and deal to zones
//!    in snake order so every zone ends up with a comparable average.
//!
//! Too few confirmed teams is a validation error; teams are never silently
//! dropped.

use std::collections::BTreeMap;

use tracing::debug;

use crate::api::{Team, TeamId, ZoneAssignment};
use crate::engine::availability::{compatibility, BookablePoints};
use crate::engine::error::{EngineError, EngineResult};
use crate::models::tournament::TournamentSettings;

/// Resolve the zone count for `team_count` teams.
///
/// A supplied hint must keep every zone within the configured size band;
/// otherwise the smallest count that fits the maximum zone size is used.
pub fn resolve_zone_count(
    team_count: usize,
    hint: Option<usize>,
    settings: &TournamentSettings,
) -> EngineResult<usize> {
    let min_size = settings.zone_size_min.max(1);
    let max_size = settings.zone_size_max.max(min_size);

    if team_count < min_size {
        return Err(EngineError::validation(format!(
            "Cannot build zones from {} confirmed teams; at least {} required",
            team_count, min_size
        )));
    }

    match hint {
        Some(k) => {
            if k == 0 || k * min_size > team_count || team_count > k * max_size {
                return Err(EngineError::validation(format!(
                    "Zone count hint {} cannot hold {} teams in zones of {}-{}",
                    k, team_count, min_size, max_size
                )));
            }
            Ok(k)
        }
        None => Ok(team_count.div_ceil(max_size)),
    }
}

/// Zone display label: "Zone A".."Zone Z", then numeric beyond.
fn zone_label(position: usize) -> String {
    if position < 26 {
        format!("Zone {}", (b'A' + position as u8) as char)
    } else {
        format!("Zone {}", position + 1)
    }
}

/// Greedy maximal-clique grouping over the compatibility graph.
///
/// Seeds each clique from the most-constrained remaining team (fewest
/// bookable ticks) and admits a candidate only when it shares at least one
/// tick with every current member. Returned cliques are sorted largest
/// first.
fn compatibility_cliques(
    order: &[TeamId],
    points: &BTreeMap<TeamId, BookablePoints>,
) -> Vec<Vec<TeamId>> {
    let mut remaining: Vec<TeamId> = order.to_vec();
    // Most constrained first, ties broken by id for determinism.
    remaining.sort_by_key(|id| (points.get(id).map_or(0, |p| p.len()), *id));

    let mut cliques: Vec<Vec<TeamId>> = Vec::new();
    while let Some(seed) = remaining.first().copied() {
        let mut clique = vec![seed];
        remaining.retain(|id| *id != seed);

        remaining.retain(|candidate| {
            let compatible_with_all = clique.iter().all(|member| {
                match (points.get(candidate), points.get(member)) {
                    (Some(a), Some(b)) => compatibility(a, b) > 0.0,
                    _ => false,
                }
            });
            if compatible_with_all {
                clique.push(*candidate);
                false
            } else {
                true
            }
        });

        cliques.push(clique);
    }

    cliques.sort_by_key(|c| std::cmp::Reverse(c.len()));
    cliques
}

/// Deals teams to zones in snake order (0, 1, ..., k-1, k-1, ..., 1, 0, ...),
/// skipping zones already at capacity.
struct SnakeDealer {
    zone_count: usize,
    next: usize,
    forward: bool,
}

impl SnakeDealer {
    fn new(zone_count: usize) -> Self {
        Self {
            zone_count,
            next: 0,
            forward: true,
        }
    }

    fn deal(&mut self, zones: &mut [Vec<TeamId>], capacity: usize, team: TeamId) {
        // Some zone is below capacity as long as total placed < k * capacity.
        loop {
            let index = self.next;
            self.advance();
            if zones[index].len() < capacity {
                zones[index].push(team);
                return;
            }
        }
    }

    fn advance(&mut self) {
        if self.zone_count == 1 {
            return;
        }
        if self.forward {
            if self.next + 1 == self.zone_count {
                self.forward = false;
            } else {
                self.next += 1;
            }
        } else if self.next == 0 {
            self.forward = true;
        } else {
            self.next -= 1;
        }
    }
}

/// Partition confirmed teams into balanced zones.
///
/// Only teams in the `Confirmed` state participate. The result is a list
/// of zone assignments ready for atomic persistence; nothing is persisted
/// here.
pub fn build_zones(
    teams: &[Team],
    points: &BTreeMap<TeamId, BookablePoints>,
    hint: Option<usize>,
    settings: &TournamentSettings,
) -> EngineResult<Vec<ZoneAssignment>> {
    let confirmed: Vec<&Team> = teams
        .iter()
        .filter(|t| t.is_confirmed() && t.id.is_some())
        .collect();

    let zone_count = resolve_zone_count(confirmed.len(), hint, settings)?;
    debug!(
        teams = confirmed.len(),
        zones = zone_count,
        "partitioning teams into zones"
    );

    let ratings: BTreeMap<TeamId, f64> = confirmed
        .iter()
        .filter_map(|t| t.id.map(|id| (id, t.pair_rating())))
        .collect();
    let ids: Vec<TeamId> = ratings.keys().copied().collect();

    let mut cliques = compatibility_cliques(&ids, points);

    // Rating-descending order inside each clique keeps the snake deal
    // spreading the strongest pairs across zones.
    for clique in &mut cliques {
        clique.sort_by(|a, b| {
            ratings[b]
                .partial_cmp(&ratings[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });
    }

    let mut zones: Vec<Vec<TeamId>> = vec![Vec::new(); zone_count];
    let mut dealer = SnakeDealer::new(zone_count);
    for clique in &cliques {
        for team in clique {
            dealer.deal(&mut zones, settings.zone_size_max, *team);
        }
    }

    Ok(zones
        .into_iter()
        .enumerate()
        .map(|(position, team_ids)| ZoneAssignment {
            label: zone_label(position),
            position,
            team_ids,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AvailabilitySpec, PlayerId, TimeOfDay};
    use crate::engine::availability::team_points;
    use crate::models::time::{enumerate_slots, DateRange, DayWindow, OperatingHours, SlotTime};
    use chrono::NaiveDate;

    fn settings() -> TournamentSettings {
        let dates = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
        )
        .unwrap();
        let window = DayWindow::new(TimeOfDay::from_hm(18, 0), TimeOfDay::from_hm(22, 0)).unwrap();
        TournamentSettings::new(dates, OperatingHours::new(window, window))
    }

    fn calendar(settings: &TournamentSettings) -> Vec<SlotTime> {
        enumerate_slots(&settings.dates, &settings.hours, settings.match_duration_min)
    }

    fn confirmed_team(id: i64, rating: f64) -> Team {
        let mut team = Team::new(
            PlayerId::new(id * 10),
            PlayerId::new(id * 10 + 1),
            rating,
            rating,
            AvailabilitySpec::Unrestricted,
        );
        team.id = Some(TeamId::new(id));
        team.state = crate::api::TeamState::Confirmed;
        team
    }

    #[test]
    fn test_resolve_zone_count_default() {
        let s = settings();
        assert_eq!(resolve_zone_count(8, None, &s).unwrap(), 3);
        assert_eq!(resolve_zone_count(6, None, &s).unwrap(), 2);
        assert_eq!(resolve_zone_count(2, None, &s).unwrap(), 1);
        assert_eq!(resolve_zone_count(3, None, &s).unwrap(), 1);
    }

    #[test]
    fn test_resolve_zone_count_too_few_teams() {
        let s = settings();
        assert!(matches!(
            resolve_zone_count(1, None, &s),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            resolve_zone_count(0, None, &s),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_resolve_zone_count_bad_hint() {
        let s = settings();
        // 8 teams in 2 zones would need zones of 4.
        assert!(resolve_zone_count(8, Some(2), &s).is_err());
        // 8 teams in 5 zones would leave zones below minimum size.
        assert!(resolve_zone_count(8, Some(5), &s).is_err());
        assert!(resolve_zone_count(8, Some(0), &s).is_err());
        // 3 or 4 zones both work for 8 teams.
        assert_eq!(resolve_zone_count(8, Some(3), &s).unwrap(), 3);
        assert_eq!(resolve_zone_count(8, Some(4), &s).unwrap(), 4);
    }

    #[test]
    fn test_zone_labels() {
        assert_eq!(zone_label(0), "Zone A");
        assert_eq!(zone_label(25), "Zone Z");
        assert_eq!(zone_label(26), "Zone 27");
    }

    #[test]
    fn test_eight_teams_make_zones_of_three_three_two() {
        let s = settings();
        let teams: Vec<Team> = (1..=8).map(|i| confirmed_team(i, 3.0 + i as f64 * 0.1)).collect();
        let points = team_points(&teams, &calendar(&s));

        let zones = build_zones(&teams, &points, None, &s).unwrap();
        let mut sizes: Vec<usize> = zones.iter().map(|z| z.team_ids.len()).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 3, 3]);

        // Every team appears exactly once.
        let mut all: Vec<TeamId> = zones.iter().flat_map(|z| z.team_ids.clone()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 8);
    }

    #[test]
    fn test_snake_distribution_balances_ratings() {
        let s = settings();
        // Ratings 1.0..=6.0; two zones. Snake deal: zone 0 gets 6.0, 3.0,
        // 2.0 and zone 1 gets 5.0, 4.0, 1.0; averages within 0.5.
        let teams: Vec<Team> = (1..=6).map(|i| confirmed_team(i, i as f64)).collect();
        let points = team_points(&teams, &calendar(&s));

        let zones = build_zones(&teams, &points, Some(2), &s).unwrap();
        assert_eq!(zones.len(), 2);

        let avg = |zone: &ZoneAssignment| -> f64 {
            let total: f64 = zone
                .team_ids
                .iter()
                .map(|id| id.value() as f64)
                .sum();
            total / zone.team_ids.len() as f64
        };
        assert!((avg(&zones[0]) - avg(&zones[1])).abs() <= 1.0);
    }

    #[test]
    fn test_unrestricted_teams_form_one_clique() {
        let teams: Vec<Team> = (1..=4).map(|i| confirmed_team(i, 4.0)).collect();
        let s = settings();
        let points = team_points(&teams, &calendar(&s));
        let ids: Vec<TeamId> = teams.iter().map(|t| t.id.unwrap()).collect();

        let cliques = compatibility_cliques(&ids, &points);
        assert_eq!(cliques.len(), 1);
        assert_eq!(cliques[0].len(), 4);
    }

    #[test]
    fn test_incompatible_team_gets_own_clique() {
        use crate::api::ForbiddenWindow;
        use chrono::Weekday;

        let s = settings();
        let mut teams: Vec<Team> = (1..=3).map(|i| confirmed_team(i, 4.0)).collect();
        // Team 4 forbids every operating tick on every day of week.
        let all_days = vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        let mut blocked = confirmed_team(4, 4.0);
        blocked.availability = AvailabilitySpec::Restricted(vec![ForbiddenWindow::new(
            all_days,
            TimeOfDay::from_hm(0, 0),
            TimeOfDay::from_hm(23, 59),
        )]);
        teams.push(blocked);

        let points = team_points(&teams, &calendar(&s));
        let ids: Vec<TeamId> = teams.iter().map(|t| t.id.unwrap()).collect();
        let cliques = compatibility_cliques(&ids, &points);

        assert_eq!(cliques.len(), 2);
        assert!(cliques.iter().any(|c| c == &vec![TeamId::new(4)]));
    }

    #[test]
    fn test_build_zones_ignores_unconfirmed_teams() {
        let s = settings();
        let mut teams: Vec<Team> = (1..=6).map(|i| confirmed_team(i, 4.0)).collect();
        teams[5].state = crate::api::TeamState::Withdrawn;
        let points = team_points(&teams, &calendar(&s));

        let zones = build_zones(&teams, &points, None, &s).unwrap();
        let total: usize = zones.iter().map(|z| z.team_ids.len()).sum();
        assert_eq!(total, 5);
        assert!(zones
            .iter()
            .all(|z| !z.team_ids.contains(&TeamId::new(6))));
    }

    #[test]
    fn test_build_zones_fails_below_minimum() {
        let s = settings();
        let teams = vec![confirmed_team(1, 4.0)];
        let points = team_points(&teams, &calendar(&s));
        assert!(build_zones(&teams, &points, None, &s).is_err());
    }

    #[test]
    fn test_build_zones_is_size_stable_across_runs() {
        let s = settings();
        let teams: Vec<Team> = (1..=8).map(|i| confirmed_team(i, 3.0 + i as f64 * 0.25)).collect();
        let points = team_points(&teams, &calendar(&s));

        let first = build_zones(&teams, &points, None, &s).unwrap();
        let second = build_zones(&teams, &points, None, &s).unwrap();

        let sizes = |zones: &[ZoneAssignment]| -> Vec<usize> {
            let mut v: Vec<usize> = zones.iter().map(|z| z.team_ids.len()).collect();
            v.sort_unstable();
            v
        };
        assert_eq!(sizes(&first), sizes(&second));
    }
}
