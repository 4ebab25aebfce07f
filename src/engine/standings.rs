//! Standings computation.
//!
//! Derives a ranked table per zone from confirmed match results. 3 points
//! per win, 0 per loss; the ranking key is (points desc, set differential
//! desc, game differential desc). Ties beyond those keys keep zone input
//! order — the sort is stable, and the residual ambiguity is documented
//! behavior rather than something to resolve with an invented rule.

use std::cmp::Reverse;

use crate::api::{Match, MatchState, StandingsRow, TeamId, Zone};

const POINTS_PER_WIN: u32 = 3;

/// Compute the ranked standings table for one zone.
///
/// Only `Confirmed` matches contribute. Every member team gets a row, in
/// particular teams with zero confirmed matches appear with all-zero
/// stats rather than being omitted.
pub fn compute_standings(zone: &Zone, matches: &[Match]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = zone
        .team_ids
        .iter()
        .map(|id| StandingsRow::empty(*id))
        .collect();

    for m in matches {
        if m.zone_id != zone.id || m.state != MatchState::Confirmed {
            continue;
        }
        let Some(winner) = m.winner else {
            continue;
        };
        apply_match(&mut rows, m, winner);
    }

    // Stable sort: residual ties stay in zone input order.
    rows.sort_by_key(|row| (Reverse(row.points), Reverse(row.set_diff()), Reverse(row.game_diff())));
    rows
}

fn apply_match(rows: &mut [StandingsRow], m: &Match, winner: TeamId) {
    let mut home_sets = 0u32;
    let mut away_sets = 0u32;
    let mut home_games = 0u32;
    let mut away_games = 0u32;
    for set in &m.score {
        if set.home > set.away {
            home_sets += 1;
        } else if set.away > set.home {
            away_sets += 1;
        }
        home_games += set.home as u32;
        away_games += set.away as u32;
    }

    for row in rows.iter_mut() {
        let (sets_for, sets_against, games_for, games_against) = if row.team_id == m.home {
            (home_sets, away_sets, home_games, away_games)
        } else if row.team_id == m.away {
            (away_sets, home_sets, away_games, home_games)
        } else {
            continue;
        };

        row.played += 1;
        row.sets_for += sets_for;
        row.sets_against += sets_against;
        row.games_for += games_for;
        row.games_against += games_against;
        if row.team_id == winner {
            row.won += 1;
            row.points += POINTS_PER_WIN;
        } else {
            row.lost += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{SetScore, TournamentId, ZoneId};

    fn zone(team_ids: Vec<i64>) -> Zone {
        Zone {
            id: ZoneId::new(1),
            tournament_id: TournamentId::new(1),
            label: "Zone A".to_string(),
            position: 0,
            team_ids: team_ids.into_iter().map(TeamId::new).collect(),
        }
    }

    fn confirmed(home: i64, away: i64, winner: i64, score: Vec<(u8, u8)>) -> Match {
        let mut m = Match::pending(
            TournamentId::new(1),
            ZoneId::new(1),
            TeamId::new(home),
            TeamId::new(away),
        );
        m.state = MatchState::Confirmed;
        m.winner = Some(TeamId::new(winner));
        m.score = score.into_iter().map(|(h, a)| SetScore::new(h, a)).collect();
        m
    }

    #[test]
    fn test_win_earns_three_points() {
        let zone = zone(vec![1, 2]);
        let matches = vec![confirmed(1, 2, 1, vec![(6, 3), (6, 4)])];

        let rows = compute_standings(&zone, &matches);
        assert_eq!(rows[0].team_id, TeamId::new(1));
        assert_eq!(rows[0].points, 3);
        assert_eq!(rows[0].won, 1);
        assert_eq!(rows[0].sets_for, 2);
        assert_eq!(rows[0].games_for, 12);
        assert_eq!(rows[1].points, 0);
        assert_eq!(rows[1].lost, 1);
    }

    #[test]
    fn test_unconfirmed_matches_do_not_count() {
        let zone = zone(vec![1, 2]);
        let mut m = confirmed(1, 2, 1, vec![(6, 0), (6, 0)]);
        m.state = MatchState::Scheduled;

        let rows = compute_standings(&zone, &[m]);
        assert!(rows.iter().all(|r| r.played == 0 && r.points == 0));
    }

    #[test]
    fn test_team_without_matches_gets_zero_row() {
        let zone = zone(vec![1, 2, 3]);
        let matches = vec![confirmed(1, 2, 1, vec![(6, 3), (6, 4)])];

        let rows = compute_standings(&zone, &matches);
        assert_eq!(rows.len(), 3);
        let idle = rows.iter().find(|r| r.team_id == TeamId::new(3)).unwrap();
        assert_eq!(idle.played, 0);
        assert_eq!(idle.points, 0);
    }

    #[test]
    fn test_set_differential_breaks_point_ties() {
        let zone = zone(vec![1, 2, 3]);
        // Everyone beats someone: 1 > 2 in straight sets, 2 > 3 in three
        // sets, 3 > 1 in three sets. All on 3 points; set diffs decide.
        let matches = vec![
            confirmed(1, 2, 1, vec![(6, 0), (6, 0)]),
            confirmed(2, 3, 2, vec![(6, 4), (3, 6), (6, 4)]),
            confirmed(3, 1, 3, vec![(6, 4), (4, 6), (6, 4)]),
        ];

        let rows = compute_standings(&zone, &matches);
        // Set totals: team 1 is 3-2 (+1), team 3 is 3-3 (0), team 2 is
        // 2-3 (-1). Order: 1, 3, 2.
        assert_eq!(rows[0].team_id, TeamId::new(1));
        assert_eq!(rows[1].team_id, TeamId::new(3));
        assert_eq!(rows[2].team_id, TeamId::new(2));
        assert!(rows.iter().all(|r| r.points == 3));
    }

    #[test]
    fn test_game_differential_breaks_set_ties() {
        let zone = zone(vec![1, 2, 3, 4]);
        let matches = vec![
            // Both winners take it 2-0; team 1 wins 12-0 on games, team 3
            // only 12-8.
            confirmed(1, 2, 1, vec![(6, 0), (6, 0)]),
            confirmed(3, 4, 3, vec![(6, 4), (6, 4)]),
        ];

        let rows = compute_standings(&zone, &matches);
        assert_eq!(rows[0].team_id, TeamId::new(1));
        assert_eq!(rows[1].team_id, TeamId::new(3));
    }

    #[test]
    fn test_full_tie_preserves_input_order() {
        let zone = zone(vec![2, 1]);
        let rows = compute_standings(&zone, &[]);

        // Identical all-zero rows: stable sort keeps zone input order.
        assert_eq!(rows[0].team_id, TeamId::new(2));
        assert_eq!(rows[1].team_id, TeamId::new(1));
    }

    #[test]
    fn test_matches_from_other_zones_ignored() {
        let zone_a = zone(vec![1, 2]);
        let mut foreign = confirmed(1, 2, 1, vec![(6, 0), (6, 0)]);
        foreign.zone_id = ZoneId::new(99);

        let rows = compute_standings(&zone_a, &[foreign]);
        assert!(rows.iter().all(|r| r.played == 0));
    }
}
