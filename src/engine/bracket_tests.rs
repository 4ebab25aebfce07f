//! Unit tests for bracket construction and advancement.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::api::{BracketNode, MatchState, TeamId, TournamentId};
use crate::engine::bracket::{
    advance_winner, bracket_size, build_bracket, seed_order, seeding_order, Advance,
    ClassifiedTeam,
};

fn ids(raw: &[i64]) -> Vec<TeamId> {
    raw.iter().map(|v| TeamId::new(*v)).collect()
}

fn node_at(nodes: &[BracketNode], round: u32, number: u32) -> &BracketNode {
    nodes
        .iter()
        .find(|n| n.round == round && n.number == number)
        .expect("node exists")
}

#[test]
fn test_bracket_size_rounds_up() {
    assert_eq!(bracket_size(2, 16).unwrap(), 2);
    assert_eq!(bracket_size(3, 16).unwrap(), 4);
    assert_eq!(bracket_size(5, 16).unwrap(), 8);
    assert_eq!(bracket_size(9, 16).unwrap(), 16);
}

#[test]
fn test_bracket_size_rejects_zero_and_oversize() {
    assert!(bracket_size(0, 16).is_err());
    assert!(bracket_size(17, 16).is_err());
}

#[test]
fn test_seeding_tables() {
    assert_eq!(seeding_order(2).unwrap(), vec![1, 2]);
    assert_eq!(seeding_order(4).unwrap(), vec![1, 4, 2, 3]);
    assert_eq!(seeding_order(8).unwrap(), vec![1, 8, 4, 5, 2, 7, 3, 6]);
    assert_eq!(
        seeding_order(16).unwrap(),
        vec![1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11]
    );
}

#[test]
fn test_seeding_order_mirror_construction() {
    // Size 32 comes from mirroring the 16 table; spot-check the first
    // pairs and the full pairing property: each adjacent pair sums to 33.
    let order = seeding_order(32).unwrap();
    assert_eq!(order.len(), 32);
    assert_eq!(&order[..4], &[1, 32, 16, 17]);
    for pair in order.chunks(2) {
        assert_eq!(pair[0] + pair[1], 33);
    }
}

#[test]
fn test_seeding_order_rejects_non_power_of_two() {
    assert!(seeding_order(6).is_err());
    assert!(seeding_order(1).is_err());
    assert!(seeding_order(0).is_err());
}

#[test]
fn test_seed_order_ranks_firsts_before_seconds() {
    let classified = vec![
        ClassifiedTeam {
            team_id: TeamId::new(1),
            zone_rank: 2,
            points: 6,
            rating: 5.0,
        },
        ClassifiedTeam {
            team_id: TeamId::new(2),
            zone_rank: 1,
            points: 3,
            rating: 3.0,
        },
        ClassifiedTeam {
            team_id: TeamId::new(3),
            zone_rank: 1,
            points: 6,
            rating: 4.0,
        },
    ];

    let mut rng = StdRng::seed_from_u64(7);
    let order = seed_order(classified, &mut rng);

    // Zone winners first (higher points ahead), runner-up last.
    assert_eq!(order, ids(&[3, 2, 1]));
}

#[test]
fn test_seed_order_shuffles_only_within_tie_classes() {
    let tied = |id: i64| ClassifiedTeam {
        team_id: TeamId::new(id),
        zone_rank: 1,
        points: 6,
        rating: 4.0,
    };
    let classified = vec![
        tied(1),
        tied(2),
        tied(3),
        ClassifiedTeam {
            team_id: TeamId::new(4),
            zone_rank: 2,
            points: 6,
            rating: 4.0,
        },
    ];

    let mut rng = StdRng::seed_from_u64(42);
    let order = seed_order(classified, &mut rng);

    // The three tied zone winners occupy the first three seeds in some
    // order; the runner-up is always last.
    let mut firsts = order[..3].to_vec();
    firsts.sort();
    assert_eq!(firsts, ids(&[1, 2, 3]));
    assert_eq!(order[3], TeamId::new(4));
}

#[test]
fn test_bracket_of_five_has_three_byes() {
    let seeds = ids(&[10, 20, 30, 40, 50]);
    let nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();

    // Tree of 8: 4 + 2 + 1 nodes.
    assert_eq!(nodes.len(), 7);

    let byes: Vec<&BracketNode> = nodes
        .iter()
        .filter(|n| n.state == MatchState::Bye)
        .collect();
    assert_eq!(byes.len(), 3);
    for bye in &byes {
        assert_eq!(bye.round, 1);
        assert_eq!(bye.winner, bye.home.or(bye.away));
    }

    // 4 first-round pairings minus 3 byes leaves one real match.
    let real: Vec<&BracketNode> = nodes
        .iter()
        .filter(|n| n.round == 1 && n.state == MatchState::Pending)
        .collect();
    assert_eq!(real.len(), 1);
}

#[test]
fn test_bye_winners_propagate_at_creation() {
    // 5 seeds in a tree of 8: seeds 1, 4, 2, 3 receive the byes per the
    // table [1,8,4,5,2,7,3,6] — seeds 6..8 are absent, so pairings
    // (1,8), (2,7), (3,6) resolve immediately.
    let seeds = ids(&[10, 20, 30, 40, 50]);
    let nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();

    // Match 1 (seed 1 vs seed 8) is a bye for seed 1 (team 10); its winner
    // is already waiting in round 2 match 1.
    assert_eq!(node_at(&nodes, 2, 1).home, Some(TeamId::new(10)));
    // Match 3 (seed 2 vs seed 7) byes team 20 into round 2 match 2.
    assert_eq!(node_at(&nodes, 2, 2).home, Some(TeamId::new(20)));
    // Match 4 (seed 3 vs seed 6) byes team 30 into round 2 match 2.
    assert_eq!(node_at(&nodes, 2, 2).away, Some(TeamId::new(30)));
    // The final waits on both semifinals.
    assert_eq!(node_at(&nodes, 3, 1).home, None);
    assert_eq!(node_at(&nodes, 3, 1).away, None);
}

#[test]
fn test_full_bracket_has_no_byes() {
    let seeds = ids(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();
    assert_eq!(nodes.len(), 7);
    assert!(nodes.iter().all(|n| n.state != MatchState::Bye));
}

#[test]
fn test_advance_winner_writes_correct_slot() {
    let seeds = ids(&[1, 2, 3, 4, 5, 6, 7, 8]);
    let mut nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();

    // Round 1 match 1 is seed 1 vs seed 8 (teams 1 and 8).
    let first = node_at(&nodes, 1, 1).clone();
    let winner = first.home.unwrap();
    let advanced = advance_winner(&mut nodes, 1, 1, winner).unwrap();

    match advanced {
        Advance::Next(next) => {
            assert_eq!(next.round, 2);
            assert_eq!(next.number, 1);
            // Odd source match fills the home slot.
            assert_eq!(next.home, Some(winner));
            assert_eq!(next.away, None);
        }
        other => panic!("expected Next, got {:?}", other),
    }

    // Even source match fills the away slot of the same target.
    let second = node_at(&nodes, 1, 2).clone();
    let winner2 = second.away.unwrap();
    match advance_winner(&mut nodes, 1, 2, winner2).unwrap() {
        Advance::Next(next) => {
            assert_eq!(next.number, 1);
            assert_eq!(next.away, Some(winner2));
        }
        other => panic!("expected Next, got {:?}", other),
    }
}

#[test]
fn test_advance_winner_on_final_returns_final() {
    let seeds = ids(&[1, 2]);
    let mut nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();
    assert_eq!(nodes.len(), 1);

    let result = advance_winner(&mut nodes, 1, 1, TeamId::new(2)).unwrap();
    assert_eq!(result, Advance::Final);
    assert_eq!(nodes[0].winner, Some(TeamId::new(2)));
    assert_eq!(nodes[0].state, MatchState::Confirmed);
}

#[test]
fn test_advance_winner_on_bye_is_noop() {
    let seeds = ids(&[10, 20, 30]);
    let mut nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();

    // Tree of 4 with one bye (seed 1, team 10) at match 1.
    let bye_number = nodes
        .iter()
        .find(|n| n.state == MatchState::Bye)
        .map(|n| n.number)
        .unwrap();
    let before = nodes.clone();

    let result = advance_winner(&mut nodes, 1, bye_number, TeamId::new(10)).unwrap();
    assert!(matches!(result, Advance::AlreadyResolved(_)));
    assert_eq!(nodes, before);
}

#[test]
fn test_advance_winner_rejects_non_participant() {
    let seeds = ids(&[1, 2, 3, 4]);
    let mut nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();
    assert!(advance_winner(&mut nodes, 1, 1, TeamId::new(99)).is_err());
}

#[test]
fn test_advance_winner_rejects_double_confirmation() {
    let seeds = ids(&[1, 2, 3, 4]);
    let mut nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();
    let winner = node_at(&nodes, 1, 1).home.unwrap();

    advance_winner(&mut nodes, 1, 1, winner).unwrap();
    assert!(advance_winner(&mut nodes, 1, 1, winner).is_err());
}

#[test]
fn test_advance_winner_unknown_node() {
    let seeds = ids(&[1, 2]);
    let mut nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();
    assert!(advance_winner(&mut nodes, 3, 1, TeamId::new(1)).is_err());
}

#[test]
fn test_bracket_runs_to_completion() {
    // Play a 5-team bracket to the end, always advancing the home side
    // (or the only filled side).
    let seeds = ids(&[10, 20, 30, 40, 50]);
    let mut nodes = build_bracket(TournamentId::new(1), &seeds, 16).unwrap();

    loop {
        let playable: Option<(u32, u32, TeamId)> = nodes
            .iter()
            .find(|n| {
                n.state == MatchState::Pending && n.home.is_some() && n.away.is_some()
            })
            .map(|n| (n.round, n.number, n.home.unwrap()));

        match playable {
            Some((round, number, winner)) => {
                let _ = advance_winner(&mut nodes, round, number, winner).unwrap();
            }
            None => break,
        }
    }

    let final_node = nodes.iter().max_by_key(|n| n.round).unwrap();
    assert!(final_node.is_resolved());
}
