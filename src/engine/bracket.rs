//! Single-elimination bracket construction and winner advancement.
//!
//! The tree is sized to the next power of two above the classified-team
//! count (capped by configuration). Missing leaves become explicit byes
//! whose winner is the lone real team, resolved the moment the node is
//! created and propagated into the next round immediately so operators
//! never see an avoidable walkover state.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::api::{BracketNode, MatchState, TeamId, TournamentId};
use crate::engine::error::{EngineError, EngineResult};

/// Standard first-round seeding orders: the k-th entry is the seed number
/// (1-based) placed at bracket position k. Adjacent positions pair off.
const SEEDING_TABLE_2: [usize; 2] = [1, 2];
const SEEDING_TABLE_4: [usize; 4] = [1, 4, 2, 3];
const SEEDING_TABLE_8: [usize; 8] = [1, 8, 4, 5, 2, 7, 3, 6];
const SEEDING_TABLE_16: [usize; 16] = [1, 16, 8, 9, 4, 13, 5, 12, 2, 15, 7, 10, 3, 14, 6, 11];

/// A team entering the bracket, with its classification keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTeam {
    pub team_id: TeamId,
    /// 1 for zone winners, 2 for runners-up, and so on.
    pub zone_rank: usize,
    /// Zone standings points, the first ordering key within a rank class.
    pub points: u32,
    /// Pair rating, the second ordering key.
    pub rating: f64,
}

/// Bracket tree size for `count` classified teams: the next power of two,
/// validated against the configured maximum.
pub fn bracket_size(count: usize, max_size: usize) -> EngineResult<usize> {
    if count == 0 {
        return Err(EngineError::validation(
            "Cannot build a bracket from zero classified teams",
        ));
    }
    let size = count.next_power_of_two();
    if size > max_size {
        return Err(EngineError::validation(format!(
            "Bracket of {} teams needs a tree of {}, over the configured maximum {}",
            count, size, max_size
        )));
    }
    Ok(size)
}

/// First-round seeding order for a tree of `size` leaves.
///
/// Sizes 2/4/8/16 come from the standard lookup tables; larger sizes are
/// derived by the mirror construction (each seed s of the half-size table
/// expands to the pair (s, size + 1 - s)). `size` must be a power of two.
pub fn seeding_order(size: usize) -> EngineResult<Vec<usize>> {
    if !size.is_power_of_two() || size < 2 {
        return Err(EngineError::configuration(format!(
            "No seeding order for bracket size {}",
            size
        )));
    }
    Ok(match size {
        2 => SEEDING_TABLE_2.to_vec(),
        4 => SEEDING_TABLE_4.to_vec(),
        8 => SEEDING_TABLE_8.to_vec(),
        16 => SEEDING_TABLE_16.to_vec(),
        _ => {
            let half = seeding_order(size / 2)?;
            half.into_iter()
                .flat_map(|s| [s, size + 1 - s])
                .collect()
        }
    })
}

/// Order classified teams into seed positions 1..count.
///
/// All rank-1 teams come before all rank-2 teams; inside a rank class the
/// order is points descending then rating descending, and teams whose keys
/// tie exactly are shuffled within their tie class so the bracket does not
/// inherit a deterministic zone-order bias.
pub fn seed_order<R: Rng>(mut classified: Vec<ClassifiedTeam>, rng: &mut R) -> Vec<TeamId> {
    classified.sort_by(|a, b| {
        a.zone_rank
            .cmp(&b.zone_rank)
            .then(b.points.cmp(&a.points))
            .then(
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    // Shuffle runs of identical (rank, points, rating) in place.
    let mut start = 0;
    while start < classified.len() {
        let mut end = start + 1;
        while end < classified.len() && tie_key(&classified[end]) == tie_key(&classified[start]) {
            end += 1;
        }
        classified[start..end].shuffle(rng);
        start = end;
    }

    classified.into_iter().map(|c| c.team_id).collect()
}

fn tie_key(team: &ClassifiedTeam) -> (usize, u32, u64) {
    (team.zone_rank, team.points, team.rating.to_bits())
}

/// Build the full elimination tree for the seeded teams.
///
/// Round 1 holds `size / 2` nodes paired from the seeding order; every
/// later round is pre-created with empty inputs, then bye winners are
/// propagated forward immediately.
pub fn build_bracket(
    tournament_id: TournamentId,
    seeds: &[TeamId],
    max_size: usize,
) -> EngineResult<Vec<BracketNode>> {
    let size = bracket_size(seeds.len(), max_size)?;
    let order = seeding_order(size)?;
    let rounds = size.trailing_zeros();

    let mut nodes: Vec<BracketNode> = Vec::new();

    // First round: seed numbers above the real team count are byes.
    for (index, pair) in order.chunks(2).enumerate() {
        let number = index as u32 + 1;
        let home = seeds.get(pair[0] - 1).copied();
        let away = seeds.get(pair[1] - 1).copied();
        let node = match (home, away) {
            (Some(h), Some(a)) => {
                let mut n = BracketNode::pending(tournament_id, 1, number);
                n.home = Some(h);
                n.away = Some(a);
                n
            }
            (Some(team), None) | (None, Some(team)) => {
                BracketNode::bye(tournament_id, 1, number, team)
            }
            (None, None) => {
                // Byes never exceed half the tree; two empty slots mean the
                // seeding order itself is wrong.
                return Err(EngineError::configuration(format!(
                    "Bracket pairing {} of size {} has two empty slots",
                    number, size
                )));
            }
        };
        nodes.push(node);
    }

    // Later rounds, inputs filled in as earlier results arrive.
    for round in 2..=rounds {
        let matches_in_round = (size >> round) as u32;
        for number in 1..=matches_in_round {
            nodes.push(BracketNode::pending(tournament_id, round, number));
        }
    }

    // Propagate first-round byes so no node waits on a walkover.
    let byes: Vec<(u32, TeamId)> = nodes
        .iter()
        .filter(|n| n.round == 1 && n.state == MatchState::Bye)
        .filter_map(|n| n.winner.map(|w| (n.number, w)))
        .collect();
    for (number, winner) in byes {
        write_into_next_round(&mut nodes, 1, number, winner);
    }

    Ok(nodes)
}

/// Write `winner` of match `number` in `round` into its slot in the next
/// round: match `ceil(number / 2)`, home slot for odd sources, away for
/// even. Returns the index of the updated node, if the source was not the
/// final.
fn write_into_next_round(
    nodes: &mut [BracketNode],
    round: u32,
    number: u32,
    winner: TeamId,
) -> Option<usize> {
    let next_round = round + 1;
    let next_number = number.div_ceil(2);
    let index = nodes
        .iter()
        .position(|n| n.round == next_round && n.number == next_number)?;
    if number % 2 == 1 {
        nodes[index].home = Some(winner);
    } else {
        nodes[index].away = Some(winner);
    }
    Some(index)
}

/// Outcome of advancing a winner out of a bracket node.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The winner was written into this next-round node.
    Next(BracketNode),
    /// The confirmed node was the final; the tournament is decided.
    Final,
    /// The node was a bye: already resolved at creation, nothing to do.
    AlreadyResolved(BracketNode),
}

/// Record `winner` for the node at (`round`, `number`) and propagate.
///
/// Confirming a bye is a no-op (its winner was resolved at creation).
/// Confirming the final yields [`Advance::Final`]; callers flip the
/// tournament phase.
pub fn advance_winner(
    nodes: &mut [BracketNode],
    round: u32,
    number: u32,
    winner: TeamId,
) -> EngineResult<Advance> {
    let index = nodes
        .iter()
        .position(|n| n.round == round && n.number == number)
        .ok_or_else(|| {
            EngineError::not_found(format!("Bracket node {}/{} does not exist", round, number))
        })?;

    if nodes[index].state == MatchState::Bye {
        return Ok(Advance::AlreadyResolved(nodes[index].clone()));
    }
    if nodes[index].state == MatchState::Confirmed {
        return Err(EngineError::validation(format!(
            "Bracket node {}/{} already has a confirmed winner",
            round, number
        )));
    }
    let is_input = nodes[index].home == Some(winner) || nodes[index].away == Some(winner);
    if !is_input {
        return Err(EngineError::validation(format!(
            "Team {} is not an input of bracket node {}/{}",
            winner, round, number
        )));
    }

    nodes[index].winner = Some(winner);
    nodes[index].state = MatchState::Confirmed;

    match write_into_next_round(nodes, round, number, winner) {
        Some(next_index) => Ok(Advance::Next(nodes[next_index].clone())),
        None => Ok(Advance::Final),
    }
}

#[cfg(test)]
#[path = "bracket_tests.rs"]
mod bracket_tests;
