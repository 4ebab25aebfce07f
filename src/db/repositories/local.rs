//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the repository trait
//! suitable for unit testing, local development and single-node
//! deployments. All data is stored in memory using HashMap and Vec
//! structures, providing fast, deterministic, and isolated execution.
//!
//! Every `replace_*` operation runs under a single write lock, so the
//! atomic-swap guarantee of the trait holds trivially.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::api::{
    BracketNode, Court, CourtId, Match, MatchId, Team, TeamId, Tournament, TournamentId, Zone,
    ZoneAssignment, ZoneId,
};
use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, TournamentRepository,
};

/// In-memory local repository.
///
/// Cloning is cheap and shares the underlying store.
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    tournaments: HashMap<TournamentId, Tournament>,
    teams: HashMap<TournamentId, Vec<Team>>,
    courts: HashMap<TournamentId, Vec<Court>>,
    zones: HashMap<TournamentId, Vec<Zone>>,
    matches: HashMap<TournamentId, Vec<Match>>,
    brackets: HashMap<TournamentId, Vec<BracketNode>>,

    // ID counters
    next_tournament_id: i64,
    next_team_id: i64,
    next_court_id: i64,
    next_zone_id: i64,
    next_match_id: i64,

    // Connection health, settable for testing failure paths
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            tournaments: HashMap::new(),
            teams: HashMap::new(),
            courts: HashMap::new(),
            zones: HashMap::new(),
            matches: HashMap::new(),
            brackets: HashMap::new(),
            next_tournament_id: 1,
            next_team_id: 1,
            next_court_id: 1,
            next_zone_id: 1,
            next_match_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    /// Number of tournaments stored.
    pub fn tournament_count(&self) -> usize {
        self.data.read().unwrap().tournaments.len()
    }

    fn check_health(data: &LocalData) -> RepositoryResult<()> {
        if !data.is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }

    fn require_tournament(
        data: &LocalData,
        id: TournamentId,
        operation: &str,
    ) -> RepositoryResult<()> {
        if data.tournaments.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::not_found_with_context(
                format!("Tournament {} does not exist", id),
                ErrorContext::new(operation)
                    .with_entity("tournament")
                    .with_entity_id(id),
            ))
        }
    }
}

#[async_trait]
impl TournamentRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().unwrap().is_healthy)
    }

    async fn store_tournament(&self, tournament: &Tournament) -> RepositoryResult<TournamentId> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;

        let id = TournamentId::new(data.next_tournament_id);
        data.next_tournament_id += 1;

        let mut stored = tournament.clone();
        stored.id = Some(id);
        data.tournaments.insert(id, stored);
        Ok(id)
    }

    async fn get_tournament(&self, id: TournamentId) -> RepositoryResult<Tournament> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        data.tournaments.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Tournament {} does not exist", id),
                ErrorContext::new("get_tournament")
                    .with_entity("tournament")
                    .with_entity_id(id),
            )
        })
    }

    async fn update_tournament(&self, tournament: &Tournament) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;

        let id = tournament.id.ok_or_else(|| {
            RepositoryError::validation("Cannot update a tournament without an id")
        })?;
        Self::require_tournament(&data, id, "update_tournament")?;
        data.tournaments.insert(id, tournament.clone());
        Ok(())
    }

    async fn store_team(
        &self,
        tournament_id: TournamentId,
        team: &Team,
    ) -> RepositoryResult<TeamId> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "store_team")?;

        let id = TeamId::new(data.next_team_id);
        data.next_team_id += 1;

        let mut stored = team.clone();
        stored.id = Some(id);
        data.teams.entry(tournament_id).or_default().push(stored);
        Ok(id)
    }

    async fn list_teams(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<Team>> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "list_teams")?;
        Ok(data.teams.get(&tournament_id).cloned().unwrap_or_default())
    }

    async fn update_team(
        &self,
        tournament_id: TournamentId,
        team: &Team,
    ) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;

        let id = team
            .id
            .ok_or_else(|| RepositoryError::validation("Cannot update a team without an id"))?;
        let teams = data.teams.entry(tournament_id).or_default();
        match teams.iter_mut().find(|t| t.id == Some(id)) {
            Some(slot) => {
                *slot = team.clone();
                Ok(())
            }
            None => Err(RepositoryError::not_found(format!(
                "Team {} does not exist in tournament {}",
                id, tournament_id
            ))),
        }
    }

    async fn store_court(
        &self,
        tournament_id: TournamentId,
        court: &Court,
    ) -> RepositoryResult<CourtId> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "store_court")?;

        let id = CourtId::new(data.next_court_id);
        data.next_court_id += 1;

        let mut stored = court.clone();
        stored.id = Some(id);
        data.courts.entry(tournament_id).or_default().push(stored);
        Ok(id)
    }

    async fn list_courts(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<Court>> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "list_courts")?;
        Ok(data.courts.get(&tournament_id).cloned().unwrap_or_default())
    }

    async fn replace_zones(
        &self,
        tournament_id: TournamentId,
        assignments: Vec<ZoneAssignment>,
    ) -> RepositoryResult<Vec<Zone>> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "replace_zones")?;

        let mut zones = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let id = ZoneId::new(data.next_zone_id);
            data.next_zone_id += 1;
            zones.push(Zone {
                id,
                tournament_id,
                label: assignment.label,
                position: assignment.position,
                team_ids: assignment.team_ids,
            });
        }

        // Zones and their dependent matches swap together.
        data.zones.insert(tournament_id, zones.clone());
        data.matches.insert(tournament_id, Vec::new());
        Ok(zones)
    }

    async fn list_zones(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<Zone>> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "list_zones")?;

        let mut zones = data.zones.get(&tournament_id).cloned().unwrap_or_default();
        zones.sort_by_key(|z| z.position);
        Ok(zones)
    }

    async fn get_zone(&self, zone_id: ZoneId) -> RepositoryResult<Zone> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        data.zones
            .values()
            .flatten()
            .find(|z| z.id == zone_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Zone {} does not exist", zone_id),
                    ErrorContext::new("get_zone")
                        .with_entity("zone")
                        .with_entity_id(zone_id),
                )
            })
    }

    async fn replace_group_matches(
        &self,
        tournament_id: TournamentId,
        matches: Vec<Match>,
    ) -> RepositoryResult<Vec<Match>> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "replace_group_matches")?;

        let mut stored = Vec::with_capacity(matches.len());
        for mut m in matches {
            m.id = Some(MatchId::new(data.next_match_id));
            data.next_match_id += 1;
            stored.push(m);
        }
        data.matches.insert(tournament_id, stored.clone());
        Ok(stored)
    }

    async fn list_group_matches(
        &self,
        tournament_id: TournamentId,
    ) -> RepositoryResult<Vec<Match>> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "list_group_matches")?;
        Ok(data.matches.get(&tournament_id).cloned().unwrap_or_default())
    }

    async fn matches_for_zone(&self, zone_id: ZoneId) -> RepositoryResult<Vec<Match>> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        Ok(data
            .matches
            .values()
            .flatten()
            .filter(|m| m.zone_id == zone_id)
            .cloned()
            .collect())
    }

    async fn get_match(&self, match_id: MatchId) -> RepositoryResult<Match> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        data.matches
            .values()
            .flatten()
            .find(|m| m.id == Some(match_id))
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Match {} does not exist", match_id),
                    ErrorContext::new("get_match")
                        .with_entity("match")
                        .with_entity_id(match_id),
                )
            })
    }

    async fn update_match(&self, m: &Match) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;

        let id = m
            .id
            .ok_or_else(|| RepositoryError::validation("Cannot update a match without an id"))?;
        for matches in data.matches.values_mut() {
            if let Some(slot) = matches.iter_mut().find(|existing| existing.id == Some(id)) {
                *slot = m.clone();
                return Ok(());
            }
        }
        Err(RepositoryError::not_found(format!(
            "Match {} does not exist",
            id
        )))
    }

    async fn replace_bracket(
        &self,
        tournament_id: TournamentId,
        nodes: Vec<BracketNode>,
    ) -> RepositoryResult<Vec<BracketNode>> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "replace_bracket")?;

        let mut stored = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            node.id = Some(MatchId::new(data.next_match_id));
            data.next_match_id += 1;
            stored.push(node);
        }
        data.brackets.insert(tournament_id, stored.clone());
        Ok(stored)
    }

    async fn bracket_nodes(
        &self,
        tournament_id: TournamentId,
    ) -> RepositoryResult<Vec<BracketNode>> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        Self::require_tournament(&data, tournament_id, "bracket_nodes")?;

        let mut nodes = data.brackets.get(&tournament_id).cloned().unwrap_or_default();
        nodes.sort_by_key(|n| (n.round, n.number));
        Ok(nodes)
    }

    async fn get_bracket_node(&self, match_id: MatchId) -> RepositoryResult<BracketNode> {
        let data = self.data.read().unwrap();
        Self::check_health(&data)?;
        data.brackets
            .values()
            .flatten()
            .find(|n| n.id == Some(match_id))
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Bracket node {} does not exist", match_id),
                    ErrorContext::new("get_bracket_node")
                        .with_entity("bracket_node")
                        .with_entity_id(match_id),
                )
            })
    }

    async fn update_bracket_nodes(&self, nodes: &[BracketNode]) -> RepositoryResult<()> {
        let mut data = self.data.write().unwrap();
        Self::check_health(&data)?;

        for node in nodes {
            let id = node.id.ok_or_else(|| {
                RepositoryError::validation("Cannot update a bracket node without an id")
            })?;
            let mut updated = false;
            for bracket in data.brackets.values_mut() {
                if let Some(slot) = bracket.iter_mut().find(|n| n.id == Some(id)) {
                    *slot = node.clone();
                    updated = true;
                    break;
                }
            }
            if !updated {
                return Err(RepositoryError::not_found(format!(
                    "Bracket node {} does not exist",
                    id
                )));
            }
        }
        Ok(())
    }
}
