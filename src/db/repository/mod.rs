//! Repository trait for abstracting persistence operations.
//!
//! This trait defines the interface for all persistence operations the
//! engine needs, allowing different implementations (in-memory, relational
//! store) to be swapped via dependency injection.

use async_trait::async_trait;

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use crate::api::{
    BracketNode, Court, CourtId, Match, MatchId, Team, TeamId, Tournament, TournamentId, Zone,
    ZoneAssignment, ZoneId,
};

/// Repository trait for tournament persistence.
///
/// All records are keyed by tournament id. The `replace_*` operations are
/// atomic: regenerating zones, a fixture or a bracket discards the previous
/// set in the same operation, so readers never observe a mixed state.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across threads.
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    // ==================== Health & Tournaments ====================

    /// Check if the storage backend is healthy.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Store a new tournament, returning its assigned id.
    async fn store_tournament(&self, tournament: &Tournament) -> RepositoryResult<TournamentId>;

    /// Retrieve a tournament by id.
    async fn get_tournament(&self, id: TournamentId) -> RepositoryResult<Tournament>;

    /// Persist changes to an existing tournament (phase, checksum, settings).
    async fn update_tournament(&self, tournament: &Tournament) -> RepositoryResult<()>;

    // ==================== Teams & Courts ====================

    /// Store a team under a tournament, returning its assigned id.
    async fn store_team(&self, tournament_id: TournamentId, team: &Team)
        -> RepositoryResult<TeamId>;

    /// All teams registered for a tournament, in registration order.
    async fn list_teams(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<Team>>;

    /// Update a team's lifecycle state.
    async fn update_team(&self, tournament_id: TournamentId, team: &Team) -> RepositoryResult<()>;

    /// Store a court under a tournament, returning its assigned id.
    async fn store_court(
        &self,
        tournament_id: TournamentId,
        court: &Court,
    ) -> RepositoryResult<CourtId>;

    /// All courts of a tournament, active and inactive.
    async fn list_courts(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<Court>>;

    // ==================== Zones ====================

    /// Replace all zones of a tournament atomically.
    ///
    /// Any existing zones AND their group matches are discarded in the same
    /// operation; the returned zones carry their assigned ids.
    async fn replace_zones(
        &self,
        tournament_id: TournamentId,
        assignments: Vec<ZoneAssignment>,
    ) -> RepositoryResult<Vec<Zone>>;

    /// All zones of a tournament, in position order.
    async fn list_zones(&self, tournament_id: TournamentId) -> RepositoryResult<Vec<Zone>>;

    /// Retrieve a single zone by id.
    async fn get_zone(&self, zone_id: ZoneId) -> RepositoryResult<Zone>;

    // ==================== Group Matches ====================

    /// Replace all group matches of a tournament atomically. The returned
    /// matches carry their assigned ids.
    async fn replace_group_matches(
        &self,
        tournament_id: TournamentId,
        matches: Vec<Match>,
    ) -> RepositoryResult<Vec<Match>>;

    /// All group matches of a tournament.
    async fn list_group_matches(&self, tournament_id: TournamentId)
        -> RepositoryResult<Vec<Match>>;

    /// Group matches belonging to one zone.
    async fn matches_for_zone(&self, zone_id: ZoneId) -> RepositoryResult<Vec<Match>>;

    /// Retrieve a single group match by id.
    async fn get_match(&self, match_id: MatchId) -> RepositoryResult<Match>;

    /// Persist changes to an existing group match (state, score, winner).
    async fn update_match(&self, m: &Match) -> RepositoryResult<()>;

    // ==================== Bracket ====================

    /// Replace the whole elimination bracket of a tournament atomically.
    /// The returned nodes carry their assigned ids.
    async fn replace_bracket(
        &self,
        tournament_id: TournamentId,
        nodes: Vec<BracketNode>,
    ) -> RepositoryResult<Vec<BracketNode>>;

    /// All bracket nodes of a tournament, in (round, number) order.
    async fn bracket_nodes(&self, tournament_id: TournamentId)
        -> RepositoryResult<Vec<BracketNode>>;

    /// Retrieve a single bracket node by match id.
    async fn get_bracket_node(&self, match_id: MatchId) -> RepositoryResult<BracketNode>;

    /// Persist changes to existing bracket nodes (winners, states).
    async fn update_bracket_nodes(&self, nodes: &[BracketNode]) -> RepositoryResult<()>;
}
