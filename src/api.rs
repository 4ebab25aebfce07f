//! Public API surface for the scheduling engine.
//!
//! This file consolidates the identifier newtypes used across the crate and
//! re-exports the domain types that make up the engine's inputs and outputs.
//! All types derive Serialize/Deserialize for JSON serialization.

use crate::define_id_type;

define_id_type!(i64, TournamentId);
define_id_type!(i64, TeamId);
define_id_type!(i64, PlayerId);
define_id_type!(i64, ZoneId);
define_id_type!(i64, CourtId);
define_id_type!(i64, MatchId);

pub use crate::models::fixture::{
    BracketNode, FailureReason, FixtureOutcome, Match, MatchSlot, MatchState, SchedulingFailure,
    SetScore, StandingsRow, Zone, ZoneAssignment,
};
pub use crate::models::team::{AvailabilitySpec, ForbiddenWindow, Team, TeamState};
pub use crate::models::time::{DateRange, DayWindow, OperatingHours, SlotTime, TimeOfDay};
pub use crate::models::tournament::{Court, Phase, Tournament, TournamentSettings};
