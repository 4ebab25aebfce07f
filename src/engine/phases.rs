//! Phase gating for scheduling operations.
//!
//! Every operation checks the tournament's lifecycle phase before touching
//! anything and refuses to run out of order; a bracket generated before the
//! group stage is complete is rejected, not silently partial.

use crate::api::{Match, Phase, Tournament};
use crate::engine::error::{EngineError, EngineResult};

/// Require the tournament to be in `required` phase for `operation`.
pub fn ensure_phase(tournament: &Tournament, required: Phase, operation: &str) -> EngineResult<()> {
    if tournament.phase == required {
        Ok(())
    } else {
        Err(EngineError::validation(format!(
            "Cannot {} while tournament '{}' is in phase {}; requires {}",
            operation, tournament.name, tournament.phase, required
        )))
    }
}

/// Require the tournament to be in any of `allowed` phases.
pub fn ensure_phase_in(
    tournament: &Tournament,
    allowed: &[Phase],
    operation: &str,
) -> EngineResult<()> {
    if allowed.contains(&tournament.phase) {
        Ok(())
    } else {
        Err(EngineError::validation(format!(
            "Cannot {} while tournament '{}' is in phase {}",
            operation, tournament.name, tournament.phase
        )))
    }
}

/// Whether every group-stage match has reached a terminal state.
/// Cancelled matches are not waited on.
pub fn group_stage_complete(matches: &[Match]) -> bool {
    matches.iter().all(|m| !m.is_open())
}

/// Apply a phase transition, validating it against the transition table.
pub fn transition(tournament: &mut Tournament, target: Phase) -> EngineResult<()> {
    if !tournament.phase.can_transition_to(target) {
        return Err(EngineError::validation(format!(
            "Illegal phase transition {} -> {} for tournament '{}'",
            tournament.phase, target, tournament.name
        )));
    }
    tournament.phase = target;
    Ok(())
}
