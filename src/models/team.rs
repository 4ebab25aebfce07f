//! Team and availability types.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::api::{PlayerId, TeamId};
use crate::models::time::TimeOfDay;

/// Lifecycle state of a registered team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamState {
    Registered,
    Confirmed,
    Withdrawn,
}

/// A recurring window in which a team cannot play.
///
/// The window applies on every listed day of week, from `start` (inclusive)
/// to `end` (exclusive), within the tournament's operating hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenWindow {
    pub days: Vec<Weekday>,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl ForbiddenWindow {
    pub fn new(days: Vec<Weekday>, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { days, start, end }
    }

    /// Whether a slot starting at `time` on `weekday` falls inside this
    /// window. A slot is forbidden when its start lies in [start, end).
    pub fn blocks(&self, weekday: Weekday, time: TimeOfDay) -> bool {
        self.days.contains(&weekday) && self.start <= time && time < self.end
    }
}

/// A team's declared availability.
///
/// Forbidden, not permitted, intervals are the authoritative representation:
/// any time not explicitly forbidden is available, bounded by the
/// tournament's operating hours. The tagged enum makes the
/// empty-restrictions case unambiguous — `Unrestricted` and
/// `Restricted(vec![])` both mean "available during all tournament hours",
/// never "no availability".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilitySpec {
    #[default]
    Unrestricted,
    Restricted(Vec<ForbiddenWindow>),
}

impl AvailabilitySpec {
    /// Whether a slot starting at `time` on `weekday` is blocked by any
    /// forbidden window.
    pub fn blocks(&self, weekday: Weekday, time: TimeOfDay) -> bool {
        match self {
            AvailabilitySpec::Unrestricted => false,
            AvailabilitySpec::Restricted(windows) => {
                windows.iter().any(|w| w.blocks(weekday, time))
            }
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        match self {
            AvailabilitySpec::Unrestricted => true,
            AvailabilitySpec::Restricted(windows) => windows.is_empty(),
        }
    }
}

/// A registered doubles team.
///
/// The rating pair is used only for zone balancing; rating updates are the
/// rating engine's concern. Teams are immutable once matches reference
/// them, except for lifecycle state transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Database ID (optional on input, server-assigned)
    #[serde(default)]
    pub id: Option<TeamId>,
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub rating_a: f64,
    pub rating_b: f64,
    pub state: TeamState,
    #[serde(default)]
    pub availability: AvailabilitySpec,
}

impl Team {
    pub fn new(
        player_a: PlayerId,
        player_b: PlayerId,
        rating_a: f64,
        rating_b: f64,
        availability: AvailabilitySpec,
    ) -> Self {
        Self {
            id: None,
            player_a,
            player_b,
            rating_a,
            rating_b,
            state: TeamState::Registered,
            availability,
        }
    }

    /// Mean of the two players' ratings, the balancing key for zones.
    pub fn pair_rating(&self) -> f64 {
        (self.rating_a + self.rating_b) / 2.0
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.player_a, self.player_b]
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TeamState::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(days: Vec<Weekday>, start: (u16, u16), end: (u16, u16)) -> ForbiddenWindow {
        ForbiddenWindow::new(
            days,
            TimeOfDay::from_hm(start.0, start.1),
            TimeOfDay::from_hm(end.0, end.1),
        )
    }

    #[test]
    fn test_forbidden_window_blocks_start_inclusive_end_exclusive() {
        let w = window(vec![Weekday::Mon], (18, 0), (20, 0));

        assert!(w.blocks(Weekday::Mon, TimeOfDay::from_hm(18, 0)));
        assert!(w.blocks(Weekday::Mon, TimeOfDay::from_hm(19, 59)));
        assert!(!w.blocks(Weekday::Mon, TimeOfDay::from_hm(20, 0)));
        assert!(!w.blocks(Weekday::Tue, TimeOfDay::from_hm(18, 30)));
    }

    #[test]
    fn test_unrestricted_blocks_nothing() {
        let spec = AvailabilitySpec::Unrestricted;
        assert!(!spec.blocks(Weekday::Mon, TimeOfDay::from_hm(18, 0)));
        assert!(spec.is_unrestricted());
    }

    #[test]
    fn test_empty_restriction_list_is_unrestricted() {
        // Empty forbidden list means "no restriction", never "no availability".
        let spec = AvailabilitySpec::Restricted(vec![]);
        assert!(spec.is_unrestricted());
        assert!(!spec.blocks(Weekday::Sat, TimeOfDay::from_hm(10, 0)));
    }

    #[test]
    fn test_restricted_blocks_only_listed_windows() {
        let spec = AvailabilitySpec::Restricted(vec![
            window(vec![Weekday::Mon, Weekday::Wed], (18, 0), (20, 0)),
            window(vec![Weekday::Sat], (9, 0), (12, 0)),
        ]);

        assert!(spec.blocks(Weekday::Wed, TimeOfDay::from_hm(18, 50)));
        assert!(spec.blocks(Weekday::Sat, TimeOfDay::from_hm(9, 0)));
        assert!(!spec.blocks(Weekday::Sat, TimeOfDay::from_hm(12, 0)));
        assert!(!spec.blocks(Weekday::Fri, TimeOfDay::from_hm(18, 30)));
        assert!(!spec.is_unrestricted());
    }

    #[test]
    fn test_pair_rating_is_mean() {
        let team = Team::new(
            PlayerId::new(1),
            PlayerId::new(2),
            4.5,
            3.5,
            AvailabilitySpec::Unrestricted,
        );
        assert!((team.pair_rating() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_availability_is_unrestricted() {
        let spec = AvailabilitySpec::default();
        assert!(spec.is_unrestricted());
    }

    #[test]
    fn test_availability_spec_json_roundtrip() {
        let spec = AvailabilitySpec::Restricted(vec![window(
            vec![Weekday::Mon, Weekday::Wed],
            (18, 0),
            (20, 0),
        )]);

        let json = serde_json::to_string(&spec).unwrap();
        let parsed: AvailabilitySpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, parsed);

        // The unrestricted case is a bare tag, not an empty list.
        let json = serde_json::to_string(&AvailabilitySpec::Unrestricted).unwrap();
        assert_eq!(json, "\"unrestricted\"");
    }

    #[test]
    fn test_team_deserializes_without_availability() {
        // Absent availability input must mean "unrestricted".
        let json = r#"{
            "player_a": 1,
            "player_b": 2,
            "rating_a": 4.0,
            "rating_b": 3.5,
            "state": "confirmed"
        }"#;

        let team: Team = serde_json::from_str(json).unwrap();
        assert!(team.availability.is_unrestricted());
        assert_eq!(team.state, TeamState::Confirmed);
        assert!(team.id.is_none());
    }
}
