//! Shared helpers for integration tests.

use std::sync::Arc;

use chrono::NaiveDate;

use matchpoint::api::{
    AvailabilitySpec, Court, Phase, PlayerId, SetScore, Team, TeamState, TournamentId,
};
use matchpoint::db::{LocalRepository, TournamentRepository};
use matchpoint::engine::ScheduleEngine;
use matchpoint::models::time::{DateRange, DayWindow, OperatingHours, TimeOfDay};
use matchpoint::models::tournament::TournamentSettings;

/// Two playing weeks in March 2026, 18:00-22:00 weekdays and 09:00-21:00
/// weekends, 50-minute matches.
pub fn test_settings() -> TournamentSettings {
    let dates = DateRange::new(
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
    )
    .unwrap();
    let weekday = DayWindow::new(TimeOfDay::from_hm(18, 0), TimeOfDay::from_hm(22, 0)).unwrap();
    let weekend = DayWindow::new(TimeOfDay::from_hm(9, 0), TimeOfDay::from_hm(21, 0)).unwrap();
    TournamentSettings::new(dates, OperatingHours::new(weekday, weekend))
}

pub fn test_engine() -> ScheduleEngine {
    ScheduleEngine::new(Arc::new(LocalRepository::new()))
}

/// Create a tournament with `teams` confirmed unrestricted teams and
/// `courts` active courts, still in the registration phase.
pub async fn seed_tournament(
    engine: &ScheduleEngine,
    teams: usize,
    courts: usize,
) -> TournamentId {
    seed_tournament_with(engine, teams, courts, |_| AvailabilitySpec::Unrestricted).await
}

/// Like [`seed_tournament`], with per-team availability supplied by index.
pub async fn seed_tournament_with<F>(
    engine: &ScheduleEngine,
    teams: usize,
    courts: usize,
    availability: F,
) -> TournamentId
where
    F: Fn(usize) -> AvailabilitySpec,
{
    let tournament = engine
        .create_tournament("Integration Open", Some(test_settings()))
        .await
        .unwrap();
    let id = tournament.id.unwrap();

    for i in 0..teams {
        let mut team = Team::new(
            PlayerId::new((i as i64) * 2 + 1),
            PlayerId::new((i as i64) * 2 + 2),
            3.0 + (i as f64) * 0.15,
            3.2 + (i as f64) * 0.15,
            availability(i),
        );
        team.state = TeamState::Confirmed;
        engine.repository().store_team(id, &team).await.unwrap();
    }
    for i in 0..courts {
        engine
            .repository()
            .store_court(id, &Court::new(format!("Court {}", i + 1)))
            .await
            .unwrap();
    }
    id
}

/// Confirm every open group match with a 2-0 home win.
pub async fn confirm_all_group_matches(engine: &ScheduleEngine, id: TournamentId) {
    let matches = engine.repository().list_group_matches(id).await.unwrap();
    for m in matches {
        engine
            .confirm_result(
                m.id.unwrap(),
                m.home,
                vec![SetScore::new(6, 3), SetScore::new(6, 2)],
            )
            .await
            .unwrap();
    }
}

/// Drive a seeded tournament through zones and fixture into the group
/// stage, returning the zone count.
pub async fn enter_group_stage(
    engine: &ScheduleEngine,
    id: TournamentId,
    hint: Option<usize>,
) -> usize {
    engine
        .transition_phase(id, Phase::BuildingZones)
        .await
        .unwrap();
    let zones = engine.build_zones(id, hint).await.unwrap();
    engine.generate_fixture(id).await.unwrap();
    engine
        .transition_phase(id, Phase::GroupStage)
        .await
        .unwrap();
    zones.len()
}
