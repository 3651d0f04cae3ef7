use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use lensbook::SchedulingError;
use lensbook::database::models::{BookingStatus, TeamAssignment};
use lensbook::services::UnavailableReason;

mod common;
use common::{TestContext, booking_with_assignment, monday, provider_with_team};

#[tokio::test]
async fn open_day_with_free_team_is_available() {
    let ctx = TestContext::new();
    let provider = provider_with_team(2);
    ctx.directory.insert(provider.clone()).await;

    let result = ctx
        .service
        .check_availability(provider.id, monday(), 1)
        .await
        .unwrap();

    assert!(result.available);
    assert_eq!(result.reason, None);
    assert_eq!(result.hours, Some(common::window("09:00", "18:00")));
    assert_eq!(result.team.unwrap().free_units, 2);
    assert!(result.booked_intervals.is_empty());
}

#[tokio::test]
async fn blackout_date_short_circuits() {
    let ctx = TestContext::new();
    let mut provider = provider_with_team(2);
    let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
    provider.policy.blackout_dates.insert(christmas);
    ctx.directory.insert(provider.clone()).await;

    let result = ctx
        .service
        .check_availability(provider.id, christmas, 1)
        .await
        .unwrap();

    assert!(!result.available);
    assert_eq!(result.reason, Some(UnavailableReason::BlackoutDate));
    assert_eq!(result.hours, None);
    assert_eq!(result.team, None);
}

#[tokio::test]
async fn closed_weekday_reports_day_unavailable() {
    let ctx = TestContext::new();
    let provider = provider_with_team(1);
    ctx.directory.insert(provider.clone()).await;

    // 2024-12-22 is a Sunday, closed by the weekly schedule.
    let sunday = NaiveDate::from_ymd_opt(2024, 12, 22).unwrap();
    let result = ctx
        .service
        .check_availability(provider.id, sunday, 1)
        .await
        .unwrap();

    assert!(!result.available);
    assert_eq!(result.reason, Some(UnavailableReason::DayUnavailable));
}

#[tokio::test]
async fn full_day_booking_of_both_members_exhausts_capacity() {
    let ctx = TestContext::new();
    let provider = provider_with_team(2);
    ctx.directory.insert(provider.clone()).await;

    let assignment = TeamAssignment {
        team_member_ids: provider.team_members.iter().map(|m| m.id).collect(),
        equipment_ids: vec![],
    };
    ctx.store
        .insert(booking_with_assignment(
            &provider,
            monday(),
            "09:00",
            "18:00",
            BookingStatus::Confirmed,
            assignment,
        ))
        .await;

    let result = ctx
        .service
        .check_availability(provider.id, monday(), 1)
        .await
        .unwrap();

    assert!(!result.available);
    assert_eq!(result.reason, Some(UnavailableReason::InsufficientCapacity));
    assert_eq!(result.team.unwrap().free_units, 0);
    assert_eq!(result.booked_intervals.len(), 1);
}

#[tokio::test]
async fn cancelled_bookings_release_their_units() {
    let ctx = TestContext::new();
    let provider = provider_with_team(1);
    ctx.directory.insert(provider.clone()).await;

    let assignment = TeamAssignment {
        team_member_ids: vec![provider.team_members[0].id],
        equipment_ids: vec![],
    };
    ctx.store
        .insert(booking_with_assignment(
            &provider,
            monday(),
            "09:00",
            "18:00",
            BookingStatus::Cancelled,
            assignment,
        ))
        .await;

    let result = ctx
        .service
        .check_availability(provider.id, monday(), 1)
        .await
        .unwrap();

    assert!(result.available);
    assert_eq!(result.team.unwrap().free_units, 1);
}

#[tokio::test]
async fn inactive_members_do_not_count_toward_capacity() {
    let ctx = TestContext::new();
    let mut provider = provider_with_team(1);
    provider
        .team_members
        .push(common::team_member(provider.id, false));
    ctx.directory.insert(provider.clone()).await;

    let result = ctx
        .service
        .check_availability(provider.id, monday(), 2)
        .await
        .unwrap();

    assert!(!result.available);
    assert_eq!(result.team.unwrap().total_units, 1);
}

#[tokio::test]
async fn repeated_checks_are_idempotent() {
    let ctx = TestContext::new();
    let provider = provider_with_team(2);
    ctx.directory.insert(provider.clone()).await;

    let first = ctx
        .service
        .check_availability(provider.id, monday(), 1)
        .await
        .unwrap();
    let second = ctx
        .service
        .check_availability(provider.id, monday(), 1)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[tokio::test]
async fn unknown_provider_is_an_error() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .check_availability(Uuid::new_v4(), monday(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulingError::ProviderNotFound(_)));
}

#[tokio::test]
async fn availability_result_uses_wire_reason_codes() {
    let ctx = TestContext::new();
    let mut provider = provider_with_team(1);
    let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
    provider.policy.blackout_dates.insert(christmas);
    ctx.directory.insert(provider.clone()).await;

    let result = ctx
        .service
        .check_availability(provider.id, christmas, 1)
        .await
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["reason"], serde_json::json!("blackout_date"));
    assert_eq!(json["available"], serde_json::json!(false));
}
