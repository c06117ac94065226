//! Tests for the entry/exit service.

use std::sync::Arc;

use chrono::TimeDelta;
use rstest::rstest;
use rust_decimal_macros::dec;

use super::*;
use crate::domain::ports::{MockParkingMetrics, MockParkingSessionRepository, NoOpParkingMetrics};
use crate::domain::{ErrorCode, ParkingSession, SessionRecord};
use crate::test_support::clock::{MutableClock, fixed_morning};
use crate::test_support::fixtures::{admin, attendant, lot, lot_code, plate};

fn service_with(
    repo: MockParkingSessionRepository,
    metrics: Arc<dyn ParkingMetrics>,
    clock: Arc<MutableClock>,
) -> ParkingSessionService<MockParkingSessionRepository> {
    ParkingSessionService::new(Arc::new(repo), metrics, clock)
}

fn service(repo: MockParkingSessionRepository) -> ParkingSessionService<MockParkingSessionRepository> {
    service_with(
        repo,
        Arc::new(NoOpParkingMetrics),
        Arc::new(MutableClock::morning()),
    )
}

fn open_record(raw_plate: &str) -> SessionRecord {
    let lot = lot("NORTH", 4, 5);
    let session = ParkingSession::open(SessionId::random(), plate(raw_plate), lot.id(), fixed_morning());
    SessionRecord::new(session, &lot)
}

#[rstest]
#[tokio::test]
async fn entry_uses_clock_time_and_reports_metric() {
    let mut repo = MockParkingSessionRepository::new();
    repo.expect_open_session()
        .times(1)
        .withf(|entry| entry.entry_time == fixed_morning() && entry.plate.as_ref() == "ABC123")
        .return_once(|entry| {
            let mut lot = lot("NORTH", 1, 5);
            lot.try_reserve().expect("space free");
            Ok(EntryOutcome {
                session: ParkingSession::open(
                    entry.session_id,
                    entry.plate.clone(),
                    lot.id(),
                    entry.entry_time,
                ),
                lot,
            })
        });
    let mut metrics = MockParkingMetrics::new();
    metrics
        .expect_record_entry()
        .times(1)
        .return_once(|_| Ok(()));

    let outcome = service_with(repo, Arc::new(metrics), Arc::new(MutableClock::morning()))
        .record_entry(
            &attendant(),
            plate("abc123"),
            LotRef::Code(lot_code("NORTH")),
        )
        .await
        .expect("entry succeeds");

    assert!(outcome.session.is_open());
    assert_eq!(outcome.lot.available(), 0);
}

#[rstest]
#[case(ParkingSessionRepositoryError::lot_full(1_u32), ErrorCode::Conflict, EntryRejection::LotFull)]
#[case(
    ParkingSessionRepositoryError::already_active("ABC123"),
    ErrorCode::Conflict,
    EntryRejection::AlreadyActive
)]
#[case(
    ParkingSessionRepositoryError::lot_not_found("code SOUTH"),
    ErrorCode::NotFound,
    EntryRejection::LotNotFound
)]
#[tokio::test]
async fn rejected_entries_are_counted(
    #[case] failure: ParkingSessionRepositoryError,
    #[case] expected_code: ErrorCode,
    #[case] expected_reason: EntryRejection,
) {
    let mut repo = MockParkingSessionRepository::new();
    repo.expect_open_session().return_once(move |_| Err(failure));
    let mut metrics = MockParkingMetrics::new();
    metrics
        .expect_record_rejected_entry()
        .withf(move |reason| *reason == expected_reason)
        .times(1)
        .return_once(|_| Ok(()));
    metrics.expect_record_entry().times(0);

    let err = service_with(repo, Arc::new(metrics), Arc::new(MutableClock::morning()))
        .record_entry(&attendant(), plate("ABC123"), LotRef::Code(lot_code("NORTH")))
        .await
        .expect_err("entry rejected");

    assert_eq!(err.code(), expected_code);
}

#[rstest]
#[tokio::test]
async fn exit_closes_at_clock_time() {
    let clock = Arc::new(MutableClock::morning());
    clock.advance_minutes(125);
    let exit_time = fixed_morning() + TimeDelta::minutes(125);

    let mut repo = MockParkingSessionRepository::new();
    repo.expect_close_session()
        .withf(move |_, at| *at == exit_time)
        .times(1)
        .return_once(|id, at| {
            let lot = lot("NORTH", 2, 5);
            let mut session = ParkingSession::open(id, plate("ABC123"), lot.id(), fixed_morning());
            let bill = session.close(at, lot.hourly_rate()).expect("open session");
            Ok(ExitOutcome { session, bill, lot })
        });
    let mut metrics = MockParkingMetrics::new();
    metrics
        .expect_record_exit()
        .withf(|_, amount| *amount == dec!(15.00))
        .times(1)
        .return_once(|_, _| Ok(()));

    let outcome = service_with(repo, Arc::new(metrics), clock)
        .record_exit(&attendant(), SessionId::random())
        .await
        .expect("exit succeeds");

    assert_eq!(outcome.bill.billable_hours(), 3);
    assert_eq!(outcome.bill.amount(), dec!(15.00));
}

#[rstest]
#[tokio::test]
async fn second_exit_is_a_conflict() {
    let mut repo = MockParkingSessionRepository::new();
    repo.expect_close_session()
        .return_once(|id, _| Err(ParkingSessionRepositoryError::already_closed(id.to_string())));

    let err = service(repo)
        .record_exit(&attendant(), SessionId::random())
        .await
        .expect_err("already closed");

    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn open_session_duration_counts_up_to_now() {
    let clock = Arc::new(MutableClock::morning());
    clock.advance_minutes(61);
    let record = open_record("ABC123");
    let mut repo = MockParkingSessionRepository::new();
    repo.expect_find_open_by_plate()
        .return_once(move |_| Ok(Some(record)));

    let view = service_with(repo, Arc::new(NoOpParkingMetrics), clock)
        .active_session(&plate("ABC123"))
        .await
        .expect("active session");

    assert_eq!(view.duration_hours, 2);
}

#[rstest]
#[tokio::test]
async fn unknown_plate_is_not_found() {
    let mut repo = MockParkingSessionRepository::new();
    repo.expect_find_open_by_plate().return_once(|_| Ok(None));

    let err = service(repo)
        .active_session(&plate("ZZZ000"))
        .await
        .expect_err("no open session");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn listing_sessions_requires_admin() {
    let mut repo = MockParkingSessionRepository::new();
    repo.expect_list().times(0);
    let err = service(repo)
        .list_sessions(&attendant(), PageRequest::default())
        .await
        .expect_err("attendant");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let mut repo = MockParkingSessionRepository::new();
    repo.expect_list()
        .times(1)
        .return_once(|page| Ok(Page::new(vec![open_record("ABC123")], page, 1)));
    let listed = service(repo)
        .list_sessions(&admin(), PageRequest::default())
        .await
        .expect("admin lists sessions");
    assert_eq!(listed.items().len(), 1);
    assert_eq!(listed.meta().total, 1);
}
