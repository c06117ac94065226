use super::*;
use crate::domain::{LotId, SessionId};
use actix_rt::System;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
fn fixtures_are_object_safe() {
    let lots: Arc<dyn ParkingLotRepository> = Arc::new(FixtureParkingLotRepository);
    let sessions: Arc<dyn ParkingSessionRepository> = Arc::new(FixtureParkingSessionRepository);
    let metrics: Arc<dyn ParkingMetrics> = Arc::new(NoOpParkingMetrics);

    System::new().block_on(async move {
        let lot_id = LotId::random();
        assert!(lots.find_by_id(lot_id).await.expect("lookup").is_none());
        assert!(
            sessions
                .find_by_id(SessionId::random())
                .await
                .expect("lookup")
                .is_none()
        );
        assert!(
            metrics
                .record_rejected_entry(EntryRejection::LotNotFound)
                .await
                .is_ok()
        );
    });
}

#[rstest]
fn mocked_repository_returns_scripted_error() {
    let mut repo = MockParkingLotRepository::new();
    repo.expect_try_reserve_space()
        .times(1)
        .return_once(|_| Err(ParkingLotRepositoryError::lot_full(3_u32)));

    System::new().block_on(async move {
        let err = repo
            .try_reserve_space(LotId::random())
            .await
            .expect_err("scripted failure");
        assert_eq!(err.to_string(), "parking lot is full (3 spaces)");
    });
}

#[rstest]
#[case(
    ParkingSessionRepositoryError::already_active("ABC123"),
    "vehicle ABC123 already has an active session"
)]
#[case(
    ParkingSessionRepositoryError::already_closed("s-1"),
    "parking session s-1 is already closed"
)]
fn session_errors_render_messages(
    #[case] err: ParkingSessionRepositoryError,
    #[case] expected: &str,
) {
    assert_eq!(err.to_string(), expected);
}

#[rstest]
fn duplicate_email_names_the_address() {
    let err = UserPersistenceError::duplicate_email("ada@example.com");
    assert_eq!(err.to_string(), "email ada@example.com is already registered");
}
