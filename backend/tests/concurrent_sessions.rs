//! Concurrency guarantees of the ports over the in-memory store.
//!
//! Entries race for the last spaces of a lot and exits race to close the
//! same session; the lot counter must never drift from the open sessions.
//! Anonymous admin sign-ups race for the empty user table; only one wins.

use std::sync::Arc;

use parking_backend::domain::ports::RegisterUserRequest;
use parking_backend::domain::{ErrorCode, LotRef, NewPassword, UserProfile, UserRole};
use parking_backend::test_support::clock::MutableClock;
use parking_backend::test_support::fixtures::{admin, attendant, plate};
use parking_backend::test_support::http::{memory_state, seed_lot};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_entries_never_overfill_a_lot() {
    let state = memory_state(Arc::new(MutableClock::morning()));
    let lot = seed_lot(&state, "RUSH-01", 5).await;

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let sessions = Arc::clone(&state.sessions);
            let lot_id = lot.id();
            tokio::spawn(async move {
                sessions
                    .record_entry(&attendant(), plate(&format!("CAR{n:03}")), LotRef::Id(lot_id))
                    .await
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.expect("task joins") {
            Ok(_) => admitted += 1,
            Err(err) => assert_eq!(err.code(), ErrorCode::Conflict),
        }
    }

    assert_eq!(admitted, 5);
    let lot = state.lots_query.get_lot(lot.id()).await.expect("lot");
    assert_eq!(lot.occupied(), 5);
    assert_eq!(lot.available(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_exits_close_a_session_once() {
    let clock = Arc::new(MutableClock::morning());
    let state = memory_state(Arc::clone(&clock));
    let lot = seed_lot(&state, "RUSH-02", 3).await;
    let entry = state
        .sessions
        .record_entry(&attendant(), plate("ABC123"), LotRef::Id(lot.id()))
        .await
        .expect("entry");
    clock.advance_minutes(90);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let sessions = Arc::clone(&state.sessions);
            let id = entry.session.id();
            tokio::spawn(async move { sessions.record_exit(&attendant(), id).await })
        })
        .collect();

    let mut closed = 0;
    for handle in handles {
        match handle.await.expect("task joins") {
            Ok(outcome) => {
                closed += 1;
                assert_eq!(outcome.bill.billable_hours(), 2);
            }
            Err(err) => assert_eq!(err.code(), ErrorCode::Conflict),
        }
    }

    assert_eq!(closed, 1);
    let lot = state.lots_query.get_lot(lot.id()).await.expect("lot");
    assert_eq!(lot.occupied(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_first_admins_register_once() {
    let state = memory_state(Arc::new(MutableClock::morning()));

    let handles: Vec<_> = (0..12)
        .map(|n| {
            let accounts = Arc::clone(&state.accounts);
            tokio::spawn(async move {
                let request = RegisterUserRequest {
                    profile: UserProfile::try_from_parts(
                        "First",
                        "Admin",
                        &format!("admin{n}@example.com"),
                    )
                    .expect("profile"),
                    password: NewPassword::new("secret1").expect("password"),
                    role: UserRole::Admin,
                };
                accounts.register(None, request).await
            })
        })
        .collect();

    let mut registered = 0;
    for handle in handles {
        match handle.await.expect("task joins") {
            Ok(user) => {
                registered += 1;
                assert_eq!(user.role, UserRole::Admin);
            }
            Err(err) => assert_eq!(err.code(), ErrorCode::Forbidden),
        }
    }

    assert_eq!(registered, 1);
    let users = state.users.list_users(&admin()).await.expect("list");
    assert_eq!(users.len(), 1);
}
