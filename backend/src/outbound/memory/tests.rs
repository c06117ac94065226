//! Behavioural tests for the in-memory store.

use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta};
use rstest::{fixture, rstest};
use rust_decimal_macros::dec;

use super::*;
use crate::domain::{UserRole, resized_occupancy};
use crate::test_support::clock::fixed_morning;
use crate::test_support::fixtures::{lot, lot_code, lot_details, plate};

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

fn entry(raw_plate: &str, lot: LotRef, minutes_after_morning: i64) -> NewSessionEntry {
    NewSessionEntry {
        session_id: SessionId::random(),
        plate: plate(raw_plate),
        lot,
        entry_time: fixed_morning() + TimeDelta::minutes(minutes_after_morning),
    }
}

async fn seeded(store: &InMemoryStore, code: &str, capacity: u32) -> ParkingLot {
    let lot = lot(code, capacity, 5);
    ParkingLotRepository::insert(store, &lot)
        .await
        .expect("insert lot");
    lot
}

#[rstest]
#[tokio::test]
async fn duplicate_lot_codes_are_rejected(store: InMemoryStore) {
    seeded(&store, "NORTH", 2).await;
    let err = ParkingLotRepository::insert(&store, &lot("NORTH", 9, 1))
        .await
        .expect_err("duplicate code");
    assert_eq!(err, ParkingLotRepositoryError::duplicate_code("NORTH"));
}

#[rstest]
#[tokio::test]
async fn full_lot_rejects_new_plates_but_reports_active_plates_first(store: InMemoryStore) {
    seeded(&store, "NORTH", 1).await;
    let north = || LotRef::Code(lot_code("NORTH"));

    let outcome = store
        .open_session(&entry("ABC123", north(), 0))
        .await
        .expect("first entry");
    assert_eq!(outcome.lot.occupied(), 1);

    let err = store
        .open_session(&entry("ABC123", north(), 1))
        .await
        .expect_err("plate already parked");
    assert_eq!(err, ParkingSessionRepositoryError::already_active("ABC123"));

    let err = store
        .open_session(&entry("XYZ999", north(), 2))
        .await
        .expect_err("lot full");
    assert_eq!(err, ParkingSessionRepositoryError::lot_full(1_u32));
}

#[rstest]
#[tokio::test]
async fn unknown_lot_is_reported(store: InMemoryStore) {
    let err = store
        .open_session(&entry("ABC123", LotRef::Code(lot_code("GHOST")), 0))
        .await
        .expect_err("no such lot");
    assert!(matches!(err, ParkingSessionRepositoryError::LotNotFound { .. }));
}

#[rstest]
#[tokio::test]
async fn exit_charges_and_frees_the_space(store: InMemoryStore) {
    let lot = seeded(&store, "NORTH", 1).await;
    let opened = store
        .open_session(&entry("ABC123", LotRef::Id(lot.id()), 0))
        .await
        .expect("entry");

    let exit_time = fixed_morning() + TimeDelta::minutes(125);
    let outcome = store
        .close_session(opened.session.id(), exit_time)
        .await
        .expect("exit");

    assert_eq!(outcome.bill.amount(), dec!(15.00));
    assert_eq!(outcome.session.charged_amount(), Some(dec!(15.00)));
    assert_eq!(outcome.lot.occupied(), 0);

    let err = store
        .close_session(opened.session.id(), exit_time)
        .await
        .expect_err("second exit");
    assert!(matches!(err, ParkingSessionRepositoryError::AlreadyClosed { .. }));
    let current = ParkingLotRepository::find_by_id(&store, lot.id())
        .await
        .expect("lookup")
        .expect("lot exists");
    assert_eq!(current.occupied(), 0);

    store
        .open_session(&entry("ABC123", LotRef::Id(lot.id()), 200))
        .await
        .expect("plate may park again after leaving");
}

#[rstest]
#[tokio::test]
async fn shrinking_capacity_caps_occupancy(store: InMemoryStore) {
    let lot = seeded(&store, "NORTH", 3).await;
    for (index, raw) in ["AA11", "BB22", "CC33"].iter().enumerate() {
        store
            .open_session(&entry(raw, LotRef::Id(lot.id()), index as i64))
            .await
            .expect("entry");
    }

    let details = lot_details(1, 5);
    let updated = store.update_details(lot.id(), &details).await.expect("update");

    assert_eq!(updated.capacity(), 1);
    assert_eq!(updated.occupied(), resized_occupancy(3, 1));
}

#[rstest]
#[tokio::test]
async fn deleting_a_lot_with_parked_cars_is_refused(store: InMemoryStore) {
    let lot = seeded(&store, "NORTH", 2).await;
    let opened = store
        .open_session(&entry("ABC123", LotRef::Id(lot.id()), 0))
        .await
        .expect("entry");

    let err = store.delete(lot.id()).await.expect_err("cars parked");
    assert!(matches!(err, ParkingLotRepositoryError::HasActiveSessions { .. }));

    store
        .close_session(opened.session.id(), fixed_morning() + TimeDelta::hours(1))
        .await
        .expect("exit");
    store.delete(lot.id()).await.expect("empty lot deletes");

    let history = ParkingSessionRepository::find_by_id(&store, opened.session.id())
        .await
        .expect("lookup");
    assert!(history.is_none());
}

#[rstest]
#[tokio::test]
async fn concurrent_entries_never_overfill(store: InMemoryStore) {
    let store = Arc::new(store);
    let lot = seeded(&store, "NORTH", 3).await;

    let attempts = (0..10).map(|index| {
        let store = Arc::clone(&store);
        let lot_id = lot.id();
        tokio::spawn(async move {
            store
                .open_session(&entry(&format!("CAR{index}"), LotRef::Id(lot_id), index))
                .await
        })
    });
    let results = futures::future::join_all(attempts).await;

    let admitted = results
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .filter(Result::is_ok)
        .count();
    assert_eq!(admitted, 3);
    let current = ParkingLotRepository::find_by_id(&*store, lot.id())
        .await
        .expect("lookup")
        .expect("lot exists");
    assert_eq!(current.occupied(), 3);
}

#[rstest]
#[tokio::test]
async fn reports_cover_the_requested_day(store: InMemoryStore) {
    let lot = seeded(&store, "NORTH", 5).await;
    let first = store
        .open_session(&entry("AA11", LotRef::Id(lot.id()), 0))
        .await
        .expect("entry");
    store
        .open_session(&entry("BB22", LotRef::Id(lot.id()), 10))
        .await
        .expect("entry");
    store
        .close_session(first.session.id(), fixed_morning() + TimeDelta::minutes(90))
        .await
        .expect("exit");

    let day = NaiveDate::from_ymd_opt(2026, 3, 10).expect("date");
    let range = DateRange::from_dates(day, day).expect("range");
    let entered = store
        .entered_between(range, PageRequest::default())
        .await
        .expect("entered");
    assert_eq!(entered.meta().total, 2);
    assert_eq!(entered.items()[0].session.plate().as_ref(), "BB22");

    let exited = store
        .exited_between(range, PageRequest::default())
        .await
        .expect("exited");
    assert_eq!(exited.records.meta().total, 1);
    assert_eq!(exited.total_amount, dec!(10.00));

    let totals = store.occupancy_totals().await.expect("totals");
    assert_eq!(totals.total_capacity, 5);
    assert_eq!(totals.total_occupied, 1);

    let counts = store.daily_counts(fixed_morning()).await.expect("counts");
    assert_eq!(counts.check_ins, 2);
    assert_eq!(counts.check_outs, 1);

    let recent = store.recent_activity(1).await.expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].session.id(), first.session.id());
}

#[rstest]
#[tokio::test]
async fn lot_listing_is_paged(store: InMemoryStore) {
    for code in ["A1", "B2", "C3"] {
        seeded(&store, code, 1).await;
    }
    let page = PageRequest::try_new(Some(2), Some(2)).expect("page request");
    let listed = ParkingLotRepository::list(&store, page).await.expect("list");

    assert_eq!(listed.items().len(), 1);
    assert_eq!(listed.meta().total, 3);
    assert_eq!(listed.meta().pages, 2);
}

#[rstest]
#[tokio::test]
async fn user_emails_stay_unique(store: InMemoryStore) {
    let profile = UserProfile::try_from_parts("Ada", "Lovelace", "ada@example.com")
        .expect("profile");
    let user = User {
        id: UserId::random(),
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        email: profile.email.clone(),
        role: UserRole::Admin,
        created_at: fixed_morning(),
    };
    let hash = PasswordHash::new("fixture$secret1");
    UserRepository::insert(&store, &user, &hash)
        .await
        .expect("first insert");

    let twin = User {
        id: UserId::random(),
        ..user.clone()
    };
    let err = UserRepository::insert(&store, &twin, &hash)
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));

    let found = store
        .find_credentials_by_email(&profile.email)
        .await
        .expect("lookup")
        .expect("stored");
    assert_eq!(found.user.id, user.id);
    assert_eq!(store.count().await.expect("count"), 1);
}

#[rstest]
#[tokio::test]
async fn first_user_insert_only_fills_an_empty_table(store: InMemoryStore) {
    let user = |email: &str| {
        let profile = UserProfile::try_from_parts("Ada", "Lovelace", email).expect("profile");
        User {
            id: UserId::random(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            role: UserRole::Admin,
            created_at: fixed_morning(),
        }
    };
    let hash = PasswordHash::new("fixture$secret1");

    let first = store
        .insert_first(&user("ada@example.com"), &hash)
        .await
        .expect("first insert");
    let second = store
        .insert_first(&user("grace@example.com"), &hash)
        .await
        .expect("second insert");

    assert!(first);
    assert!(!second);
    assert_eq!(store.count().await.expect("count"), 1);
}
