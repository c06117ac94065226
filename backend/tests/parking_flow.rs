//! End-to-end HTTP flow over the in-memory adapters: bootstrap an admin,
//! open a lot, park a car, bill it, and read the reports.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use parking_backend::test_support::clock::MutableClock;
use parking_backend::test_support::http::{PASSWORD, login, memory_state, test_app};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::morning())
}

fn register_body(first_name: &str, email: &str, role: &str) -> Value {
    json!({
        "firstName": first_name,
        "lastName": "Tester",
        "email": email,
        "password": PASSWORD,
        "role": role,
    })
}

#[rstest]
#[actix_web::test]
async fn a_car_is_parked_billed_and_reported(clock: Arc<MutableClock>) {
    let app = test::init_service(test_app(memory_state(Arc::clone(&clock)))).await;

    // The very first account may be an admin without a session.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body("Grace", "grace@example.com", "admin"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let grace: Value = test::read_body_json(res).await;
    assert_eq!(grace["role"], json!("admin"));

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body("Mallory", "mallory@example.com", "admin"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/register")
            .set_json(register_body("Ada", "Ada@Example.com", "parking_attendant"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let ada: Value = test::read_body_json(res).await;
    assert_eq!(ada["role"], json!("attendant"));
    assert_eq!(ada["email"], json!("ada@example.com"));

    let admin = login(&app, "grace@example.com").await;
    let attendant = login(&app, "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/parking-lots")
            .cookie(admin.clone())
            .set_json(json!({
                "code": "CITY-1",
                "name": "City Centre",
                "capacity": 2,
                "hourlyRate": "3.50",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let lot: Value = test::read_body_json(res).await;
    assert_eq!(lot["availableSpaces"], json!(2));

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/parking-sessions/entry")
            .cookie(attendant.clone())
            .set_json(json!({"plateNumber": "ab-123", "lotCode": "CITY-1"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let entry: Value = test::read_body_json(res).await;
    assert_eq!(entry["session"]["plateNumber"], json!("AB-123"));
    assert_eq!(entry["lot"]["availableSpaces"], json!(1));
    let session_id = entry["session"]["id"].as_str().expect("session id").to_owned();

    clock.advance_minutes(45);
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/parking-sessions/{session_id}/exit"))
            .cookie(attendant.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let exit: Value = test::read_body_json(res).await;
    assert_eq!(exit["bill"]["billableHours"], json!(1));
    assert_eq!(exit["bill"]["chargedAmount"], json!("3.50"));
    assert_eq!(exit["lot"]["availableSpaces"], json!(2));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/reports/dashboard")
            .cookie(attendant)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let dashboard: Value = test::read_body_json(res).await;
    assert_eq!(dashboard["today"], json!({"checkIns": 1, "checkOuts": 1}));
    assert_eq!(dashboard["totals"]["totalOccupied"], json!(0));

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/reports/outgoing?startDate=2026-03-10&endDate=2026-03-10")
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = test::read_body_json(res).await;
    assert_eq!(report["totalRecords"], json!(1));
    assert_eq!(report["totalAmount"], json!("3.50"));
    assert_eq!(report["records"][0]["plateNumber"], json!("AB-123"));
}

#[rstest]
#[actix_web::test]
async fn anonymous_callers_are_turned_away(clock: Arc<MutableClock>) {
    let app = test::init_service(test_app(memory_state(clock))).await;

    for uri in [
        "/api/v1/users/me",
        "/api/v1/parking-lots",
        "/api/v1/parking-sessions",
        "/api/v1/reports/dashboard",
    ] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], json!("unauthorized"), "{uri}");
    }
}
