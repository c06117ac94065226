//! HTTP harness: in-memory state, test sessions, and seeding helpers.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;

use crate::domain::ports::{
    CreateLotRequest, FixturePasswordHasher, NoOpParkingMetrics, RegisterUserRequest,
};
use crate::domain::{NewPassword, ParkingLot, Principal, User, UserId, UserProfile, UserRole};
use crate::inbound::http::configure;
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::state::{DrivenAdapters, HttpState};
use crate::outbound::memory::InMemoryStore;

use super::clock::MutableClock;
use super::fixtures::{admin, lot_code, lot_details};

/// Password given to every seeded account.
pub const PASSWORD: &str = "secret1";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set on `res`; panics when absent.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Services over a fresh in-memory store, fixture hashing, and `clock`.
pub fn memory_state(clock: Arc<MutableClock>) -> HttpState {
    let store = Arc::new(InMemoryStore::new());
    HttpState::from_adapters(DrivenAdapters {
        lots: Arc::clone(&store),
        sessions: Arc::clone(&store),
        reports: Arc::clone(&store),
        users: store,
        hasher: Arc::new(FixturePasswordHasher),
        metrics: Arc::new(NoOpParkingMetrics),
        clock,
    })
}

/// The `/api/v1` routes over `state`, wrapped in a test session.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .configure(configure),
    )
}

/// Register an account directly through the account port.
pub async fn seed_user(state: &HttpState, email: &str, role: UserRole) -> User {
    let caller = Principal::new(UserId::random(), UserRole::Admin);
    let request = RegisterUserRequest {
        profile: UserProfile::try_from_parts("Test", "User", email).expect("profile"),
        password: NewPassword::new(PASSWORD).expect("password"),
        role,
    };
    state
        .accounts
        .register(Some(caller), request)
        .await
        .expect("seed user")
}

/// Create a lot directly through the lot port, at two per hour.
pub async fn seed_lot(state: &HttpState, code: &str, capacity: u32) -> ParkingLot {
    let request = CreateLotRequest {
        code: lot_code(code),
        details: lot_details(capacity, 2),
    };
    state
        .lots
        .create_lot(&admin(), request)
        .await
        .expect("seed lot")
}

/// Log in through `POST /api/v1/login` and return the session cookie.
pub async fn login<S, B>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({"email": email, "password": PASSWORD}))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    session_cookie(&res)
}
