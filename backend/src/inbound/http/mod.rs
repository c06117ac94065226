//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod parking_lots;
pub mod parking_sessions;
pub mod reports;
pub mod responses;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler and the extractor error handlers.
///
/// Session middleware is applied by the caller so tests can swap in an
/// ephemeral key.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(users::login)
        .service(users::logout)
        .service(users::register)
        .service(users::current_user)
        .service(users::update_current_user)
        .service(users::change_password)
        .service(users::list_users)
        .service(parking_lots::create_lot)
        .service(parking_lots::list_lots)
        .service(parking_lots::get_lot)
        .service(parking_lots::update_lot)
        .service(parking_lots::delete_lot)
        .service(parking_sessions::record_entry)
        .service(parking_sessions::list_sessions)
        .service(parking_sessions::active_session)
        .service(parking_sessions::record_exit)
        .service(parking_sessions::get_session)
        .service(reports::dashboard)
        .service(reports::entered)
        .service(reports::outgoing);
}
