//! Router builder for account routes

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    AppState, password_reset_confirm, password_reset_trigger, register, unsubscribe_email,
};

/// Build the account routes
///
/// - POST /register - Create an account and send the welcome link
/// - POST /password-reset/trigger - Email a password reset link
/// - POST /password-reset/confirm - Set a new password with a reset token
/// - GET /unsubscribe/{uidb64}/{token}/{email_type} - Opt out of an email kind
///
/// Requests are traced; browsers may call the routes from the configured
/// frontend origin only.
pub fn build_account_routes(state: AppState) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    if let Some(origin) = state.allowed_origin.clone() {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .route("/register", post(register))
        .route("/password-reset/trigger", post(password_reset_trigger))
        .route("/password-reset/confirm", post(password_reset_confirm))
        .route(
            "/unsubscribe/{uidb64}/{token}/{email_type}",
            get(unsubscribe_email),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
