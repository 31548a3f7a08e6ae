use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use resolveit_core::health::healthz;
use resolveit_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    auth::{login, signup},
    health::readyz,
    otp::{resend_otp, send_otp, verify_otp},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // OTP lifecycle
        .route("/otp/send", post(send_otp))
        .route("/otp/verify", post(verify_otp))
        .route("/otp/resend", post(resend_otp))
        // Principals
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
}
