use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use super::ledger::LedgerRequest;
use super::users::UserRequest;
use super::voice::VoiceRequest;
use super::ServiceError;

mod ledger;
mod users;

#[derive(Clone)]
pub struct AppState {
    user_channel: mpsc::Sender<UserRequest>,
    ledger_channel: mpsc::Sender<LedgerRequest>,
    voice_channel: mpsc::Sender<VoiceRequest>,
}

fn error_response(error: ServiceError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &error {
        ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Auth => StatusCode::UNAUTHORIZED,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Extraction(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({ "description": error.to_string() })))
}

pub async fn start_http_server(
    bind: &str,
    user_channel: mpsc::Sender<UserRequest>,
    ledger_channel: mpsc::Sender<LedgerRequest>,
    voice_channel: mpsc::Sender<VoiceRequest>,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        user_channel,
        ledger_channel,
        voice_channel,
    };

    let app = Router::new()
        .route("/auth/login", post(users::login))
        .route("/users/{caller_id}", get(users::list_users).post(users::create_user))
        .route(
            "/ledger/{user_id}/purchases",
            get(ledger::list_purchases).post(ledger::record_purchase),
        )
        .route(
            "/ledger/{user_id}/purchases/{purchase_id}",
            delete(ledger::delete_purchase),
        )
        .route(
            "/ledger/{user_id}/sales",
            get(ledger::list_sales).post(ledger::record_sale),
        )
        .route("/ledger/{user_id}/dashboard", get(ledger::dashboard))
        .route(
            "/ledger/{user_id}/goals",
            get(ledger::get_goals).put(ledger::update_goals),
        )
        .route("/ledger/{user_id}/report", get(ledger::export_report))
        .route("/ledger/{user_id}/voice", post(ledger::capture_voice))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind).await?;
    println!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
