use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use super::{error_response, AppState};
use crate::models::users::{Credentials, NewUser};
use crate::services::users::UserRequest;
use crate::services::ServiceError;

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::Authenticate {
            email: credentials.email,
            password: credentials.password,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match user_rx.await {
        Ok(Ok(user)) => (StatusCode::OK, Json(json!(user))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    Path(caller_id): Path<String>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::ListUsers {
            caller_id,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match user_rx.await {
        Ok(Ok(users)) => (StatusCode::OK, Json(json!(users))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    Path(caller_id): Path<String>,
    Json(profile): Json<NewUser>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::CreateUser {
            caller_id,
            profile,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match user_rx.await {
        Ok(Ok(user)) => (StatusCode::CREATED, Json(json!(user))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}
