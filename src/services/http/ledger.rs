use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::{error_response, AppState};
use crate::models::goals::GoalsUpdate;
use crate::models::ledger::{NewPurchase, NewSale};
use crate::services::ledger::LedgerRequest;
use crate::services::voice::VoiceRequest;
use crate::services::ServiceError;

#[derive(Deserialize)]
pub struct VoiceCapture {
    pub transcript: String,
}

pub async fn record_purchase(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(purchase): Json<NewPurchase>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::RecordPurchase {
            user_id,
            purchase,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match ledger_rx.await {
        Ok(Ok(purchase)) => (StatusCode::CREATED, Json(json!(purchase))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn record_sale(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(sale): Json<NewSale>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::RecordSale {
            user_id,
            sale,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match ledger_rx.await {
        Ok(Ok(sale)) => (StatusCode::CREATED, Json(json!(sale))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    Path((user_id, purchase_id)): Path<(String, String)>,
) -> Response {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::DeletePurchase {
            caller_id: user_id,
            purchase_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ))
        .into_response();
    }

    match ledger_rx.await {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(service_error)) => error_response(service_error).into_response(),
        Err(e) => error_response(ServiceError::Internal(e.to_string())).into_response(),
    }
}

pub async fn list_purchases(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::ListPurchases {
            user_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match ledger_rx.await {
        Ok(Ok(purchases)) => (StatusCode::OK, Json(json!(purchases))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn list_sales(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::ListSales {
            user_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match ledger_rx.await {
        Ok(Ok(sales)) => (StatusCode::OK, Json(json!(sales))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::GetDashboard {
            user_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match ledger_rx.await {
        Ok(Ok(summary)) => (StatusCode::OK, Json(json!(summary))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn get_goals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::GetGoals {
            user_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match ledger_rx.await {
        Ok(Ok(goals)) => (StatusCode::OK, Json(json!(goals))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn update_goals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<GoalsUpdate>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::UpdateGoals {
            user_id,
            update,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match ledger_rx.await {
        Ok(Ok(goals)) => (StatusCode::OK, Json(json!(goals))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}

pub async fn export_report(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::ExportReport {
            user_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ))
        .into_response();
    }

    match ledger_rx.await {
        Ok(Ok(report)) => (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    "text/csv; charset=utf-8".to_string(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", report.filename),
                ),
            ],
            report.content,
        )
            .into_response(),
        Ok(Err(service_error)) => error_response(service_error).into_response(),
        Err(e) => error_response(ServiceError::Internal(e.to_string())).into_response(),
    }
}

pub async fn capture_voice(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(capture): Json<VoiceCapture>,
) -> impl IntoResponse {
    let (voice_tx, voice_rx) = oneshot::channel();

    let send_result = state
        .voice_channel
        .send(VoiceRequest::CapturePurchase {
            user_id,
            transcript: capture.transcript,
            response: voice_tx,
        })
        .await;
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "http".to_string(),
            e.to_string(),
        ));
    }

    match voice_rx.await {
        Ok(Ok(purchase)) => (StatusCode::CREATED, Json(json!(purchase))),
        Ok(Err(service_error)) => error_response(service_error),
        Err(e) => error_response(ServiceError::Internal(e.to_string())),
    }
}
