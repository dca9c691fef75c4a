use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::ledger::LedgerRequest;
use super::{RequestHandler, Service, ServiceError};
use crate::models::ledger::{NewPurchase, Purchase};
use crate::repositories::voice::VoiceExtractor;

pub enum VoiceRequest {
    CapturePurchase {
        user_id: String,
        transcript: String,
        response: oneshot::Sender<Result<Purchase, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct VoiceRequestHandler {
    extractor: Arc<dyn VoiceExtractor>,
    ledger_channel: mpsc::Sender<LedgerRequest>,
}

impl VoiceRequestHandler {
    pub fn new(
        extractor: Arc<dyn VoiceExtractor>,
        ledger_channel: mpsc::Sender<LedgerRequest>,
    ) -> Self {
        VoiceRequestHandler {
            extractor,
            ledger_channel,
        }
    }

    async fn capture_purchase(
        &self,
        user_id: String,
        transcript: &str,
    ) -> Result<Purchase, ServiceError> {
        let structured = self
            .extractor
            .extract(transcript)
            .await
            .map_err(|e| ServiceError::Extraction(e.to_string()))?;

        let structured = match structured {
            Some(structured) => structured,
            None => {
                return Err(ServiceError::Extraction(
                    "could not understand the transcript".to_string(),
                ))
            }
        };

        // From here on this is exactly a manual entry, validation included.
        let (ledger_tx, ledger_rx) = oneshot::channel();
        self.ledger_channel
            .send(LedgerRequest::RecordPurchase {
                user_id,
                purchase: NewPurchase {
                    category: structured.category,
                    product: structured.product,
                    date: structured.date,
                    value: structured.value,
                },
                response: ledger_tx,
            })
            .await
            .map_err(|e| {
                ServiceError::Communication("Voice => Ledger".to_string(), e.to_string())
            })?;

        ledger_rx.await.map_err(|e| {
            ServiceError::Communication("Ledger => Voice".to_string(), e.to_string())
        })?
    }
}

#[async_trait]
impl RequestHandler<VoiceRequest> for VoiceRequestHandler {
    async fn handle_request(&self, request: VoiceRequest) {
        match request {
            VoiceRequest::CapturePurchase {
                user_id,
                transcript,
                response,
            } => {
                let result = self.capture_purchase(user_id, &transcript).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct VoiceService;

impl VoiceService {
    pub fn new() -> Self {
        VoiceService {}
    }
}

#[async_trait]
impl Service<VoiceRequest, VoiceRequestHandler> for VoiceService {}
