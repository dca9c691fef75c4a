use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::repositories::voice::VoiceExtractor;
use crate::repositories::{GoalsStore, LedgerStore, UserStore};
use crate::settings::Settings;

pub mod http;
pub mod ledger;
pub mod reports;
pub mod users;
pub mod voice;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid credentials")]
    Auth,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("communication error: {0} - {1}")]
    Communication(String, String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub ledger: Arc<dyn LedgerStore>,
    pub goals: Arc<dyn GoalsStore>,
}

pub async fn start_services(
    stores: Stores,
    extractor: Arc<dyn VoiceExtractor>,
    settings: Settings,
) -> Result<(), anyhow::Error> {
    let (user_tx, mut user_rx) = mpsc::channel(512);
    let (ledger_tx, mut ledger_rx) = mpsc::channel(512);
    let (voice_tx, mut voice_rx) = mpsc::channel(512);

    let mut user_service = users::UserService::new();
    let mut ledger_service = ledger::LedgerService::new();
    let mut voice_service = voice::VoiceService::new();

    users::ensure_seed_admin(stores.users.as_ref(), &settings.seed_admin).await?;

    println!("[*] Starting user service.");
    let user_store = stores.users.clone();
    tokio::spawn(async move {
        user_service
            .run(users::UserRequestHandler::new(user_store), &mut user_rx)
            .await;
    });

    println!("[*] Starting ledger service.");
    let ledger_handler = ledger::LedgerRequestHandler::new(
        stores.ledger.clone(),
        stores.goals.clone(),
        stores.users.clone(),
    );
    tokio::spawn(async move {
        ledger_service.run(ledger_handler, &mut ledger_rx).await;
    });

    log::info!("Starting voice service.");
    let voice_ledger_tx = ledger_tx.clone();
    tokio::spawn(async move {
        voice_service
            .run(
                voice::VoiceRequestHandler::new(extractor, voice_ledger_tx),
                &mut voice_rx,
            )
            .await;
    });

    println!("[*] Starting HTTP server.");
    http::start_http_server(&settings.server.bind, user_tx, ledger_tx, voice_tx).await?;

    Ok(())
}
