use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use sqlx::postgres::PgPoolOptions;

mod gauge;
mod models;
mod repositories;
pub mod services;
pub mod settings;

use repositories::memory::MemoryStore;
use repositories::voice::GeminiExtractor;
use services::Stores;

#[derive(Debug, Parser)]
#[command(name = "cmv-server", about = "Restaurant cost-control backend")]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,
    /// Run against a process-local store instead of Postgres.
    #[arg(long)]
    in_memory: bool,
}

fn init_logging() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .expect("Could not build logging config.");

    log4rs::init_config(config).expect("Could not initialize logging.");
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_logging();

    let args = Args::parse();
    let config = settings::Settings::new(&args.config).expect("Could not load config file.");

    let stores = if args.in_memory {
        log::info!("Running with the in-memory store; data will not survive a restart.");
        let store = Arc::new(MemoryStore::new());

        Stores {
            users: store.clone(),
            ledger: store.clone(),
            goals: store,
        }
    } else {
        let conn = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.postgres.url)
            .await
            .expect("Could not connect to database.");

        sqlx::migrate!()
            .run(&conn)
            .await
            .expect("Could not run migrations.");

        Stores {
            users: Arc::new(repositories::users::UserRepository::new(conn.clone())),
            ledger: Arc::new(repositories::ledger::LedgerRepository::new(conn.clone())),
            goals: Arc::new(repositories::goals::GoalsRepository::new(conn)),
        }
    };

    let extractor = Arc::new(GeminiExtractor::new(
        config.voice.url.clone(),
        config.voice.api_key.clone(),
        config.voice.model.clone(),
    ));

    println!("[*] Starting services.");
    services::start_services(stores, extractor, config)
        .await
        .expect("Could not start services.");
}
