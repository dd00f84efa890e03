use std::{borrow::Cow, error::Error, sync::Arc};

use dotenvy::dotenv;
use kitobxonbot::{
    config::Config,
    database::{connection::Connection, json_store::JsonStore, repository::Storage},
    schema::schema,
    state::BotState,
};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::webhooks::{self, Options},
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from_level(log_level))
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;

    let config = Config::from_env()?;

    match config.database_url.clone() {
        Some(url) => {
            let connection = Connection::connect(Cow::Owned(url)).await?;
            connection.migrate().await?;
            log::info!("Using PostgreSQL storage");
            run(config, connection).await
        }
        None => {
            let store = JsonStore::open(config.data_dir.clone()).await?;
            log::info!("Using JSON storage in {}", store.dir().display());
            run(config, store).await
        }
    }
}

async fn run<S: Storage>(config: Config, storage: S) -> Result<(), Box<dyn Error + Send + Sync>> {
    if storage.ensure_super_admin(config.super_admin_id).await? {
        log::info!("Registered super admin {}", config.super_admin_id);
    }

    let bot = Bot::new(config.bot_token.clone());
    log::info!("Starting bot...");

    let webhook = config.webhook.clone();
    let mut dispatcher = Dispatcher::builder(bot.clone(), schema::<S>())
        .dependencies(dptree::deps![
            InMemStorage::<BotState>::new(),
            Arc::new(storage),
            Arc::new(config)
        ])
        .enable_ctrlc_handler()
        .build();

    match webhook {
        Some(webhook) => {
            let listener = webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => dispatcher.dispatch().await,
    }

    Ok(())
}
