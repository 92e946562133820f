use anyhow::{Context, Result};
use chat_lang::config::Config;
use chat_lang::db::Database;
use chat_lang::handlers::CommandHandler;
use chat_lang::i18n::{Catalog, LanguageRegistry, Resolver};
use chat_lang::middleware::LanguageLayer;
use chat_lang::server::{self, AppState};
use chat_lang::telegram::TelegramClient;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_lang=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    // A broken locale file must stop startup
    let catalog = Catalog::load(&config.locales_dir)
        .with_context(|| format!("Failed to load languages from {}", config.locales_dir.display()))?;
    report_catalog_mismatch(&catalog);

    if !catalog.contains(config.default_language.as_str()) {
        warn!(
            "Default language '{}' has no loaded pack; unassigned chats will fail to resolve",
            config.default_language
        );
    }

    let db = Database::new(&config.database_url, config.default_language.clone()).await?;
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram_api_base,
        &config.telegram_bot_token,
    ));

    let resolver = Resolver::new(Arc::new(catalog), Arc::new(db));
    let layer = Arc::new(LanguageLayer::new(resolver, Arc::clone(&telegram)));
    let bot = layer.wrap(CommandHandler::new(telegram, config.locales_dir.clone()));

    let app = server::router(AppState {
        bot,
        webhook_secret: config.webhook_secret.clone(),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// The registry and the catalog are allowed to differ; log where they do.
fn report_catalog_mismatch(catalog: &Catalog) {
    let registry = LanguageRegistry::get();

    for code in catalog.codes() {
        if !registry.is_known(code.as_str()) {
            warn!("Loaded pack '{}' is not in the language registry", code);
        }
    }

    for entry in registry.list_all() {
        if !catalog.contains(entry.code) {
            info!("No pack loaded for {} ({})", entry.name, entry.code);
        }
    }
}
