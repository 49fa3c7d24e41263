//! faqdesk - company FAQ knowledge base

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faqdesk::{
    config::Args,
    db::MongoClient,
    server::{self, AppState, Storage},
    store::{
        FaqStore, MemoryFaqStore, MemoryUserStore, MongoFaqStore, MongoUserStore, UserStore,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("faqdesk={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  faqdesk - company FAQ knowledge base");
    info!("======================================");
    info!(
        "Version: {} ({})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown")
    );
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("Session lifetime: {}s", args.jwt_expiry_seconds);
    info!("Admin signup: {}", if args.allow_admin_signup { "allowed" } else { "disabled" });
    info!("======================================");

    let jwt = Arc::new(args.jwt_validator()?);
    if args.dev_mode && args.jwt_secret.is_none() {
        warn!("JWT_SECRET not set - using the built-in development secret");
    }

    // Connect to MongoDB (optional in dev mode)
    let state = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            let faqs: Arc<dyn FaqStore> = Arc::new(MongoFaqStore::new(&client).await?);
            let users: Arc<dyn UserStore> = Arc::new(MongoUserStore::new(&client).await?);
            AppState::new(args, faqs, users, jwt, Storage::Mongo)
        }
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB connection failed (dev mode, using in-memory stores): {}", e);
                let faqs: Arc<dyn FaqStore> = Arc::new(MemoryFaqStore::new());
                let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
                AppState::new(args, faqs, users, jwt, Storage::Memory)
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    server::run(Arc::new(state)).await?;

    Ok(())
}
