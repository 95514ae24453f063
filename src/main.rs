use recipe_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    credentials::Credentials,
    models::NewUser,
    repository::{PostgresRepository, RepositoryState},
    storage::{LocalDiskStorage, StorageService, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, connects to Postgres and applies the
/// migrations, prepares the upload directory, then serves HTTP.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate and request summaries from tower-http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recipe_portal=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres) and schema migrations
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.storage_uri)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to apply database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Upload Storage Initialization
    let disk = LocalDiskStorage::new(config.upload_dir.clone());
    disk.ensure_ready()
        .await
        .expect("FATAL: Upload directory could not be created. Check UPLOAD_DIR.");
    tracing::info!(dir = %disk.root().display(), "upload directory ready");
    let storage = Arc::new(disk) as StorageState;

    let credentials = Credentials::default();

    // 6. Bootstrap admin account (optional)
    if let Some((username, password)) = config.bootstrap_admin.clone() {
        bootstrap_admin(&repo, &credentials, username, password).await;
    }

    // 7. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        storage,
        credentials,
        config,
    };

    // 8. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server stopped: {:?}", e);
    }
}

/// Creates the configured admin account unless the username already exists.
/// Failures are logged; the server starts either way.
async fn bootstrap_admin(
    repo: &RepositoryState,
    credentials: &Credentials,
    username: String,
    password: String,
) {
    match repo.find_user_by_username(&username).await {
        Ok(Some(_)) => {
            tracing::debug!(username = %username, "bootstrap admin already exists");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("bootstrap admin lookup failed: {:?}", e);
            return;
        }
    }

    let password_hash = match credentials.hash(password).await {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("bootstrap admin password could not be hashed: {:?}", e);
            return;
        }
    };

    match repo
        .create_user(NewUser {
            username: username.clone(),
            password_hash,
            is_admin: true,
        })
        .await
    {
        Ok(user) => tracing::info!(user_id = user.id, username = %username, "bootstrap admin created"),
        Err(e) => tracing::error!("bootstrap admin could not be created: {:?}", e),
    }
}
