use std::sync::Arc;

use ak_in_web::config::ServerConfig;
use ak_in_web::server::{build_router, AppState};
use ak_in_web::storage::{BookStorage, FilmStorage};
use ak_in_web::user_storage::UserStorage;
use anyhow::Context;
use tokio::time::{interval, Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ak_in_web=debug,tower_http=debug")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    std::fs::create_dir_all(&config.data_dir)
        .context("Failed to create data directory")?;

    let books = Arc::new(BookStorage::new(&config.data_dir).context("Failed to initialize book storage")?);
    let films = Arc::new(FilmStorage::new(&config.data_dir).context("Failed to initialize film storage")?);
    let users = Arc::new(
        UserStorage::new(&config.data_dir, config.token_ttl()).context("Failed to initialize user storage")?,
    );

    if users.list_users().await.is_empty() {
        tracing::warn!("No accounts yet. Create one with: admin create -u <username> -p <password>");
    }

    let purge_users = users.clone();
    tokio::spawn(async move {
        token_purge_service(purge_users).await;
    });

    let app = build_router(AppState { books, films, users }, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.http_addr))?;

    info!("🚀 AK_In_Web running on http://{}", config.http_addr);
    info!("   POST   /api/auth/login   - Log in, returns a bearer token");
    info!("   GET    /api/books        - List books");
    info!("   POST   /api/books        - Add a book (admin)");
    info!("   PUT    /api/books/:id    - Update a book (admin)");
    info!("   DELETE /api/books/:id    - Delete a book (admin)");
    info!("   GET    /api/films        - List films");
    info!("   POST   /api/films        - Add a film (admin)");
    info!("   DELETE /api/films/:id    - Delete a film (admin)");
    info!("   GET    /                 - Static listings page");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

async fn token_purge_service(users: Arc<UserStorage>) {
    let mut interval = interval(Duration::from_secs(600));

    loop {
        interval.tick().await;

        let purged = users.purge_expired_tokens().await;
        if purged > 0 {
            info!(purged, "Dropped expired tokens");
        }
    }
}
