// Category Tree - Web Server
// REST API over a JSON snapshot

use anyhow::{Context, Result};
use category_tree::api::{router, AppState};
use category_tree::{SourceSnapshot, TreeConfig};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = TreeConfig::from_env()?;
    let snapshot_path = config
        .snapshot_path
        .clone()
        .context("CATEGORY_TREE_SNAPSHOT must point at a snapshot JSON file")?;
    let snapshot = SourceSnapshot::from_file(&snapshot_path)?;
    info!(
        path = ?snapshot_path,
        categories = snapshot.categories.len(),
        transactions = snapshot.transactions.len(),
        vendors = snapshot.vendors.len(),
        "loaded snapshot"
    );

    let addr = config.listen_addr.clone();
    let app = router(AppState::new(snapshot, config)).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "server running");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
