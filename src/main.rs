use std::net::SocketAddr;

use journal::{init_db, make_router, run_app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("journal=debug")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(8006);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let db = match init_db().await {
        Ok(db) => db,
        Err(error) => {
            tracing::error!("Failed to initialize database: {error:#}");
            std::process::exit(1);
        }
    };

    let router = make_router();
    tracing::info!("Server started on {addr}");
    if let Err(error) = run_app(router, addr, db).await {
        tracing::error!("Server error: {error:#}");
    }
}
