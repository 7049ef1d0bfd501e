use std::net::SocketAddr;
use std::sync::Arc;

use stockfish_bridge_core::{EngineBridge, EngineConfig};

mod routes;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;

pub struct AppState {
    pub bridge: EngineBridge,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt::init();

    let config = EngineConfig::from_env().expect("Invalid engine configuration");
    tracing::info!(
        "Engine: {} (timeout {:?}, default depth {})",
        config.path.display(),
        config.timeout,
        config.default_depth
    );

    let state = Arc::new(AppState {
        bridge: EngineBridge::new(config),
    });

    let app = routes::router(state);

    let addr = bind_addr(|key| std::env::var(key).ok()).expect("Invalid server address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Stockfish server running at http://{}", addr);

    axum::serve(listener, app).await.unwrap();
}

/// Reads `HOST` and `PORT`, failing on values that do not parse
fn bind_addr<F>(lookup: F) -> Result<SocketAddr, String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = match lookup("PORT") {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("PORT={:?}: {}", raw, e))?,
        None => DEFAULT_PORT,
    };
    format!("{}:{}", host.trim(), port)
        .parse()
        .map_err(|e| format!("HOST={:?}: {}", host, e))
}
