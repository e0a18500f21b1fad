use tracing::info;

use campus_core::tracing::init_tracing;

use campus_registry::config::RegistryConfig;
use campus_registry::infra::backend::StoreBackend;
use campus_registry::router::{build_router, cors_layer};
use campus_registry::state::AppState;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let config = RegistryConfig::from_env();

    let store = StoreBackend::connect(&config)
        .await
        .expect("failed to open document store");
    let state = AppState { store };

    let cors = cors_layer(&config.cors_origin).expect("invalid CORS_ORIGIN");
    let router = build_router(state).layer(cors);

    let http_addr = format!("0.0.0.0:{}", config.registry_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("registry service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
