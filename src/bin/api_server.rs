// src/bin/api_server.rs

use evergreen_registry::infra::config::{self, Settings};
use evergreen_registry::solana::{Ledger, RpcLedger};
use evergreen_registry::transport;
use evergreen_registry::{NftService, PinataClient, VaultService};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // --- Configuration ---
    println!("> Loading configuration...");
    let settings = Settings::from_env()?;
    println!("> Config: {}", settings.describe());
    if settings.pinata_api_key.is_empty() || settings.pinata_secret_api_key.is_empty() {
        eprintln!("> Warning: Pinata credentials missing; pinning requests will be rejected upstream.");
    }

    // --- Ledger Initialization ---
    let wallet = config::load_wallet()?;
    let ledger: Arc<dyn Ledger> = Arc::new(RpcLedger::new(settings.solana_rpc_url.clone(), wallet));
    println!("> Service wallet: {}", ledger.authority());
    match ledger.cluster_version().await {
        Ok(version) => println!("> Connected to Solana RPC (solana-core {})", version),
        Err(e) => eprintln!("> Warning: Solana RPC unreachable at startup: {}", e),
    }

    // --- Service Initialization ---
    println!("> Initializing services...");
    tokio::fs::create_dir_all(&settings.uploads_dir).await?;
    let pinata = PinataClient::new(&settings);
    let nft_service = NftService::new(ledger.clone(), pinata, &settings);
    let vault_service = VaultService::new(ledger.clone(), settings.program_id, settings.usdc_mint);
    println!("> Vault PDA: {}", vault_service.vault_address());

    let app_state = transport::http::AppState {
        nft_service: Arc::new(nft_service),
        vault_service: Arc::new(vault_service),
        ledger,
    };

    // --- API Server Initialization ---
    println!("> Starting API server...");
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state, settings.max_upload_bytes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let addr = format!("0.0.0.0:{}", settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("> API server listening on http://{}", addr);
    println!("> Swagger UI available at http://localhost:{}/swagger-ui", settings.port);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n> Shutdown signal received (Ctrl+C).");
        }
    }

    Ok(())
}
