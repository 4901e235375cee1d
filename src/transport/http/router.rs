use crate::app::nft_service::{
    CreateLandTokenResponse, LandTokenSummary, ListNftsResponse, TokenDetails, TransferResponse,
    VerifyOwnershipResponse,
};
use crate::app::vault_service::{
    DepositRequest, DepositResponse, DistributeResponse, EvgSBalanceResponse, LandTokenValue,
    LandTokensResponse, PurchaseResponse, TxResponse, VaultStatsResponse,
};
use crate::domain::land::metadata::{LandAttribute, LandData, LandMetadata, MetadataFile, MetadataProperties};
use crate::domain::land::{EnvironmentalMetadata, LandTokenRequest};
use crate::domain::vault::FeeSchedule;
use crate::transport::http::handlers::{health, land, nft, vault};
use crate::transport::http::types::{
    ApiResponse, AppState, CreateNftRequest, DistributeRequest, InitializeVaultRequest,
    LandUploadForm, PurchaseRequest, TransferRequest,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root_handler,
        health::healthcheck_handler,
        land::create_land_handler,
        land::verify_land_handler,
        land::transfer_land_handler,
        land::user_lands_handler,
        nft::create_nft_handler,
        nft::list_nfts_handler,
        nft::verify_nft_handler,
        vault::initialize_vault_handler,
        vault::deposit_handler,
        vault::purchase_handler,
        vault::distribute_handler,
        vault::stats_handler,
        vault::evg_s_balance_handler,
        vault::land_tokens_handler
    ),
    components(schemas(
        ApiResponse,
        CreateNftRequest,
        LandTokenRequest,
        EnvironmentalMetadata,
        LandUploadForm,
        TransferRequest,
        CreateLandTokenResponse,
        TokenDetails,
        VerifyOwnershipResponse,
        TransferResponse,
        LandTokenSummary,
        ListNftsResponse,
        LandMetadata,
        LandAttribute,
        MetadataFile,
        MetadataProperties,
        LandData,
        InitializeVaultRequest,
        DepositRequest,
        PurchaseRequest,
        DistributeRequest,
        TxResponse,
        DepositResponse,
        PurchaseResponse,
        DistributeResponse,
        FeeSchedule,
        LandTokenValue,
        VaultStatsResponse,
        EvgSBalanceResponse,
        LandTokensResponse
    )),
    tags((name = "evergreen-registry", description = "Land NFT registry and EVG vault gateway"))
)]
pub struct ApiDoc;

/// Builds the API router. `max_upload_bytes` caps the multipart body of `/api/land/create`.
pub fn create_router(app_state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/land/create",
            post(land::create_land_handler).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/land/verify/:mint_address", get(land::verify_land_handler))
        .route("/api/land/transfer", post(land::transfer_land_handler))
        .route("/api/land/user/:address", get(land::user_lands_handler))
        .route("/api/nft/create", post(nft::create_nft_handler))
        .route("/api/nft/list", get(nft::list_nfts_handler))
        .route("/api/nft/verify", get(nft::verify_nft_handler))
        .route("/api/vault/initialize", post(vault::initialize_vault_handler))
        .route("/api/vault/deposit", post(vault::deposit_handler))
        .route("/api/vault/purchase", post(vault::purchase_handler))
        .route("/api/vault/distribute", post(vault::distribute_handler))
        .route("/api/vault/stats", get(vault::stats_handler))
        .route("/api/vault/evg-s-balance", get(vault::evg_s_balance_handler))
        .route("/api/vault/land-tokens", get(vault::land_tokens_handler))
        .with_state(app_state)
}
