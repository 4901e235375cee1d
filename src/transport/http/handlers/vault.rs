use crate::app::vault_service::{
    DepositRequest, DepositResponse, DistributeResponse, EvgSBalanceResponse, LandTokensResponse,
    PurchaseResponse, TxResponse, VaultStatsResponse,
};
use crate::transport::http::handlers::common::{require_param, service_error, HandlerError};
use crate::transport::http::types::{
    json_rejection, AppState, DistributeRequest, InitializeVaultRequest, PurchaseRequest,
    WalletQuery,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/vault/initialize",
    request_body = InitializeVaultRequest,
    responses(
        (status = 200, description = "Vault initialized", body = TxResponse),
        (status = 409, description = "Vault already initialized", body = ApiResponse),
        (status = 500, description = "Chain failure", body = ApiResponse)
    )
)]
pub async fn initialize_vault_handler(
    State(state): State<AppState>,
    payload: Result<Json<InitializeVaultRequest>, JsonRejection>,
) -> Result<Json<TxResponse>, HandlerError> {
    // An empty body means "use the configured mint".
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => InitializeVaultRequest::default(),
        Err(e) => return Err(json_rejection(e, "{ usdcMint? }")),
    };
    state
        .vault_service
        .initialize_vault(request.usdc_mint.as_deref())
        .await
        .map(Json)
        .map_err(|e| service_error("initializing vault", e))
}

#[utoipa::path(
    post,
    path = "/api/vault/deposit",
    request_body = DepositRequest,
    responses(
        (status = 200, description = "Deposit submitted", body = DepositResponse),
        (status = 400, description = "Missing amount or malformed transaction", body = ApiResponse),
        (status = 403, description = "Wallet is not the service wallet", body = ApiResponse),
        (status = 404, description = "Vault not initialized", body = ApiResponse)
    )
)]
pub async fn deposit_handler(
    State(state): State<AppState>,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<DepositResponse>, HandlerError> {
    let Json(request) =
        payload.map_err(|e| json_rejection(e, "{ amount, wallet? } or { signedTransaction }"))?;
    state
        .vault_service
        .deposit_usdc(request)
        .await
        .map(Json)
        .map_err(|e| service_error("depositing USDC", e))
}

#[utoipa::path(
    post,
    path = "/api/vault/purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "EVG-L purchased", body = PurchaseResponse),
        (status = 400, description = "Invalid price or seller", body = ApiResponse),
        (status = 409, description = "Vault USDC below price", body = ApiResponse)
    )
)]
pub async fn purchase_handler(
    State(state): State<AppState>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<Json<PurchaseResponse>, HandlerError> {
    let Json(request) = payload.map_err(|e| json_rejection(e, "{ price, sellerAddress }"))?;
    state
        .vault_service
        .purchase_evg_l(request.price, &request.seller_address)
        .await
        .map(Json)
        .map_err(|e| service_error("purchasing EVG-L", e))
}

#[utoipa::path(
    post,
    path = "/api/vault/distribute",
    request_body = DistributeRequest,
    responses(
        (status = 200, description = "Earnings distributed", body = DistributeResponse),
        (status = 400, description = "Invalid amount or holder", body = ApiResponse),
        (status = 409, description = "No EVG-S in circulation", body = ApiResponse)
    )
)]
pub async fn distribute_handler(
    State(state): State<AppState>,
    payload: Result<Json<DistributeRequest>, JsonRejection>,
) -> Result<Json<DistributeResponse>, HandlerError> {
    let Json(request) = payload.map_err(|e| json_rejection(e, "{ amount, holderAddress? }"))?;
    state
        .vault_service
        .distribute_earnings(request.amount, request.holder_address.as_deref())
        .await
        .map(Json)
        .map_err(|e| service_error("distributing earnings", e))
}

#[utoipa::path(
    get,
    path = "/api/vault/stats",
    params(WalletQuery),
    responses(
        (status = 200, description = "Vault totals, fee schedule and land token values", body = VaultStatsResponse),
        (status = 404, description = "Vault not initialized", body = ApiResponse)
    )
)]
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<VaultStatsResponse>, HandlerError> {
    state
        .vault_service
        .stats(query.wallet.as_deref())
        .await
        .map(Json)
        .map_err(|e| service_error("loading vault stats", e))
}

#[utoipa::path(
    get,
    path = "/api/vault/evg-s-balance",
    params(WalletQuery),
    responses(
        (status = 200, description = "EVG-S balance of the wallet", body = EvgSBalanceResponse),
        (status = 400, description = "Wallet address is required", body = ApiResponse)
    )
)]
pub async fn evg_s_balance_handler(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<EvgSBalanceResponse>, HandlerError> {
    let wallet = require_param(&query.wallet, "Wallet address is required")?;
    state
        .vault_service
        .evg_s_balance(wallet)
        .await
        .map(Json)
        .map_err(|e| service_error("loading EVG-S balance", e))
}

#[utoipa::path(
    get,
    path = "/api/vault/land-tokens",
    params(WalletQuery),
    responses(
        (status = 200, description = "Land tokens with notional values", body = LandTokensResponse),
        (status = 400, description = "Invalid wallet", body = ApiResponse)
    )
)]
pub async fn land_tokens_handler(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<LandTokensResponse>, HandlerError> {
    state
        .vault_service
        .land_tokens(query.wallet.as_deref())
        .await
        .map(Json)
        .map_err(|e| service_error("listing land tokens", e))
}
