use crate::app::nft_service::{CreateLandTokenResponse, ListNftsResponse, VerifyOwnershipResponse};
use crate::transport::http::handlers::common::{require_param, service_error, HandlerError};
use crate::transport::http::types::{
    json_rejection, AppState, CreateNftRequest, VerifyQuery, WalletQuery,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/nft/create",
    request_body = CreateNftRequest,
    responses(
        (status = 200, description = "Land NFT minted and transferred", body = CreateLandTokenResponse),
        (status = 400, description = "Invalid land data", body = ApiResponse),
        (status = 422, description = "Body is not valid JSON", body = ApiResponse),
        (status = 500, description = "Pinning or chain failure", body = ApiResponse)
    )
)]
pub async fn create_nft_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateNftRequest>, JsonRejection>,
) -> Result<Json<CreateLandTokenResponse>, HandlerError> {
    let Json(request) = payload.map_err(|e| json_rejection(e, "{ landData: { ownerAddress, propertyName, ... } }"))?;
    state
        .nft_service
        .create_land_token(request.land_data)
        .await
        .map(Json)
        .map_err(|e| service_error("creating land token", e))
}

#[utoipa::path(
    get,
    path = "/api/nft/list",
    params(WalletQuery),
    responses(
        (status = 200, description = "NFTs held by the wallet", body = ListNftsResponse),
        (status = 400, description = "Wallet address is required", body = ApiResponse),
        (status = 500, description = "RPC failure", body = ApiResponse)
    )
)]
pub async fn list_nfts_handler(
    State(state): State<AppState>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<ListNftsResponse>, HandlerError> {
    let wallet = require_param(&query.wallet, "Wallet address is required")?;
    state
        .nft_service
        .list_user_nfts(wallet)
        .await
        .map(Json)
        .map_err(|e| service_error("listing user NFTs", e))
}

#[utoipa::path(
    get,
    path = "/api/nft/verify",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Ownership check result", body = VerifyOwnershipResponse),
        (status = 400, description = "Mint address and owner address are required", body = ApiResponse),
        (status = 404, description = "No NFT for this mint", body = ApiResponse)
    )
)]
pub async fn verify_nft_handler(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerifyOwnershipResponse>, HandlerError> {
    const MISSING: &str = "Mint address and owner address are required";
    let mint = require_param(&query.mint, MISSING)?;
    let owner = require_param(&query.owner, MISSING)?;
    state
        .nft_service
        .verify_token_ownership(mint, owner)
        .await
        .map(Json)
        .map_err(|e| service_error("verifying token ownership", e))
}
