use crate::app::nft_service::NftService;
use crate::app::vault_service::VaultService;
use crate::domain::land::LandTokenRequest;
use crate::infra::solana::Ledger;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Clone)]
pub struct AppState {
    pub nft_service: Arc<NftService>,
    pub vault_service: Arc<VaultService>,
    pub ledger: Arc<dyn Ledger>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNftRequest {
    pub land_data: LandTokenRequest,
}

/// Documents the multipart body of `/api/land/create`; parsed field by field.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LandUploadForm {
    pub name: String,
    pub description: Option<String>,
    pub vegetation_coverage: Option<String>,
    pub hectares: Option<String>,
    pub water_bodies: Option<String>,
    pub springs: Option<String>,
    pub car_registry: Option<String>,
    pub owner_address: String,
    pub symbol: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub image: String,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub mint_address: String,
    pub from_owner: String,
    pub to_owner: String,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitializeVaultRequest {
    /// Defaults to the configured USDC mint.
    #[serde(default)]
    pub usdc_mint: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// USDC base units paid to the seller (before the sale fee).
    pub price: u64,
    pub seller_address: String,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributeRequest {
    /// USDC base units to distribute (before the distribution fee).
    pub amount: u64,
    /// Receiving holder; defaults to the service wallet.
    #[serde(default)]
    pub holder_address: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WalletQuery {
    /// Base58 wallet address.
    pub wallet: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    pub mint: Option<String>,
    pub owner: Option<String>,
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedOwnerQuery {
    pub expected_owner: Option<String>,
}

/// Malformed JSON is 422; well-formed JSON with missing or mistyped fields is 400.
pub fn json_rejection(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    let status = match err {
        JsonRejection::JsonDataError(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid JSON body: {} (expected: {})", err.body_text(), expected)),
        }),
    )
}
