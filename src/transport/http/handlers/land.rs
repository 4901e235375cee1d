use crate::app::nft_service::{ListNftsResponse, TransferResponse, VerifyOwnershipResponse};
use crate::domain::land::{LandUpload, UploadedImage};
use crate::transport::http::handlers::common::{bad_request, require_param, service_error, HandlerError};
use crate::transport::http::types::{
    json_rejection, ApiResponse, AppState, ExpectedOwnerQuery, TransferRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::Json;

/// Collects the multipart form into a `LandUpload`; the file part must be named `image`.
async fn read_upload(mut multipart: Multipart) -> Result<LandUpload, HandlerError> {
    let mut upload = LandUpload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("image").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("Failed to read image: {}", e)))?;
            if !bytes.is_empty() {
                upload.image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| bad_request(format!("Failed to read field {}: {}", name, e)))?;
            upload.set_field(&name, value);
        }
    }
    Ok(upload)
}

#[utoipa::path(
    post,
    path = "/api/land/create",
    request_body(content = LandUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Land NFT minted; result under `data`", body = ApiResponse),
        (status = 400, description = "No image uploaded or invalid fields", body = ApiResponse),
        (status = 500, description = "Pinning or chain failure", body = ApiResponse)
    )
)]
pub async fn create_land_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, HandlerError> {
    let upload = read_upload(multipart).await?;
    if upload.image.is_none() {
        return Err(bad_request("No image uploaded"));
    }
    let result = state
        .nft_service
        .create_land_token_from_upload(upload)
        .await
        .map_err(|e| service_error("creating land token from upload", e))?;

    let data = serde_json::to_value(result)
        .map_err(|e| service_error("serializing land token", e.into()))?;
    Ok(Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }))
}

#[utoipa::path(
    get,
    path = "/api/land/verify/{mint_address}",
    params(
        ("mint_address" = String, Path, description = "Mint of the land NFT"),
        ExpectedOwnerQuery
    ),
    responses(
        (status = 200, description = "Ownership check result", body = VerifyOwnershipResponse),
        (status = 400, description = "expectedOwner is required", body = ApiResponse),
        (status = 404, description = "No NFT for this mint", body = ApiResponse)
    )
)]
pub async fn verify_land_handler(
    State(state): State<AppState>,
    Path(mint_address): Path<String>,
    Query(query): Query<ExpectedOwnerQuery>,
) -> Result<Json<VerifyOwnershipResponse>, HandlerError> {
    let expected_owner = require_param(&query.expected_owner, "expectedOwner is required")?;
    state
        .nft_service
        .verify_token_ownership(&mint_address, expected_owner)
        .await
        .map(Json)
        .map_err(|e| service_error("verifying token ownership", e))
}

#[utoipa::path(
    post,
    path = "/api/land/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "NFT transferred", body = TransferResponse),
        (status = 403, description = "Service wallet cannot sign for the sender", body = ApiResponse),
        (status = 409, description = "Current owner does not match the sender address", body = ApiResponse)
    )
)]
pub async fn transfer_land_handler(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, HandlerError> {
    let Json(request) = payload.map_err(|e| json_rejection(e, "{ mintAddress, fromOwner, toOwner }"))?;
    state
        .nft_service
        .transfer_token(&request.mint_address, &request.from_owner, &request.to_owner)
        .await
        .map(Json)
        .map_err(|e| service_error("transferring token", e))
}

#[utoipa::path(
    get,
    path = "/api/land/user/{address}",
    params(("address" = String, Path, description = "Owner wallet")),
    responses(
        (status = 200, description = "Land NFTs held by the wallet", body = ListNftsResponse),
        (status = 400, description = "Invalid address", body = ApiResponse),
        (status = 500, description = "RPC failure", body = ApiResponse)
    )
)]
pub async fn user_lands_handler(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ListNftsResponse>, HandlerError> {
    state
        .nft_service
        .list_user_nfts(&address)
        .await
        .map(Json)
        .map_err(|e| service_error("listing user NFTs", e))
}
