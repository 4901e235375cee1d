//! Land NFT lifecycle: shape metadata, pin it, mint through Metaplex, hand over to the owner.

use crate::app::ipfs_service::PinataClient;
use crate::app::{parse_address, ServiceError};
use crate::crypto::hashing::commitment_hash;
use crate::domain::land::{LandData, LandMetadata, LandTokenRequest, LandUpload};
use crate::infra::config::Settings;
use crate::infra::solana::nft_program::{mint_nft_instructions, transfer_nft_instructions, OnChainMetadata};
use crate::infra::solana::{Ledger, NftRecord};
use serde::Serialize;
use solana_program::{program_pack::Pack, pubkey::Pubkey};
use sha2::{Digest, Sha256};
use solana_sdk::signer::{keypair::Keypair, Signer};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use utoipa::ToSchema;

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLandTokenResponse {
    pub success: bool,
    pub mint_address: String,
    pub metadata_uri: String,
    pub owner: String,
    /// Signature of the transfer to the owner (equal to `mint_signature` when the
    /// service wallet is the owner).
    pub signature: String,
    pub mint_signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    pub name: String,
    pub symbol: String,
    pub mint_address: String,
    pub update_authority: String,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOwnershipResponse {
    pub is_valid: bool,
    pub current_owner: Option<String>,
    pub expected_owner: String,
    pub token_details: TokenDetails,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub signature: String,
    pub new_owner: String,
    pub mint_address: String,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandTokenSummary {
    pub name: String,
    pub symbol: String,
    pub mint_address: String,
    pub update_authority: String,
    pub uri: String,
    pub land_data: Option<LandData>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListNftsResponse {
    pub success: bool,
    pub total: usize,
    pub tokens: Vec<LandTokenSummary>,
}

/// Metaplex records of every NFT (single unit, zero decimals) held by `owner`.
pub async fn owned_nft_records(ledger: &dyn Ledger, owner: &Pubkey) -> anyhow::Result<Vec<NftRecord>> {
    let holdings = ledger.token_holdings(owner).await?;
    let mut records = Vec::new();
    for holding in holdings.into_iter().filter(|h| h.is_nft()) {
        if let Some(record) = ledger.nft_record(&holding.mint).await? {
            records.push(record);
        }
    }
    Ok(records)
}

pub struct NftService {
    ledger: Arc<dyn Ledger>,
    pinata: PinataClient,
    default_image: String,
    uploads_dir: PathBuf,
}

impl NftService {
    pub fn new(ledger: Arc<dyn Ledger>, pinata: PinataClient, settings: &Settings) -> Self {
        Self {
            ledger,
            pinata,
            default_image: settings.default_image.clone(),
            uploads_dir: settings.uploads_dir.clone(),
        }
    }

    /// Mints a land NFT from a JSON registration and transfers it to `ownerAddress`.
    pub async fn create_land_token(&self, request: LandTokenRequest) -> anyhow::Result<CreateLandTokenResponse> {
        let owner = match request.owner_address.as_deref() {
            Some(address) if !address.trim().is_empty() => parse_address("ownerAddress", address)?,
            _ => return Err(ServiceError::InvalidInput("Owner address is required".to_string()).into()),
        };
        if request.property_name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Property name is required".to_string()).into());
        }
        precheck_metadata(&request.property_name, request.symbol())?;

        let geo_json = request.geo_json_document().map_err(ServiceError::InvalidInput)?;
        let commitment = match request.commitment_hash.as_deref() {
            Some(hash) if !hash.trim().is_empty() => hash.to_string(),
            _ => commitment_hash(&serde_json::to_value(&request)?),
        };

        let geo_json_uri = match geo_json {
            Some(doc) => Some(self.pinata.pin_json(&doc).await?.ipfs_uri()),
            None => None,
        };
        let image = request
            .image
            .clone()
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| self.default_image.clone());

        let metadata = LandMetadata::from_request(&request, &image, geo_json_uri.as_deref(), &commitment);
        let metadata_uri = self.pinata.pin_json(&serde_json::to_value(&metadata)?).await?.ipfs_uri();
        println!("> NftService: Creating NFT with metadata: {}", metadata_uri);

        self.mint_and_deliver(&metadata, metadata_uri, owner).await
    }

    /// Multipart variant: the image is stored locally, pinned, and referenced by gateway URL.
    pub async fn create_land_token_from_upload(&self, upload: LandUpload) -> anyhow::Result<CreateLandTokenResponse> {
        let Some(image) = upload.image.clone() else {
            return Err(ServiceError::InvalidInput("No image uploaded".to_string()).into());
        };
        let owner = parse_address("ownerAddress", upload.owner_address.as_deref().unwrap_or_default())?;
        if upload.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Property name is required".to_string()).into());
        }
        precheck_metadata(&upload.name, upload.symbol())?;

        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        let stored_name = stored_upload_name(chrono::Utc::now().timestamp_millis(), &image.bytes, &image.extension());
        let image_path = self.uploads_dir.join(&stored_name);
        tokio::fs::write(&image_path, &image.bytes).await?;
        println!("> NftService: Stored upload at {}", image_path.display());

        let pinned = self
            .pinata
            .pin_file(image.bytes, &image.file_name, &image.content_type)
            .await?;
        let image_uri = self.pinata.gateway_url_for(&pinned.ipfs_hash);

        let metadata = LandMetadata::from_upload(&upload, &image_uri, &image.content_type);
        let metadata_uri = self.pinata.pin_json(&serde_json::to_value(&metadata)?).await?.ipfs_uri();
        println!("> NftService: Creating NFT with metadata: {}", metadata_uri);

        let mut response = self.mint_and_deliver(&metadata, metadata_uri, owner).await?;
        response.image_uri = Some(image_uri);
        response.image_path = Some(image_path.display().to_string());
        Ok(response)
    }

    async fn mint_and_deliver(
        &self,
        metadata: &LandMetadata,
        metadata_uri: String,
        owner: Pubkey,
    ) -> anyhow::Result<CreateLandTokenResponse> {
        let on_chain = OnChainMetadata {
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            uri: metadata_uri.clone(),
        };
        on_chain.validate().map_err(ServiceError::InvalidInput)?;

        let authority = self.ledger.authority();
        let mint = Keypair::new();
        let mint_address = mint.pubkey();
        let rent = self
            .ledger
            .rent_exempt_minimum(spl_token::state::Mint::LEN)
            .await?;

        let instructions = mint_nft_instructions(&authority, &mint_address, rent, &on_chain)?;
        let mint_signature = self.ledger.submit(instructions, vec![mint]).await?;
        println!("> NftService: NFT created: {}", mint_address);

        let signature = if owner == authority {
            mint_signature
        } else {
            println!("> NftService: Transferring NFT to owner: {}", owner);
            let instructions = transfer_nft_instructions(&authority, &authority, &owner, &mint_address)?;
            self.ledger.submit(instructions, Vec::new()).await?
        };
        println!("> NftService: Transfer completed: {}", signature);

        Ok(CreateLandTokenResponse {
            success: true,
            mint_address: mint_address.to_string(),
            metadata_uri,
            owner: owner.to_string(),
            signature: signature.to_string(),
            mint_signature: mint_signature.to_string(),
            image_uri: None,
            image_path: None,
        })
    }

    async fn find_by_mint(&self, mint: &Pubkey) -> anyhow::Result<NftRecord> {
        self.ledger
            .nft_record(mint)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No NFT metadata found for mint {}", mint)).into())
    }

    pub async fn verify_token_ownership(
        &self,
        mint_address: &str,
        expected_owner: &str,
    ) -> anyhow::Result<VerifyOwnershipResponse> {
        let mint = parse_address("mintAddress", mint_address)?;
        let record = self.find_by_mint(&mint).await?;
        let current_owner = self.ledger.nft_owner(&mint).await?.map(|o| o.to_string());

        let is_owner_valid = current_owner.as_deref() == Some(expected_owner.trim());
        let is_token_valid = !record.burned;

        Ok(VerifyOwnershipResponse {
            is_valid: is_owner_valid && is_token_valid,
            current_owner,
            expected_owner: expected_owner.trim().to_string(),
            token_details: TokenDetails {
                name: record.name,
                symbol: record.symbol,
                mint_address: mint.to_string(),
                update_authority: record.update_authority.to_string(),
            },
        })
    }

    /// Transfers a land NFT. Only tokens held by the service wallet can be moved here.
    pub async fn transfer_token(
        &self,
        mint_address: &str,
        from_owner: &str,
        to_owner: &str,
    ) -> anyhow::Result<TransferResponse> {
        let mint = parse_address("mintAddress", mint_address)?;
        let from = parse_address("fromOwner", from_owner)?;
        let to = parse_address("toOwner", to_owner)?;

        self.find_by_mint(&mint).await?;
        if self.ledger.nft_owner(&mint).await? != Some(from) {
            return Err(
                ServiceError::Conflict("Current owner does not match the sender address".to_string()).into(),
            );
        }

        let authority = self.ledger.authority();
        if from != authority {
            return Err(ServiceError::Forbidden(format!(
                "Service wallet {} cannot sign for owner {}",
                authority, from
            ))
            .into());
        }

        let instructions = transfer_nft_instructions(&authority, &from, &to, &mint)?;
        let signature = self.ledger.submit(instructions, Vec::new()).await?;
        println!("> NftService: Transferred {} from {} to {}", mint, from, to);

        Ok(TransferResponse {
            success: true,
            signature: signature.to_string(),
            new_owner: to.to_string(),
            mint_address: mint.to_string(),
        })
    }

    pub async fn list_user_nfts(&self, user_address: &str) -> anyhow::Result<ListNftsResponse> {
        let owner = parse_address("wallet", user_address)?;
        println!("> NftService: Listing NFTs for address: {}", owner);

        let records = owned_nft_records(self.ledger.as_ref(), &owner).await?;
        println!("> NftService: Found NFTs: {}", records.len());

        // Gateway reads run concurrently; results are put back in listing order.
        let mut fetches = JoinSet::new();
        for (index, record) in records.iter().enumerate() {
            let pinata = self.pinata.clone();
            let uri = record.uri.clone();
            fetches.spawn(async move { (index, pinata.fetch_json(&uri).await) });
        }
        let mut documents = vec![None; records.len()];
        while let Some(joined) = fetches.join_next().await {
            let (index, document) = joined?;
            documents[index] = document;
        }

        let tokens: Vec<LandTokenSummary> = records
            .into_iter()
            .zip(documents)
            .map(|(record, document)| LandTokenSummary {
                name: record.name,
                symbol: record.symbol,
                mint_address: record.mint.to_string(),
                update_authority: record.update_authority.to_string(),
                uri: record.uri,
                land_data: document.as_ref().map(LandData::from_document),
            })
            .collect();

        Ok(ListNftsResponse {
            success: true,
            total: tokens.len(),
            tokens,
        })
    }
}

/// Rejects names and symbols Metaplex would refuse, before anything is pinned.
fn precheck_metadata(name: &str, symbol: &str) -> anyhow::Result<()> {
    OnChainMetadata {
        name: name.to_string(),
        symbol: symbol.to_string(),
        uri: String::new(),
    }
    .validate()
    .map_err(|e| ServiceError::InvalidInput(e).into())
}

/// `<millis>-<content digest prefix><ext>`; distinct images never share a name.
fn stored_upload_name(millis: i64, bytes: &[u8], extension: &str) -> String {
    let digest = hex::encode(Sha256::digest(bytes));
    format!("{}-{}{}", millis, &digest[..16], extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_names_differ_for_distinct_images_in_the_same_millisecond() {
        let first = stored_upload_name(1_700_000_000_000, b"parcel-a", ".png");
        let second = stored_upload_name(1_700_000_000_000, b"parcel-b", ".png");
        assert_ne!(first, second);
        assert!(first.starts_with("1700000000000-"));
        assert!(first.ends_with(".png"));
        assert_eq!(first, stored_upload_name(1_700_000_000_000, b"parcel-a", ".png"));
    }
}
