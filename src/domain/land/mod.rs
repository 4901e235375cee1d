//! Land parcels: what clients submit, and the NFT metadata document built from it.

pub mod metadata;

pub use metadata::{LandAttribute, LandData, LandMetadata, MetadataFile, MetadataProperties};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub const DEFAULT_SYMBOL: &str = "EVGL";
pub const DEFAULT_DESCRIPTION: &str = "Land token representing forest preservation commitment";

#[derive(Deserialize, Serialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalMetadata {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub vegetation_cover: JsonValue,
    #[serde(default)]
    pub has_app: bool,
    #[serde(default)]
    pub app_details: Option<String>,
}

/// JSON land registration, as sent by the registry form.
#[derive(Deserialize, Serialize, Debug, Clone, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandTokenRequest {
    /// Wallet that receives the minted NFT.
    #[serde(default)]
    pub owner_address: Option<String>,
    #[serde(default)]
    pub property_name: String,
    #[serde(default)]
    pub car_number: Option<String>,
    #[serde(default)]
    pub car_status: Option<String>,
    /// GeoJSON of the parcel boundary, either inline or as the raw file text.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub geo_json: Option<JsonValue>,
    /// Computed server-side when absent.
    #[serde(default)]
    pub commitment_hash: Option<String>,
    #[serde(default)]
    pub environmental_metadata: EnvironmentalMetadata,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Image URL; the configured default image is used when absent.
    #[serde(default)]
    pub image: Option<String>,
}

impl LandTokenRequest {
    pub fn symbol(&self) -> &str {
        self.symbol
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SYMBOL)
    }

    /// The GeoJSON document, if one was sent. Raw file text must parse as JSON.
    pub fn geo_json_document(&self) -> Result<Option<JsonValue>, String> {
        match &self.geo_json {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
            Some(JsonValue::String(s)) => serde_json::from_str(s)
                .map(Some)
                .map_err(|e| format!("geoJson is not valid JSON: {}", e)),
            Some(other) => Ok(Some(other.clone())),
        }
    }
}

/// Image part of a multipart land upload.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Extension of the original file name, including the dot (`.png`), or empty.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default()
    }
}

/// Multipart land registration (`/api/land/create`).
#[derive(Debug, Clone, Default)]
pub struct LandUpload {
    pub name: String,
    pub description: Option<String>,
    pub vegetation_coverage: Option<String>,
    pub hectares: Option<String>,
    pub water_bodies: Option<String>,
    pub springs: Option<String>,
    pub car_registry: Option<String>,
    pub owner_address: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<UploadedImage>,
}

impl LandUpload {
    /// Stores a text form field by its name; unknown fields are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        let value_opt = Some(value.clone()).filter(|v| !v.trim().is_empty());
        match name {
            "name" => self.name = value,
            "description" => self.description = value_opt,
            "vegetationCoverage" => self.vegetation_coverage = value_opt,
            "hectares" => self.hectares = value_opt,
            "waterBodies" => self.water_bodies = value_opt,
            "springs" => self.springs = value_opt,
            "carRegistry" => self.car_registry = value_opt,
            "ownerAddress" => self.owner_address = value_opt,
            "symbol" => self.symbol = value_opt,
            _ => {}
        }
    }

    pub fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or(DEFAULT_SYMBOL)
    }
}
