// Off-chain NFT metadata document (Metaplex JSON standard) for land parcels.

use crate::domain::land::{LandTokenRequest, LandUpload, DEFAULT_DESCRIPTION};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

pub const TRAIT_CAR_NUMBER: &str = "CAR Number";
pub const TRAIT_CAR_STATUS: &str = "CAR Status";
pub const TRAIT_VEGETATION_COVERAGE: &str = "Vegetation Coverage";
pub const TRAIT_HAS_APP: &str = "Has APP";
pub const TRAIT_APP_DETAILS: &str = "APP Details";
pub const TRAIT_COMMITMENT_HASH: &str = "Commitment Hash";
pub const TRAIT_HECTARES: &str = "Hectares";
pub const TRAIT_WATER_BODIES: &str = "Water Bodies";
pub const TRAIT_SPRINGS: &str = "Springs";
pub const TRAIT_CAR_REGISTRY: &str = "CAR Registry";

pub const CATEGORY_LAND: &str = "land";
pub const GEOJSON_MIME: &str = "application/geo+json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct LandAttribute {
    pub trait_type: String,
    #[schema(value_type = Object)]
    pub value: JsonValue,
}

impl LandAttribute {
    fn new(trait_type: &str, value: impl Into<JsonValue>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct MetadataFile {
    pub uri: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct MetadataProperties {
    pub files: Vec<MetadataFile>,
    pub category: String,
}

/// The JSON document pinned to IPFS and referenced by the NFT's `uri`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct LandMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<LandAttribute>,
    pub properties: MetadataProperties,
}

fn image_mime(uri: &str) -> &'static str {
    let lower = uri.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/png"
    }
}

fn text_or_na(value: &Option<String>) -> JsonValue {
    JsonValue::from(value.clone().unwrap_or_else(|| "N/A".to_string()))
}

impl LandMetadata {
    /// Document for a JSON registration. `geo_json_uri` is the pinned boundary, if any.
    pub fn from_request(
        request: &LandTokenRequest,
        image: &str,
        geo_json_uri: Option<&str>,
        commitment_hash: &str,
    ) -> Self {
        let env = &request.environmental_metadata;
        let attributes = vec![
            LandAttribute::new(TRAIT_CAR_NUMBER, text_or_na(&request.car_number)),
            LandAttribute::new(TRAIT_CAR_STATUS, text_or_na(&request.car_status)),
            LandAttribute::new(TRAIT_VEGETATION_COVERAGE, env.vegetation_cover.clone()),
            LandAttribute::new(TRAIT_HAS_APP, env.has_app),
            LandAttribute::new(TRAIT_APP_DETAILS, text_or_na(&env.app_details)),
            LandAttribute::new(TRAIT_COMMITMENT_HASH, commitment_hash),
        ];

        let mut files = vec![MetadataFile {
            uri: image.to_string(),
            mime_type: image_mime(image).to_string(),
        }];
        if let Some(uri) = geo_json_uri {
            files.push(MetadataFile {
                uri: uri.to_string(),
                mime_type: GEOJSON_MIME.to_string(),
            });
        }

        Self {
            name: request.property_name.clone(),
            symbol: request.symbol().to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            image: image.to_string(),
            attributes,
            properties: MetadataProperties {
                files,
                category: CATEGORY_LAND.to_string(),
            },
        }
    }

    /// Document for a multipart upload whose image was pinned at `image_uri`.
    pub fn from_upload(upload: &LandUpload, image_uri: &str, image_mime_type: &str) -> Self {
        let attributes = vec![
            LandAttribute::new(TRAIT_VEGETATION_COVERAGE, text_or_na(&upload.vegetation_coverage)),
            LandAttribute::new(TRAIT_HECTARES, text_or_na(&upload.hectares)),
            LandAttribute::new(TRAIT_WATER_BODIES, text_or_na(&upload.water_bodies)),
            LandAttribute::new(TRAIT_SPRINGS, text_or_na(&upload.springs)),
            LandAttribute::new(TRAIT_CAR_REGISTRY, text_or_na(&upload.car_registry)),
        ];

        Self {
            name: upload.name.clone(),
            symbol: upload.symbol().to_string(),
            description: upload
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            image: image_uri.to_string(),
            attributes,
            properties: MetadataProperties {
                files: vec![MetadataFile {
                    uri: image_uri.to_string(),
                    mime_type: image_mime_type.to_string(),
                }],
                category: CATEGORY_LAND.to_string(),
            },
        }
    }
}

/// Attribute projection of a fetched metadata document, as returned by listings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandData {
    pub description: Option<String>,
    pub image: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub attributes: Vec<JsonValue>,
    #[schema(value_type = Object)]
    pub vegetation_coverage: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub hectares: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub water_bodies: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub springs: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub car_registry: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub car_number: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub car_status: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub has_app: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub app_details: Option<JsonValue>,
    #[schema(value_type = Object)]
    pub commitment_hash: Option<JsonValue>,
}

impl LandData {
    /// Projects any JSON document; traits that are missing come back as `None`.
    pub fn from_document(document: &JsonValue) -> Self {
        let attributes = document
            .get("attributes")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default();

        let find = |trait_type: &str| {
            attributes
                .iter()
                .find(|attr| attr.get("trait_type").and_then(JsonValue::as_str) == Some(trait_type))
                .and_then(|attr| attr.get("value").cloned())
        };

        Self {
            description: document.get("description").and_then(JsonValue::as_str).map(str::to_string),
            image: document.get("image").and_then(JsonValue::as_str).map(str::to_string),
            vegetation_coverage: find(TRAIT_VEGETATION_COVERAGE),
            hectares: find(TRAIT_HECTARES),
            water_bodies: find(TRAIT_WATER_BODIES),
            springs: find(TRAIT_SPRINGS),
            car_registry: find(TRAIT_CAR_REGISTRY),
            car_number: find(TRAIT_CAR_NUMBER),
            car_status: find(TRAIT_CAR_STATUS),
            has_app: find(TRAIT_HAS_APP),
            app_details: find(TRAIT_APP_DETAILS),
            commitment_hash: find(TRAIT_COMMITMENT_HASH),
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::land::EnvironmentalMetadata;
    use serde_json::json;

    fn request() -> LandTokenRequest {
        LandTokenRequest {
            owner_address: Some("owner".into()),
            property_name: "Fazenda Boa Vista".into(),
            car_number: Some("MT-5107925-1".into()),
            car_status: Some("Ativo".into()),
            environmental_metadata: EnvironmentalMetadata {
                vegetation_cover: json!("85%"),
                has_app: true,
                app_details: None,
            },
            ..Default::default()
        }
    }

    #[test]
    fn request_document_carries_registry_attributes() {
        let doc = LandMetadata::from_request(&request(), "https://img/x.jpg", None, "ff00");
        assert_eq!(doc.symbol, "EVGL");
        assert_eq!(doc.properties.category, "land");
        assert_eq!(doc.properties.files.len(), 1);
        assert_eq!(doc.properties.files[0].mime_type, "image/jpeg");

        let value = serde_json::to_value(&doc).unwrap();
        let data = LandData::from_document(&value);
        assert_eq!(data.car_number, Some(json!("MT-5107925-1")));
        assert_eq!(data.has_app, Some(json!(true)));
        assert_eq!(data.app_details, Some(json!("N/A")));
        assert_eq!(data.commitment_hash, Some(json!("ff00")));
        assert_eq!(data.hectares, None);
    }

    #[test]
    fn geo_json_is_listed_as_a_file() {
        let doc = LandMetadata::from_request(&request(), "https://img/x.png", Some("ipfs://QmGeo"), "h");
        let geo = &doc.properties.files[1];
        assert_eq!(geo.uri, "ipfs://QmGeo");
        assert_eq!(geo.mime_type, GEOJSON_MIME);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["properties"]["files"][1]["type"], GEOJSON_MIME);
    }

    #[test]
    fn upload_document_projects_back_to_land_data() {
        let mut upload = LandUpload::default();
        upload.set_field("name", "Sítio".into());
        upload.set_field("hectares", "42".into());
        upload.set_field("carRegistry", "SP-123".into());
        let doc = LandMetadata::from_upload(&upload, "https://gw/ipfs/QmImg", "image/png");
        assert_eq!(doc.description, DEFAULT_DESCRIPTION);

        let data = LandData::from_document(&serde_json::to_value(&doc).unwrap());
        assert_eq!(data.hectares, Some(json!("42")));
        assert_eq!(data.car_registry, Some(json!("SP-123")));
        assert_eq!(data.springs, Some(json!("N/A")));
        assert_eq!(data.image.as_deref(), Some("https://gw/ipfs/QmImg"));
    }

    #[test]
    fn projection_tolerates_documents_without_attributes() {
        let data = LandData::from_document(&json!({ "name": "bare" }));
        assert!(data.attributes.is_empty());
        assert_eq!(data.vegetation_coverage, None);
    }
}
