//! Pinata pinning API client and IPFS gateway reads.

use crate::infra::config::Settings;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Pinata's answer to a pin request.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PinResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
    #[serde(rename = "PinSize", default)]
    pub pin_size: u64,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,
}

impl PinResponse {
    pub fn ipfs_uri(&self) -> String {
        format!("ipfs://{}", self.ipfs_hash)
    }
}

/// Strips `ipfs://` / `ipfs:` so the remainder can be appended to a gateway URL.
pub fn ipfs_path(uri: &str) -> &str {
    uri.strip_prefix("ipfs://")
        .or_else(|| uri.strip_prefix("ipfs:"))
        .unwrap_or(uri)
}

#[derive(Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    gateway_url: String,
    api_key: String,
    secret_api_key: String,
}

impl PinataClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: settings.pinata_api_url.clone(),
            gateway_url: settings.pinata_gateway_url.clone(),
            api_key: settings.pinata_api_key.clone(),
            secret_api_key: settings.pinata_secret_api_key.clone(),
        }
    }

    /// Public gateway URL for a pinned hash.
    pub fn gateway_url_for(&self, ipfs_hash: &str) -> String {
        format!("{}/{}", self.gateway_url, ipfs_hash)
    }

    async fn parse_pin(response: reqwest::Response, what: &str) -> anyhow::Result<PinResponse> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Pinata {} failed ({}): {}", what, status, body));
        }
        Ok(response.json::<PinResponse>().await?)
    }

    pub async fn pin_json(&self, document: &JsonValue) -> anyhow::Result<PinResponse> {
        let response = self
            .http
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_url))
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .json(document)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Error uploading metadata to IPFS: {}", e))?;
        let pin = Self::parse_pin(response, "pinJSONToIPFS").await?;
        println!("> IPFS: Pinned JSON as {}", pin.ipfs_hash);
        Ok(pin)
    }

    pub async fn pin_file(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        content_type: &str,
    ) -> anyhow::Result<PinResponse> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Error uploading to IPFS: {}", e))?;
        let pin = Self::parse_pin(response, "pinFileToIPFS").await?;
        println!("> IPFS: Pinned file {} as {}", file_name, pin.ipfs_hash);
        Ok(pin)
    }

    /// Fetches a pinned JSON document through the gateway. Failures are logged, not raised.
    pub async fn fetch_json(&self, uri: &str) -> Option<JsonValue> {
        let url = if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else {
            self.gateway_url_for(ipfs_path(uri))
        };

        let result: Result<JsonValue, reqwest::Error> = async {
            let response = self.http.get(&url).send().await?.error_for_status()?;
            response.json::<JsonValue>().await
        }
        .await;

        match result {
            Ok(doc) => Some(doc),
            Err(e) => {
                eprintln!("> IPFS: Error getting metadata from {}: {}", url, e);
                None
            }
        }
    }
}
