//! Centralized configuration (environment variables + defaults).

use solana_program::pubkey::Pubkey;
use solana_sdk::signer::keypair::{read_keypair_file, Keypair};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEVNET_USDC_MINT: &str = "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU";
pub const MAINNET_USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs";
pub const DEFAULT_NFT_IMAGE: &str = "https://raw.githubusercontent.com/solana-labs/token-list/main/assets/mainnet/So11111111111111111111111111111111111111112/logo.png";
pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";

/// Runtime settings shared by the services and the HTTP layer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub solana_rpc_url: String,
    pub program_id: Pubkey,
    pub usdc_mint: Pubkey,
    pub pinata_api_url: String,
    pub pinata_gateway_url: String,
    pub pinata_api_key: String,
    pub pinata_secret_api_key: String,
    pub port: u16,
    pub uploads_dir: PathBuf,
    pub default_image: String,
    pub max_upload_bytes: usize,
}

impl Settings {
    /// Reads every setting from the environment. Only `PROGRAM_ID` (or its
    /// alias `VAULT_PROGRAM_ID`) has no default.
    pub fn from_env() -> anyhow::Result<Self> {
        let program_id = std::env::var("PROGRAM_ID")
            .or_else(|_| std::env::var("VAULT_PROGRAM_ID"))
            .map_err(|_| anyhow::anyhow!("PROGRAM_ID must be set"))?;

        Ok(Self {
            solana_rpc_url: var_or("SOLANA_RPC_URL", DEFAULT_RPC_URL),
            program_id: parse_pubkey("PROGRAM_ID", &program_id)?,
            usdc_mint: parse_pubkey("USDC_MINT", &var_or("USDC_MINT", DEVNET_USDC_MINT))?,
            pinata_api_url: trim_slash(var_or("PINATA_API_URL", DEFAULT_PINATA_API_URL)),
            pinata_gateway_url: trim_slash(var_or("PINATA_GATEWAY_URL", DEFAULT_PINATA_GATEWAY_URL)),
            pinata_api_key: var_or("PINATA_API_KEY", ""),
            pinata_secret_api_key: var_or("PINATA_SECRET_API_KEY", ""),
            port: var_or("PORT", "3000")
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid u16: {}", e))?,
            uploads_dir: PathBuf::from(var_or("UPLOADS_DIR", "uploads")),
            default_image: var_or("DEFAULT_NFT_IMAGE", DEFAULT_NFT_IMAGE),
            max_upload_bytes: var_or("MAX_UPLOAD_BYTES", "10485760")
                .parse()
                .map_err(|e| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a valid usize: {}", e))?,
        })
    }

    /// Presence of each secret, never the value.
    pub fn describe(&self) -> String {
        format!(
            "rpc_url={} program_id={} usdc_mint={} pinata_api_key={} pinata_secret_api_key={}",
            self.solana_rpc_url,
            self.program_id,
            self.usdc_mint,
            !self.pinata_api_key.is_empty(),
            !self.pinata_secret_api_key.is_empty()
        )
    }
}

/// Loads the service wallet.
///
/// `WALLET_SECRET_KEY` (a JSON byte array) wins; otherwise the keypair file at
/// `ANCHOR_WALLET` or the default Solana CLI location is read.
pub fn load_wallet() -> anyhow::Result<Keypair> {
    if let Ok(raw) = std::env::var("WALLET_SECRET_KEY") {
        return keypair_from_json(&raw);
    }
    let path = std::env::var("ANCHOR_WALLET").unwrap_or_else(|_| DEFAULT_KEYPAIR_PATH.to_string());
    let path = shellexpand::tilde(&path).to_string();
    read_keypair_file(&path).map_err(|e| anyhow::anyhow!("Failed to read keypair file {}: {}", path, e))
}

pub fn keypair_from_json(raw: &str) -> anyhow::Result<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("WALLET_SECRET_KEY must be a JSON byte array: {}", e))?;
    Keypair::try_from(&bytes[..]).map_err(|e| anyhow::anyhow!("Invalid wallet secret key: {}", e))
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_pubkey(name: &str, value: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|e| anyhow::anyhow!("{} is not a valid pubkey: {}", name, e))
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signer::Signer;

    #[test]
    fn keypair_round_trips_through_json_bytes() {
        let kp = Keypair::new();
        let raw = serde_json::to_string(&kp.to_bytes().to_vec()).unwrap();
        let loaded = keypair_from_json(&raw).unwrap();
        assert_eq!(loaded.pubkey(), kp.pubkey());
    }

    #[test]
    fn rejects_non_array_secret() {
        assert!(keypair_from_json("\"not-bytes\"").is_err());
        assert!(keypair_from_json("[1,2,3]").is_err());
    }

    #[test]
    fn trims_trailing_slashes() {
        assert_eq!(trim_slash("https://api.pinata.cloud/".into()), "https://api.pinata.cloud");
    }
}
