pub mod ipfs_service;
pub mod nft_service;
pub mod vault_service;

use solana_program::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

/// Failures the HTTP layer maps to a specific status; anything else is a 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    InvalidInput(String),
    NotFound(String),
    Conflict(String),
    Forbidden(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidInput(m)
            | ServiceError::NotFound(m)
            | ServiceError::Conflict(m)
            | ServiceError::Forbidden(m) => f.write_str(m),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Parses a base58 address supplied by a client.
pub fn parse_address(field: &str, value: &str) -> anyhow::Result<Pubkey> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{} is required", field)).into());
    }
    Pubkey::from_str(value).map_err(|_| {
        ServiceError::InvalidInput(format!("{} is not a valid Solana address: {}", field, value)).into()
    })
}
