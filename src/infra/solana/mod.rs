//! Solana access: the `Ledger` seam, its RPC implementation, and instruction builders.

pub mod client;
pub mod ledger;
pub mod nft_program;
pub mod pda;
pub mod vault_program;

pub use client::RpcLedger;
pub use ledger::{Ledger, NftRecord, TokenAmount, TokenHolding};
pub use pda::{PdaService, VaultAccounts, VaultPdas};
