//! The seam between the services and the Solana cluster.

use async_trait::async_trait;
use solana_program::{instruction::Instruction, pubkey::Pubkey};
use solana_sdk::{signature::Signature, signer::keypair::Keypair, transaction::Transaction};

/// A token account held by some owner, as reported by the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHolding {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub decimals: u8,
}

impl TokenHolding {
    /// An NFT holding: exactly one unit of a zero-decimals mint.
    pub fn is_nft(&self) -> bool {
        self.amount == 1 && self.decimals == 0
    }
}

/// Raw token balance of a single token account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    pub amount: u64,
    pub decimals: u8,
}

impl TokenAmount {
    /// Decimal string form (`1500000` with 6 decimals -> `1.5`).
    pub fn ui_string(&self) -> String {
        if self.decimals == 0 {
            return self.amount.to_string();
        }
        // Past u128 range every u64 amount is purely fractional.
        let (whole, frac) = match 10u128.checked_pow(self.decimals as u32) {
            Some(scale) => (self.amount as u128 / scale, self.amount as u128 % scale),
            None => (0, self.amount as u128),
        };
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0width$}", frac, width = self.decimals as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

/// On-chain view of a Metaplex NFT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftRecord {
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub update_authority: Pubkey,
    /// The mint supply dropped to zero (or the mint account is gone).
    pub burned: bool,
}

/// Everything the services need from the cluster.
///
/// `RpcLedger` talks to a real RPC node; tests provide an in-memory implementation.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// The service wallet: fee payer, mint authority and update authority.
    fn authority(&self) -> Pubkey;

    /// Version string of the connected node (used by health checks).
    async fn cluster_version(&self) -> anyhow::Result<String>;

    /// Signs `instructions` with the service wallet plus `extra_signers`, sends and confirms.
    async fn submit(
        &self,
        instructions: Vec<Instruction>,
        extra_signers: Vec<Keypair>,
    ) -> anyhow::Result<Signature>;

    /// Sends a transaction that was already signed elsewhere, unchanged.
    async fn submit_signed(&self, transaction: Transaction) -> anyhow::Result<Signature>;

    /// Raw account data, `None` when the account does not exist.
    async fn account_data(&self, address: &Pubkey) -> anyhow::Result<Option<Vec<u8>>>;

    async fn rent_exempt_minimum(&self, data_len: usize) -> anyhow::Result<u64>;

    /// All SPL token accounts owned by `owner`.
    async fn token_holdings(&self, owner: &Pubkey) -> anyhow::Result<Vec<TokenHolding>>;

    /// Balance of a token account, `None` when it does not exist.
    async fn token_balance(&self, token_account: &Pubkey) -> anyhow::Result<Option<TokenAmount>>;

    /// Metaplex metadata for `mint`, `None` when the mint has no metadata account.
    async fn nft_record(&self, mint: &Pubkey) -> anyhow::Result<Option<NftRecord>>;

    /// Wallet currently holding the single unit of `mint`.
    async fn nft_owner(&self, mint: &Pubkey) -> anyhow::Result<Option<Pubkey>>;
}
