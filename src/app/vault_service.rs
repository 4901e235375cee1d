//! Vault operations: thin dispatch into the external Anchor program, plus read-side stats.

use crate::app::nft_service::owned_nft_records;
use crate::app::{parse_address, ServiceError};
use crate::domain::vault::fees::{
    distribution_breakdown, evg_s_for_deposit, sale_breakdown, EVG_S_DECIMALS, LAND_TOKEN_NOTIONAL_VALUE,
};
use crate::domain::vault::{FeeSchedule, VaultAccount};
use crate::infra::solana::{vault_program, Ledger, PdaService, TokenAmount, VaultAccounts};
use base64::Engine;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use std::sync::Arc;
use utoipa::ToSchema;

const USDC_DECIMALS: u8 = 6;

#[derive(Deserialize, Debug, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    /// USDC base units to deposit from the service wallet.
    #[serde(default)]
    pub amount: Option<u64>,
    /// Depositor's wallet; must be the service wallet unless `signedTransaction` is sent.
    #[serde(default)]
    pub wallet: Option<String>,
    /// Base64 of a bincode-serialized, fully signed transaction to forward unchanged.
    #[serde(default)]
    pub signed_transaction: Option<String>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub success: bool,
    pub tx: String,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    pub success: bool,
    pub tx: String,
    /// EVG-S the program is expected to mint; absent for forwarded transactions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_evg_s: Option<u64>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub success: bool,
    pub tx: String,
    pub sale_fee: u64,
    pub seller_amount: u64,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributeResponse {
    pub success: bool,
    pub tx: String,
    pub distribution_fee: u64,
    pub distribution_amount: u64,
    pub amount_per_token: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandTokenValue {
    pub address: String,
    pub name: String,
    /// USDC base units.
    pub value: u64,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultStatsResponse {
    pub vault_address: String,
    pub authority: String,
    pub usdc_mint: String,
    pub total_usdc: u64,
    pub usdc_decimals: u8,
    pub total_evg_s: u64,
    pub total_evg_l: u64,
    /// EVG-S minted for a 1 USDC deposit at the current ratio, when defined.
    pub evg_s_per_usdc: Option<u64>,
    pub fees: FeeSchedule,
    pub land_tokens: Vec<LandTokenValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_evg_s_balance: Option<u64>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvgSBalanceResponse {
    pub wallet: String,
    pub balance: u64,
    pub decimals: u8,
    pub ui_balance: String,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandTokensResponse {
    pub owner: String,
    pub tokens: Vec<LandTokenValue>,
}

fn require_positive(field: &str, value: u64) -> anyhow::Result<u64> {
    if value == 0 {
        return Err(ServiceError::InvalidInput(format!("{} must be greater than zero", field)).into());
    }
    Ok(value)
}

/// Decodes `base64(bincode(Transaction))` and checks every required signature is present.
pub fn decode_signed_transaction(encoded: &str) -> anyhow::Result<Transaction> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::InvalidInput(format!("signedTransaction is not valid base64: {}", e)))?;
    let transaction: Transaction = bincode::deserialize(&bytes)
        .map_err(|e| ServiceError::InvalidInput(format!("signedTransaction is not a transaction: {}", e)))?;
    if !transaction.is_signed() {
        return Err(ServiceError::InvalidInput("signedTransaction is missing signatures".to_string()).into());
    }
    Ok(transaction)
}

pub struct VaultService {
    ledger: Arc<dyn Ledger>,
    pdas: PdaService,
    usdc_mint: Pubkey,
}

impl VaultService {
    pub fn new(ledger: Arc<dyn Ledger>, program_id: Pubkey, usdc_mint: Pubkey) -> Self {
        Self {
            ledger,
            pdas: PdaService::new(program_id),
            usdc_mint,
        }
    }

    pub fn vault_address(&self) -> Pubkey {
        self.pdas.vault_pdas().vault
    }

    /// Reads and decodes the vault account; 404 when it has not been initialized.
    pub async fn load_vault(&self) -> anyhow::Result<VaultAccount> {
        let address = self.vault_address();
        let data = self
            .ledger
            .account_data(&address)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vault {} is not initialized", address)))?;
        VaultAccount::try_from_bytes(&data)
    }

    fn accounts_for(&self, wallet: &Pubkey, usdc_mint: &Pubkey) -> VaultAccounts {
        self.pdas.all_accounts(wallet, usdc_mint)
    }

    pub async fn initialize_vault(&self, usdc_mint: Option<&str>) -> anyhow::Result<TxResponse> {
        let usdc_mint = match usdc_mint {
            Some(m) if !m.trim().is_empty() => parse_address("usdcMint", m)?,
            _ => self.usdc_mint,
        };
        let authority = self.ledger.authority();
        let accounts = self.accounts_for(&authority, &usdc_mint);

        if self.ledger.account_data(&accounts.pdas.vault).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Vault {} is already initialized",
                accounts.pdas.vault
            ))
            .into());
        }

        let ix = vault_program::initialize_vault(&self.pdas.program_id(), &authority, &accounts);
        let tx = self.ledger.submit(vec![ix], Vec::new()).await?;
        println!("> VaultService: Vault initialized at {} (tx {})", accounts.pdas.vault, tx);
        Ok(TxResponse {
            success: true,
            tx: tx.to_string(),
        })
    }

    pub async fn deposit_usdc(&self, request: DepositRequest) -> anyhow::Result<DepositResponse> {
        if let Some(encoded) = request.signed_transaction.as_deref() {
            let transaction = decode_signed_transaction(encoded)?;
            let tx = self.ledger.submit_signed(transaction).await?;
            println!("> VaultService: Forwarded client-signed deposit (tx {})", tx);
            return Ok(DepositResponse {
                success: true,
                tx: tx.to_string(),
                expected_evg_s: None,
            });
        }

        let amount = require_positive(
            "amount",
            request
                .amount
                .ok_or_else(|| ServiceError::InvalidInput("amount is required".to_string()))?,
        )?;
        let authority = self.ledger.authority();
        if let Some(wallet) = request.wallet.as_deref().filter(|w| !w.trim().is_empty()) {
            let wallet = parse_address("wallet", wallet)?;
            if wallet != authority {
                return Err(ServiceError::Forbidden(format!(
                    "Deposits from {} must be signed by that wallet; send signedTransaction",
                    wallet
                ))
                .into());
            }
        }

        let vault = self.load_vault().await?;
        let expected_evg_s = evg_s_for_deposit(amount, &vault).ok();
        let accounts = self.accounts_for(&authority, &vault.usdc_mint);

        let instructions = vec![
            create_associated_token_account_idempotent(
                &authority,
                &authority,
                &accounts.pdas.evg_s_mint,
                &spl_token::ID,
            ),
            vault_program::deposit_usdc(&self.pdas.program_id(), &authority, &accounts, amount),
        ];
        let tx = self.ledger.submit(instructions, Vec::new()).await?;
        println!("> VaultService: Deposited {} USDC base units (tx {})", amount, tx);

        Ok(DepositResponse {
            success: true,
            tx: tx.to_string(),
            expected_evg_s,
        })
    }

    pub async fn purchase_evg_l(&self, price: u64, seller_address: &str) -> anyhow::Result<PurchaseResponse> {
        let price = require_positive("price", price)?;
        let seller = parse_address("sellerAddress", seller_address)?;
        let vault = self.load_vault().await?;
        let accounts = self.accounts_for(&self.ledger.authority(), &vault.usdc_mint);

        let available = self
            .ledger
            .token_balance(&accounts.vault_usdc)
            .await?
            .map(|b| b.amount)
            .unwrap_or(0);
        if available < price {
            return Err(ServiceError::Conflict(format!(
                "Insufficient funds in vault: {} < {}",
                available, price
            ))
            .into());
        }

        let split = sale_breakdown(price);
        let seller_usdc = get_associated_token_address(&seller, &vault.usdc_mint);
        let ix = vault_program::purchase_evg_l(&self.pdas.program_id(), &accounts, &seller_usdc, price);
        let tx = self.ledger.submit(vec![ix], Vec::new()).await?;
        println!("> VaultService: Purchased EVG-L from {} for {} (tx {})", seller, price, tx);

        Ok(PurchaseResponse {
            success: true,
            tx: tx.to_string(),
            sale_fee: split.sale_fee,
            seller_amount: split.seller_amount,
        })
    }

    pub async fn distribute_earnings(
        &self,
        amount: u64,
        holder_address: Option<&str>,
    ) -> anyhow::Result<DistributeResponse> {
        let amount = require_positive("amount", amount)?;
        let holder = match holder_address {
            Some(h) if !h.trim().is_empty() => parse_address("holderAddress", h)?,
            _ => self.ledger.authority(),
        };
        let vault = self.load_vault().await?;
        let split = distribution_breakdown(amount, vault.total_evg_s_supply).map_err(ServiceError::Conflict)?;

        let accounts = self.accounts_for(&self.ledger.authority(), &vault.usdc_mint);
        let holder_usdc = get_associated_token_address(&holder, &vault.usdc_mint);
        let ix = vault_program::distribute_earnings(&self.pdas.program_id(), &accounts, &holder_usdc, amount);
        let tx = self.ledger.submit(vec![ix], Vec::new()).await?;
        println!("> VaultService: Distributed {} to {} (tx {})", amount, holder, tx);

        Ok(DistributeResponse {
            success: true,
            tx: tx.to_string(),
            distribution_fee: split.distribution_fee,
            distribution_amount: split.distribution_amount,
            amount_per_token: split.amount_per_token,
        })
    }

    async fn land_token_values(&self, owner: &Pubkey) -> anyhow::Result<Vec<LandTokenValue>> {
        let records = owned_nft_records(self.ledger.as_ref(), owner).await?;
        Ok(records
            .into_iter()
            .map(|r| LandTokenValue {
                address: r.mint.to_string(),
                name: r.name,
                value: LAND_TOKEN_NOTIONAL_VALUE,
            })
            .collect())
    }

    async fn evg_s_amount(&self, wallet: &Pubkey) -> anyhow::Result<TokenAmount> {
        let evg_s_mint = self.pdas.vault_pdas().evg_s_mint;
        let ata = get_associated_token_address(wallet, &evg_s_mint);
        Ok(self.ledger.token_balance(&ata).await?.unwrap_or(TokenAmount {
            amount: 0,
            decimals: EVG_S_DECIMALS,
        }))
    }

    pub async fn stats(&self, wallet: Option<&str>) -> anyhow::Result<VaultStatsResponse> {
        let wallet = match wallet {
            Some(w) if !w.trim().is_empty() => Some(parse_address("wallet", w)?),
            _ => None,
        };
        let vault = self.load_vault().await?;
        let vault_address = self.vault_address();

        let vault_usdc = get_associated_token_address(&vault_address, &vault.usdc_mint);
        let usdc = self.ledger.token_balance(&vault_usdc).await?.unwrap_or(TokenAmount {
            amount: 0,
            decimals: USDC_DECIMALS,
        });
        let evg_s_per_usdc = 10u64
            .checked_pow(usdc.decimals as u32)
            .and_then(|one_usdc| evg_s_for_deposit(one_usdc, &vault).ok());

        let wallet_evg_s_balance = match wallet {
            Some(w) => Some(self.evg_s_amount(&w).await?.amount),
            None => None,
        };

        Ok(VaultStatsResponse {
            vault_address: vault_address.to_string(),
            authority: vault.authority.to_string(),
            usdc_mint: vault.usdc_mint.to_string(),
            total_usdc: usdc.amount,
            usdc_decimals: usdc.decimals,
            total_evg_s: vault.total_evg_s_supply,
            total_evg_l: vault.total_evg_l_tokens,
            evg_s_per_usdc,
            fees: FeeSchedule::default(),
            land_tokens: self.land_token_values(&vault_address).await?,
            wallet_evg_s_balance,
        })
    }

    pub async fn evg_s_balance(&self, wallet: &str) -> anyhow::Result<EvgSBalanceResponse> {
        let wallet = parse_address("wallet", wallet)?;
        let amount = self.evg_s_amount(&wallet).await?;
        Ok(EvgSBalanceResponse {
            wallet: wallet.to_string(),
            balance: amount.amount,
            decimals: amount.decimals,
            ui_balance: amount.ui_string(),
        })
    }

    /// Land NFTs held by `wallet`, or by the vault itself when no wallet is given.
    pub async fn land_tokens(&self, wallet: Option<&str>) -> anyhow::Result<LandTokensResponse> {
        let owner = match wallet {
            Some(w) if !w.trim().is_empty() => parse_address("wallet", w)?,
            _ => self.vault_address(),
        };
        Ok(LandTokensResponse {
            owner: owner.to_string(),
            tokens: self.land_token_values(&owner).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{signature::Keypair, signer::Signer};
    use solana_system_interface::instruction as system_instruction;

    #[test]
    fn decodes_signed_transactions() {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        let tx = Transaction::new_signed_with_payer(
            &[ix],
            Some(&payer.pubkey()),
            &[&payer],
            solana_sdk::hash::Hash::new_unique(),
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(bincode::serialize(&tx).unwrap());
        assert_eq!(decode_signed_transaction(&encoded).unwrap(), tx);
    }

    #[test]
    fn rejects_unsigned_or_garbage_transactions() {
        let payer = Pubkey::new_unique();
        let ix = system_instruction::transfer(&payer, &Pubkey::new_unique(), 1);
        let unsigned = Transaction::new_with_payer(&[ix], Some(&payer));
        let encoded = base64::engine::general_purpose::STANDARD.encode(bincode::serialize(&unsigned).unwrap());
        assert!(decode_signed_transaction(&encoded).is_err());
        assert!(decode_signed_transaction("@@@").is_err());
        assert!(decode_signed_transaction("AAAA").is_err());
    }
}
