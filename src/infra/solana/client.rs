// Responsible for all communication with the Solana blockchain.

use crate::infra::solana::ledger::{Ledger, NftRecord, TokenAmount, TokenHolding};
use crate::infra::solana::pda::metadata_pda;
use async_trait::async_trait;
use mpl_token_metadata::accounts::Metadata;
use serde_json::Value as JsonValue;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_program::{instruction::Instruction, program_pack::Pack, pubkey::Pubkey};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::Signature,
    signer::{keypair::Keypair, Signer},
    transaction::Transaction,
};
use std::str::FromStr;

/// `Ledger` backed by a JSON-RPC node, signing with the service wallet.
pub struct RpcLedger {
    client: RpcClient,
    payer: Keypair,
}

impl RpcLedger {
    pub fn new(rpc_url: String, payer: Keypair) -> Self {
        let client = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());
        Self { client, payer }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.client
    }
}

/// Metaplex pads name/symbol/uri with NULs.
fn trim_padding(s: &str) -> String {
    s.trim_end_matches('\0').trim().to_string()
}

fn parse_holding(address: &str, parsed: &JsonValue) -> Option<TokenHolding> {
    // jsonParsed layout: data.parsed.info.{mint, tokenAmount.{amount, decimals}}
    let info = parsed.get("data")?.get("parsed")?.get("info")?;
    let token_amount = info.get("tokenAmount")?;
    Some(TokenHolding {
        address: Pubkey::from_str(address).ok()?,
        mint: Pubkey::from_str(info.get("mint")?.as_str()?).ok()?,
        amount: token_amount.get("amount")?.as_str()?.parse().ok()?,
        decimals: token_amount.get("decimals")?.as_u64()? as u8,
    })
}

#[async_trait]
impl Ledger for RpcLedger {
    fn authority(&self) -> Pubkey {
        self.payer.pubkey()
    }

    async fn cluster_version(&self) -> anyhow::Result<String> {
        Ok(self.client.get_version().await?.solana_core)
    }

    async fn submit(
        &self,
        instructions: Vec<Instruction>,
        extra_signers: Vec<Keypair>,
    ) -> anyhow::Result<Signature> {
        let mut signers: Vec<&Keypair> = vec![&self.payer];
        signers.extend(extra_signers.iter());

        let recent_blockhash = self.client.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &instructions,
            Some(&self.payer.pubkey()),
            &signers,
            recent_blockhash,
        );
        let signature = self.client.send_and_confirm_transaction(&transaction).await?;
        println!(
            "> Solana: Transaction confirmed: https://explorer.solana.com/tx/{}?cluster=devnet",
            signature
        );
        Ok(signature)
    }

    async fn submit_signed(&self, transaction: Transaction) -> anyhow::Result<Signature> {
        let signature = self.client.send_and_confirm_transaction(&transaction).await?;
        println!("> Solana: Client-signed transaction confirmed: {}", signature);
        Ok(signature)
    }

    async fn account_data(&self, address: &Pubkey) -> anyhow::Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn rent_exempt_minimum(&self, data_len: usize) -> anyhow::Result<u64> {
        Ok(self.client.get_minimum_balance_for_rent_exemption(data_len).await?)
    }

    async fn token_holdings(&self, owner: &Pubkey) -> anyhow::Result<Vec<TokenHolding>> {
        let keyed = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::ID))
            .await?;

        let mut holdings = Vec::with_capacity(keyed.len());
        for entry in keyed {
            let account = serde_json::to_value(&entry.account)?;
            match parse_holding(&entry.pubkey, &account) {
                Some(h) => holdings.push(h),
                None => eprintln!("> Solana: Skipping unparsable token account {}", entry.pubkey),
            }
        }
        Ok(holdings)
    }

    async fn token_balance(&self, token_account: &Pubkey) -> anyhow::Result<Option<TokenAmount>> {
        let Some(data) = self.account_data(token_account).await? else {
            return Ok(None);
        };
        let account = spl_token::state::Account::unpack(&data)?;
        let Some(mint_data) = self.account_data(&account.mint).await? else {
            return Ok(None);
        };
        let mint = spl_token::state::Mint::unpack(&mint_data)?;
        Ok(Some(TokenAmount {
            amount: account.amount,
            decimals: mint.decimals,
        }))
    }

    async fn nft_record(&self, mint: &Pubkey) -> anyhow::Result<Option<NftRecord>> {
        let Some(data) = self.account_data(&metadata_pda(mint)).await? else {
            return Ok(None);
        };
        let metadata = Metadata::safe_deserialize(&data)
            .map_err(|e| anyhow::anyhow!("Invalid metadata account for {}: {}", mint, e))?;

        let burned = match self.account_data(mint).await? {
            Some(mint_data) => spl_token::state::Mint::unpack(&mint_data)?.supply == 0,
            None => true,
        };

        Ok(Some(NftRecord {
            mint: *mint,
            name: trim_padding(&metadata.name),
            symbol: trim_padding(&metadata.symbol),
            uri: trim_padding(&metadata.uri),
            update_authority: metadata.update_authority,
            burned,
        }))
    }

    async fn nft_owner(&self, mint: &Pubkey) -> anyhow::Result<Option<Pubkey>> {
        let largest = self.client.get_token_largest_accounts(mint).await?;
        let Some(holder) = largest.into_iter().find(|b| b.amount.amount == "1") else {
            return Ok(None);
        };
        let address = Pubkey::from_str(&holder.address)?;
        let Some(data) = self.account_data(&address).await? else {
            return Ok(None);
        };
        Ok(Some(spl_token::state::Account::unpack(&data)?.owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_metaplex_padding() {
        assert_eq!(trim_padding("EVGL\0\0\0\0\0\0"), "EVGL");
    }

    #[test]
    fn parses_json_parsed_token_account() {
        let mint = Pubkey::new_unique();
        let address = Pubkey::new_unique();
        let account = json!({
            "lamports": 2039280,
            "owner": spl_token::ID.to_string(),
            "data": {
                "program": "spl-token",
                "parsed": {
                    "type": "account",
                    "info": {
                        "mint": mint.to_string(),
                        "tokenAmount": { "amount": "1", "decimals": 0, "uiAmountString": "1" }
                    }
                },
                "space": 165
            }
        });
        let holding = parse_holding(&address.to_string(), &account).unwrap();
        assert_eq!(holding.mint, mint);
        assert_eq!(holding.address, address);
        assert!(holding.is_nft());
    }

    #[test]
    fn rejects_binary_encoded_token_account() {
        let account = json!({ "data": ["AAAA", "base64"] });
        assert!(parse_holding(&Pubkey::new_unique().to_string(), &account).is_none());
    }
}
