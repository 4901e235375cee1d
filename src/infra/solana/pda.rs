// Deterministic address derivation for the vault program, SPL token accounts and Metaplex.

use mpl_token_metadata::accounts::{MasterEdition, Metadata};
use solana_program::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;
use std::collections::BTreeMap;

pub const VAULT_SEED: &[u8] = b"vault";
pub const EVG_S_MINT_SEED: &[u8] = b"evg_s_mint";
pub const TREASURY_SEED: &[u8] = b"treasury";
pub const FEE_SEED: &[u8] = b"fee";

/// The four fixed-seed PDAs owned by the vault program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultPdas {
    pub vault: Pubkey,
    pub evg_s_mint: Pubkey,
    pub treasury: Pubkey,
    pub fee: Pubkey,
}

/// Every account a vault instruction may touch for one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAccounts {
    pub pdas: VaultPdas,
    pub usdc_mint: Pubkey,
    pub wallet_usdc: Pubkey,
    pub wallet_evg_s: Pubkey,
    pub vault_usdc: Pubkey,
    pub treasury_usdc: Pubkey,
    pub fee_usdc: Pubkey,
}

#[derive(Debug, Clone, Copy)]
pub struct PdaService {
    program_id: Pubkey,
}

impl PdaService {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn find(&self, seed: &[u8]) -> Pubkey {
        Pubkey::find_program_address(&[seed], &self.program_id).0
    }

    pub fn vault_pdas(&self) -> VaultPdas {
        VaultPdas {
            vault: self.find(VAULT_SEED),
            evg_s_mint: self.find(EVG_S_MINT_SEED),
            treasury: self.find(TREASURY_SEED),
            fee: self.find(FEE_SEED),
        }
    }

    /// ATAs of `owner` for each named mint.
    pub fn token_accounts(&self, owner: &Pubkey, mints: &[(&str, Pubkey)]) -> BTreeMap<String, Pubkey> {
        mints
            .iter()
            .map(|(key, mint)| (key.to_string(), get_associated_token_address(owner, mint)))
            .collect()
    }

    pub fn all_accounts(&self, wallet: &Pubkey, usdc_mint: &Pubkey) -> VaultAccounts {
        let pdas = self.vault_pdas();
        VaultAccounts {
            pdas,
            usdc_mint: *usdc_mint,
            wallet_usdc: get_associated_token_address(wallet, usdc_mint),
            wallet_evg_s: get_associated_token_address(wallet, &pdas.evg_s_mint),
            vault_usdc: get_associated_token_address(&pdas.vault, usdc_mint),
            treasury_usdc: get_associated_token_address(&pdas.treasury, usdc_mint),
            fee_usdc: get_associated_token_address(&pdas.fee, usdc_mint),
        }
    }
}

pub fn metadata_pda(mint: &Pubkey) -> Pubkey {
    Metadata::find_pda(mint).0
}

pub fn master_edition_pda(mint: &Pubkey) -> Pubkey {
    MasterEdition::find_pda(mint).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_pdas_are_deterministic_and_distinct() {
        let program_id = Pubkey::new_unique();
        let service = PdaService::new(program_id);
        let a = service.vault_pdas();
        let b = PdaService::new(program_id).vault_pdas();
        assert_eq!(a, b);
        assert_eq!(a.vault, Pubkey::find_program_address(&[b"vault"], &program_id).0);
        assert_eq!(
            a.evg_s_mint,
            Pubkey::find_program_address(&[b"evg_s_mint"], &program_id).0
        );

        let all = [a.vault, a.evg_s_mint, a.treasury, a.fee];
        for (i, x) in all.iter().enumerate() {
            for y in &all[i + 1..] {
                assert_ne!(x, y);
            }
        }
    }

    #[test]
    fn vault_pdas_depend_on_program() {
        let a = PdaService::new(Pubkey::new_unique()).vault_pdas();
        let b = PdaService::new(Pubkey::new_unique()).vault_pdas();
        assert_ne!(a.vault, b.vault);
    }

    #[test]
    fn all_accounts_uses_associated_token_addresses() {
        let service = PdaService::new(Pubkey::new_unique());
        let wallet = Pubkey::new_unique();
        let usdc = Pubkey::new_unique();
        let accounts = service.all_accounts(&wallet, &usdc);
        assert_eq!(accounts.wallet_usdc, get_associated_token_address(&wallet, &usdc));
        assert_eq!(
            accounts.vault_usdc,
            get_associated_token_address(&accounts.pdas.vault, &usdc)
        );
        assert_eq!(
            accounts.wallet_evg_s,
            get_associated_token_address(&wallet, &accounts.pdas.evg_s_mint)
        );

        let named = service.token_accounts(&wallet, &[("usdc", usdc)]);
        assert_eq!(named.get("usdc"), Some(&accounts.wallet_usdc));
    }

    #[test]
    fn metaplex_pdas_follow_metadata_seeds() {
        let mint = Pubkey::new_unique();
        let expected = Pubkey::find_program_address(
            &[b"metadata", mpl_token_metadata::ID.as_ref(), mint.as_ref()],
            &mpl_token_metadata::ID,
        )
        .0;
        assert_eq!(metadata_pda(&mint), expected);
        assert_ne!(master_edition_pda(&mint), expected);
    }
}
