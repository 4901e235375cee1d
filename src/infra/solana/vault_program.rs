// Instruction builders for the external Anchor vault program.
//
// Accounts are listed in the order of the program's `#[derive(Accounts)]` structs;
// data is the 8-byte discriminator followed by the borsh-encoded arguments.

use crate::crypto::hashing::anchor_discriminator;
use crate::infra::solana::pda::VaultAccounts;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};
use solana_system_interface::program as system_program;

pub const INITIALIZE_VAULT: &str = "initialize_vault";
pub const DEPOSIT_USDC: &str = "deposit_usdc";
pub const PURCHASE_EVG_L: &str = "purchase_evg_l";
pub const DISTRIBUTE_EARNINGS: &str = "distribute_earnings";

fn data_with_u64(name: &str, value: u64) -> Vec<u8> {
    let mut data = anchor_discriminator("global", name).to_vec();
    data.extend_from_slice(&value.to_le_bytes());
    data
}

pub fn initialize_vault(program_id: &Pubkey, authority: &Pubkey, accounts: &VaultAccounts) -> Instruction {
    let mut data = anchor_discriminator("global", INITIALIZE_VAULT).to_vec();
    data.extend_from_slice(accounts.usdc_mint.as_ref());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.pdas.vault, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new(accounts.pdas.evg_s_mint, false),
            AccountMeta::new_readonly(accounts.pdas.treasury, false),
            AccountMeta::new_readonly(accounts.pdas.fee, false),
            AccountMeta::new_readonly(spl_token::ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data,
    }
}

/// `user` signs; `accounts` must have been derived for that same user.
pub fn deposit_usdc(program_id: &Pubkey, user: &Pubkey, accounts: &VaultAccounts, amount: u64) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.pdas.vault, false),
            AccountMeta::new(accounts.wallet_usdc, false),
            AccountMeta::new(accounts.vault_usdc, false),
            AccountMeta::new(accounts.pdas.evg_s_mint, false),
            AccountMeta::new(accounts.wallet_evg_s, false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(spl_token::ID, false),
        ],
        data: data_with_u64(DEPOSIT_USDC, amount),
    }
}

pub fn purchase_evg_l(
    program_id: &Pubkey,
    accounts: &VaultAccounts,
    seller_usdc: &Pubkey,
    price: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.pdas.vault, false),
            AccountMeta::new(accounts.vault_usdc, false),
            AccountMeta::new(accounts.fee_usdc, false),
            AccountMeta::new(*seller_usdc, false),
            AccountMeta::new_readonly(spl_token::ID, false),
        ],
        data: data_with_u64(PURCHASE_EVG_L, price),
    }
}

pub fn distribute_earnings(
    program_id: &Pubkey,
    accounts: &VaultAccounts,
    holder_usdc: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(accounts.pdas.vault, false),
            AccountMeta::new(accounts.vault_usdc, false),
            AccountMeta::new(accounts.treasury_usdc, false),
            AccountMeta::new(*holder_usdc, false),
            AccountMeta::new_readonly(spl_token::ID, false),
        ],
        data: data_with_u64(DISTRIBUTE_EARNINGS, amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::solana::pda::PdaService;

    fn fixture() -> (Pubkey, Pubkey, VaultAccounts) {
        let program_id = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();
        let usdc = Pubkey::new_unique();
        let accounts = PdaService::new(program_id).all_accounts(&wallet, &usdc);
        (program_id, wallet, accounts)
    }

    #[test]
    fn initialize_vault_encodes_usdc_mint_argument() {
        let (program_id, wallet, accounts) = fixture();
        let ix = initialize_vault(&program_id, &wallet, &accounts);
        assert_eq!(ix.program_id, program_id);
        assert_eq!(&ix.data[..8], &anchor_discriminator("global", "initialize_vault"));
        assert_eq!(&ix.data[8..], accounts.usdc_mint.as_ref());
        assert_eq!(ix.accounts.len(), 8);
        assert!(ix.accounts[1].is_signer);
        assert_eq!(ix.accounts[7].pubkey, sysvar::rent::ID);
        assert!(ix
            .accounts
            .iter()
            .any(|meta| meta.pubkey.to_string() == "11111111111111111111111111111111"));
    }

    #[test]
    fn deposit_encodes_amount_little_endian() {
        let (program_id, wallet, accounts) = fixture();
        let ix = deposit_usdc(&program_id, &wallet, &accounts, 1_000_000);
        assert_eq!(ix.data.len(), 16);
        assert_eq!(&ix.data[8..], &1_000_000u64.to_le_bytes());
        assert_eq!(ix.accounts[1].pubkey, accounts.wallet_usdc);
        assert_eq!(ix.accounts[2].pubkey, accounts.vault_usdc);
        assert_eq!(ix.accounts[4].pubkey, accounts.wallet_evg_s);
        assert!(ix.accounts[5].is_signer && ix.accounts[5].pubkey == wallet);
    }

    #[test]
    fn purchase_and_distribute_use_distinct_discriminators() {
        let (program_id, _wallet, accounts) = fixture();
        let seller = Pubkey::new_unique();
        let purchase = purchase_evg_l(&program_id, &accounts, &seller, 5);
        let distribute = distribute_earnings(&program_id, &accounts, &seller, 5);
        assert_ne!(purchase.data[..8], distribute.data[..8]);
        assert_eq!(purchase.accounts[2].pubkey, accounts.fee_usdc);
        assert_eq!(distribute.accounts[2].pubkey, accounts.treasury_usdc);
        assert!(purchase.accounts.iter().all(|a| !a.is_signer));
    }
}
