// Decoding of the vault program's `Vault` account.

use crate::crypto::hashing::anchor_discriminator;
use solana_program::pubkey::Pubkey;

/// discriminator + authority + usdc_mint + two u64 counters + treasury + fee
pub const VAULT_ACCOUNT_LEN: usize = 8 + 32 + 32 + 8 + 8 + 32 + 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultAccount {
    pub authority: Pubkey,
    pub usdc_mint: Pubkey,
    pub total_evg_s_supply: u64,
    pub total_evg_l_tokens: u64,
    pub treasury_account: Pubkey,
    pub fee_account: Pubkey,
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }

    fn pubkey(&mut self) -> Pubkey {
        Pubkey::new_from_array(self.take::<32>())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take::<8>())
    }
}

impl VaultAccount {
    pub fn discriminator() -> [u8; 8] {
        anchor_discriminator("account", "Vault")
    }

    pub fn try_from_bytes(data: &[u8]) -> anyhow::Result<Self> {
        if data.len() < VAULT_ACCOUNT_LEN {
            return Err(anyhow::anyhow!(
                "Vault account data too short: {} < {}",
                data.len(),
                VAULT_ACCOUNT_LEN
            ));
        }
        if data[..8] != Self::discriminator() {
            return Err(anyhow::anyhow!("Account is not a vault (discriminator mismatch)"));
        }

        let mut r = Reader { data, offset: 8 };
        Ok(Self {
            authority: r.pubkey(),
            usdc_mint: r.pubkey(),
            total_evg_s_supply: r.u64(),
            total_evg_l_tokens: r.u64(),
            treasury_account: r.pubkey(),
            fee_account: r.pubkey(),
        })
    }

    /// Inverse of `try_from_bytes`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(VAULT_ACCOUNT_LEN);
        data.extend_from_slice(&Self::discriminator());
        data.extend_from_slice(self.authority.as_ref());
        data.extend_from_slice(self.usdc_mint.as_ref());
        data.extend_from_slice(&self.total_evg_s_supply.to_le_bytes());
        data.extend_from_slice(&self.total_evg_l_tokens.to_le_bytes());
        data.extend_from_slice(self.treasury_account.as_ref());
        data.extend_from_slice(self.fee_account.as_ref());
        data
    }
}
