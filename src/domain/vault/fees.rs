// Local previews of the vault program's fee and issuance arithmetic.
//
// The program is authoritative; these mirror its constants.

use crate::domain::vault::VaultAccount;
use serde::Serialize;
use utoipa::ToSchema;

pub const BPS_DENOMINATOR: u64 = 10_000;
pub const MINT_FEE_BPS: u64 = 200;
pub const SALE_FEE_BPS: u64 = 250;
pub const DISTRIBUTION_FEE_BPS: u64 = 50;
/// USDC base units the program assigns to each EVG-L held by the vault.
pub const LAND_TOKEN_NOTIONAL_VALUE: u64 = 1_000_000;
pub const EVG_S_DECIMALS: u8 = 9;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    pub mint_fee_bps: u64,
    pub sale_fee_bps: u64,
    pub distribution_fee_bps: u64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            mint_fee_bps: MINT_FEE_BPS,
            sale_fee_bps: SALE_FEE_BPS,
            distribution_fee_bps: DISTRIBUTION_FEE_BPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleBreakdown {
    pub sale_fee: u64,
    pub seller_amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionBreakdown {
    pub distribution_fee: u64,
    pub distribution_amount: u64,
    pub amount_per_token: u64,
}

fn bps_of(amount: u64, bps: u64) -> u64 {
    // u128 intermediate: amount * bps cannot overflow, and the quotient fits u64.
    ((amount as u128 * bps as u128) / BPS_DENOMINATOR as u128) as u64
}

pub fn sale_breakdown(price: u64) -> SaleBreakdown {
    let sale_fee = bps_of(price, SALE_FEE_BPS);
    SaleBreakdown {
        sale_fee,
        seller_amount: price - sale_fee,
    }
}

pub fn distribution_breakdown(amount: u64, evg_s_supply: u64) -> Result<DistributionBreakdown, String> {
    if evg_s_supply == 0 {
        return Err("Vault has no EVG-S supply to distribute against".to_string());
    }
    let distribution_fee = bps_of(amount, DISTRIBUTION_FEE_BPS);
    let distribution_amount = amount - distribution_fee;
    Ok(DistributionBreakdown {
        distribution_fee,
        distribution_amount,
        amount_per_token: distribution_amount / evg_s_supply,
    })
}

/// EVG-S the program would mint for a deposit of `usdc_amount`.
pub fn evg_s_for_deposit(usdc_amount: u64, vault: &VaultAccount) -> Result<u64, String> {
    if vault.total_evg_s_supply == 0 {
        return Ok(usdc_amount);
    }
    let total_value = (vault.total_evg_l_tokens as u128) * (LAND_TOKEN_NOTIONAL_VALUE as u128);
    if total_value == 0 {
        return Err("Vault holds no EVG-L value to price EVG-S against".to_string());
    }
    let minted = (usdc_amount as u128) * (vault.total_evg_s_supply as u128) / total_value;
    u64::try_from(minted).map_err(|_| "EVG-S amount overflows u64".to_string())
}
