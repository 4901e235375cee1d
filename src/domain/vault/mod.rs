//! Read-side model of the vault program: account layout and fee arithmetic.

pub mod account;
pub mod fees;

pub use account::VaultAccount;
pub use fees::{DistributionBreakdown, FeeSchedule, SaleBreakdown};
