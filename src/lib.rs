pub mod app;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::ipfs_service::PinataClient;
pub use app::nft_service::NftService;
pub use app::vault_service::VaultService;
pub use app::ServiceError;
pub use crypto::hashing::{anchor_discriminator, commitment_hash};
pub use infra::config::Settings;
pub use infra::solana;
