pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod health;
    pub mod land;
    pub mod nft;
    pub mod vault;
}

pub use router::{create_router, ApiDoc};
pub use types::AppState;
