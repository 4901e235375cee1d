pub mod land;
pub mod vault;
