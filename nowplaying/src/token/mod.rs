mod errors;
mod manager;
mod seed;
mod types;

pub use errors::{SeedError, TokenError};
pub use manager::TokenManager;
pub use seed::{SeedPayload, seed_credentials};
