//! Token Management
//!
//! Bearer token acquisition and revocation.

pub mod manager;

pub use manager::{DefaultTokenManager, MockTokenManager, TokenManager, TokenOutcome, TOKEN_PATH};
