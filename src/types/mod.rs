//! FTD Types
//!
//! Data structures and configuration types.

pub mod config;
pub mod setup;
pub mod system;
pub mod token;

pub use config::*;
pub use setup::*;
pub use system::*;
pub use token::*;
