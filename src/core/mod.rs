//! FTD Core Components
//!
//! HTTP transport and session state.

pub mod session;
pub mod transport;

pub use session::*;
pub use transport::*;
