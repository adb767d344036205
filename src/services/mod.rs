//! Remote operation surface. Every call goes through the invoker.

pub mod objects;
pub mod system;

pub use objects::{ObjectKind, ObjectService};
pub use system::SystemService;
