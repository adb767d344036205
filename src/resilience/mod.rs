//! Resilience
//!
//! Error classification and the recovering invoker that wraps every remote
//! operation.

pub mod classifier;
pub mod invoker;

pub use classifier::{
    ClassifiedError, ErrorClassifier, ErrorKind, RecoveryAction, DUPLICATE_CODES,
    SCHEDULING_FAILURE,
};
pub use invoker::Invoker;
