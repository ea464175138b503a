//! Type definitions for subtrack

mod error;
mod subscription;

pub use error::*;
pub use subscription::*;

/// Store loading warning types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWarning {
    /// Record kept on disk with `end_date` before `start_date`
    InvertedInterval(uuid::Uuid),
}
