//! Error types and result extensions for vaultkv operations

mod builders;
mod conversions;
mod extensions;
mod recovery;
mod types;

pub use extensions::*;
pub use recovery::RecoveryHint;
pub use types::{Error, Result};
