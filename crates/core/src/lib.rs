//! Core errors and constants for `vaultkv`.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate in
//!   the workspace. Corruption-class failures (`Cipher`, `Parse`, `Integrity`)
//!   are fatal and always surface to the caller.
//! - **`constants`**: operation tags, default file names and default
//!   key-derivation parameters.

pub mod constants;
pub mod errors;

pub use self::{
    constants::*,
    errors::{Error, RecoveryHint, Result, ResultExt},
};
