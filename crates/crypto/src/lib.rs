//! Cryptographic building blocks for vaultkv
//!
//! - **`kdf`**: scrypt key derivation from a password/salt pair
//! - **`checksum`**: SHA-256 integrity digests for guarded files
//! - **`cipher`**: the record cipher shared by the append log and the snapshot
//!
//! Everything here is synchronous and CPU-bound; callers decide where the
//! async boundaries are.

pub mod checksum;
pub mod cipher;
pub mod kdf;

pub use checksum::{digest, Digest, DIGEST_LEN};
pub use cipher::{Cipher, CipherAlgorithm, CipherConfig, TextEncoding};
pub use kdf::{derive_key, KdfParams, SecretKey};
