/// Constants used throughout the vaultkv workspace
// Log record operation tags
pub const SET_TAG: &str = "S:";
pub const REMOVE_TAG: &str = "R:";
pub const TAG_LEN: usize = 2;

// Default file locations
pub const DEFAULT_LOG_FILENAME: &str = "./db.logs";
pub const DEFAULT_SNAPSHOT_FILENAME: &str = "./db";

// Extension appended to a guarded file's path to name its checksum file
pub const CHECKSUM_EXTENSION: &str = "sha256";

// Separator between encrypted records. Must never occur in the ciphertext alphabet.
pub const DEFAULT_RECORD_SEPARATOR: &str = "\n";

// scrypt cost parameters (N = 2^14, r = 8, p = 1)
pub const DEFAULT_SCRYPT_LOG_N: u8 = 14;
pub const DEFAULT_SCRYPT_R: u32 = 8;
pub const DEFAULT_SCRYPT_P: u32 = 1;

// Environment variable consulted by the tracing initialiser
pub const VAULTKV_LOG_VAR: &str = "VAULTKV_LOG";
