//! Recovery guidance attached to each error

use super::types::Error;
use std::path::PathBuf;

/// What a caller can do about a failed operation.
///
/// The engine never acts on these itself: corruption detection stops forward
/// progress and leaves the decision to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryHint {
    /// Fix the construction parameters
    UpdateConfiguration,
    /// The password/salt pair does not match the one the data was written with
    CheckCredentials,
    /// On-disk data is damaged; restore it from a backup before loading again
    RestoreFromBackup,
    /// Check permissions and free space for the given path
    CheckPermissions { path: PathBuf },
    /// Use a key made of word characters only
    UseValidKey,
    /// Nothing to do, the condition is expected
    Ignore,
}

impl Error {
    /// Get the recovery hint for this error
    #[must_use]
    pub fn recovery_hint(&self) -> RecoveryHint {
        match self {
            Self::Config { .. } => RecoveryHint::UpdateConfiguration,
            Self::Cipher { .. } => RecoveryHint::CheckCredentials,
            Self::Parse { .. } | Self::Integrity { .. } | Self::Json { .. } => {
                RecoveryHint::RestoreFromBackup
            }
            Self::FileSystem { path, .. } => RecoveryHint::CheckPermissions { path: path.clone() },
            Self::InvalidKey { .. } => RecoveryHint::UseValidKey,
            Self::NotFound { .. } => RecoveryHint::Ignore,
        }
    }

    /// Check if this error indicates damaged or undecipherable data
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::Cipher { .. } | Self::Parse { .. } | Self::Integrity { .. }
        )
    }

    /// Check if this error reports a missing file
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
