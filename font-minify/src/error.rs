use std::path::PathBuf;

use thiserror::Error;

/// An error that aborts a whole run.
///
/// Failures that only affect a single asset or a single font are reported
/// through [`AssetError`](crate::walk::AssetError) and
/// [`FontError`](crate::font::FontError) instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("project root '{}' does not exist or is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    #[error("icon codepoint mapping unavailable from {source_name}: {reason}")]
    MappingUnavailable { source_name: String, reason: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),
}
