//! Typed failures for the catalog export/import paths.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    /// Transport failure, non-2xx status, or undecodable body.
    #[error("catalog fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The endpoint answered with JSON that is not a list of games.
    #[error("catalog endpoint returned a non-list payload: {0}")]
    NonListPayload(String),

    /// Two allowed genres slugify to the same CSV filename.
    #[error("genres {first:?} and {second:?} both map to {file}")]
    FilenameCollision {
        file: String,
        first: String,
        second: String,
    },

    #[error("unsupported database url scheme: {0}")]
    UnsupportedDatabaseUrl(String),
}
