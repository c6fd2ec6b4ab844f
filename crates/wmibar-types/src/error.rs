//! Error types for wmibar.

use std::io;

/// Errors produced by the wmibar crates.
#[derive(Debug, thiserror::Error)]
pub enum BarError {
    #[error("namespace error: {0}")]
    Namespace(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BarError>;
