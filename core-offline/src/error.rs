use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OfflineError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Manifest record error: {0}")]
    Manifest(String),

    #[error("Invalid shell manifest: {0}")]
    InvalidShell(String),

    #[error("Request for {url} failed with status {status}")]
    BadStatus { url: String, status: u16 },
}

impl OfflineError {
    /// True when no HTTP response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, OfflineError::Bridge(e) if e.is_network())
    }
}

pub type Result<T> = std::result::Result<T, OfflineError>;
