// src/error.rs

use thiserror::Error;

/// Why a fetch cycle ended in `Error`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network unreachable, connection reset, body could not be read.
    #[error("could not reach data source: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not load sheet data (status {0})")]
    Status(u16),

    /// The body tokenized to zero rows, so there is not even a header.
    #[error("sheet is empty")]
    EmptySource,
}

impl FetchError {
    /// Transport-class failures: anything that went wrong before a usable body arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_carries_code() {
        let msg = FetchError::Status(404).to_string();
        assert!(msg.contains("404"), "{msg}");
        assert!(FetchError::Status(500).is_transport());
        assert!(!FetchError::EmptySource.is_transport());
    }
}
