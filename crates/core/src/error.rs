//! Error types for stockfish-bridge-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("FEN is required")]
    MissingFen,

    #[error("FEN must be a single line")]
    MultilineFen,

    #[error("Depth must be between 1 and {max}")]
    InvalidDepth { depth: u32, max: u32 },

    #[error("Engine failed to start")]
    Launch(#[source] std::io::Error),

    #[error("Best move not found in output")]
    MissingBestMove,

    #[error("Timeout")]
    Timeout,

    #[error("Engine I/O error")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// True when the caller sent a bad request, as opposed to the engine failing
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::MissingFen | Error::MultilineFen | Error::InvalidDepth { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
