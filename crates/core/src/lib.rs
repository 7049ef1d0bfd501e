//! Stockfish Bridge Core Library
//!
//! Hands a FEN to an external UCI engine and turns its output into a
//! best move, an evaluation and a short comment.

pub mod commentary;
pub mod config;
pub mod engine;
pub mod error;

pub use commentary::commentary;
pub use config::EngineConfig;
pub use engine::{EngineBridge, EngineResult, EvaluationRequest};
pub use error::{Error, Result};
