//! Chess engine integration
//!
//! Drives a UCI-compatible engine like Stockfish as a subprocess.

pub mod bridge;
pub mod parser;
pub mod session;

// Re-export main types for convenience
pub use bridge::{EngineBridge, EngineResult, EvaluationRequest};
pub use parser::{OutputParser, Verdict};
pub use session::{EngineSession, SearchOutcome};
