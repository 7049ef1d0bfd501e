//! Request handler that turns a FEN into a best move
//!
//! Every request gets its own engine process. The process is acquired at
//! the start of [`EngineBridge::evaluate`] and terminated before it returns,
//! whichever way the search ends.

use serde::Serialize;
use tokio::process::Command;
use tracing::{error, info, warn};

use super::session::EngineSession;
use crate::commentary::commentary;
use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// A validated request, ready to be sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationRequest {
    /// Passed to the engine verbatim
    pub fen: String,
    pub depth: u32,
}

/// Response body for a successful search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    pub best_move: String,
    /// Pawns with two decimals, or `"0"` if the engine never scored the position
    pub evaluation: String,
    /// Moves to mate; positive when the side to move mates
    pub mate: Option<i32>,
    pub depth: u32,
    pub commentary: String,
}

#[derive(Debug, Clone)]
pub struct EngineBridge {
    config: EngineConfig,
}

impl EngineBridge {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates raw input without touching the engine
    pub fn request(&self, fen: Option<String>, depth: Option<u32>) -> Result<EvaluationRequest> {
        let fen = match fen {
            Some(f) if !f.trim().is_empty() => f,
            _ => return Err(Error::MissingFen),
        };
        // Each UCI command is one line; a newline here would smuggle in another
        if fen.contains(['\r', '\n']) {
            return Err(Error::MultilineFen);
        }

        let depth = depth.unwrap_or(self.config.default_depth);
        if depth == 0 || depth > self.config.max_depth {
            return Err(Error::InvalidDepth {
                depth,
                max: self.config.max_depth,
            });
        }

        Ok(EvaluationRequest { fen, depth })
    }

    /// Validates and evaluates in one go
    pub async fn handle(&self, fen: Option<String>, depth: Option<u32>) -> Result<EngineResult> {
        let request = self.request(fen, depth)?;
        self.evaluate(&request).await
    }

    /// Runs one search in a fresh engine process
    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<EngineResult> {
        info!("Received FEN: {} (depth {})", request.fen, request.depth);

        let mut command = Command::new(&self.config.path);
        command.args(&self.config.args);

        let mut session = EngineSession::spawn(command).map_err(|e| {
            error!("Engine spawn failed ({}): {:?}", self.config.path.display(), e);
            e
        })?;

        let search = tokio::time::timeout(
            self.config.timeout,
            session.search(&request.fen, request.depth),
        )
        .await;

        session.terminate().await;

        let outcome = match search {
            Ok(result) => result?,
            Err(_) => {
                warn!("Engine timed out after {:?}", self.config.timeout);
                return Err(Error::Timeout);
            }
        };

        info!("Best move: {}", outcome.best_move);

        Ok(EngineResult {
            commentary: commentary(&outcome.best_move, &outcome.evaluation),
            best_move: outcome.best_move,
            evaluation: outcome.evaluation,
            mate: outcome.mate,
            depth: request.depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn bridge_with(path: &str, args: &[&str], timeout: Duration) -> EngineBridge {
        EngineBridge::new(EngineConfig {
            path: PathBuf::from(path),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout,
            ..EngineConfig::default()
        })
    }

    fn scripted(script: &str) -> EngineBridge {
        bridge_with("sh", &["-c", script], Duration::from_secs(5))
    }

    #[test]
    fn test_missing_fen_is_rejected() {
        let bridge = EngineBridge::new(EngineConfig::default());
        assert!(matches!(bridge.request(None, None), Err(Error::MissingFen)));
        assert!(matches!(
            bridge.request(Some("  ".into()), Some(3)),
            Err(Error::MissingFen)
        ));
    }

    #[test]
    fn test_fen_with_line_break_is_rejected() {
        let bridge = EngineBridge::new(EngineConfig::default());
        let fen = format!("{}\nquit", START_FEN);
        assert!(matches!(
            bridge.request(Some(fen), None),
            Err(Error::MultilineFen)
        ));
        assert!(matches!(
            bridge.request(Some(format!("{}\r", START_FEN)), None),
            Err(Error::MultilineFen)
        ));
    }

    #[test]
    fn test_depth_defaults_to_twelve() {
        let bridge = EngineBridge::new(EngineConfig::default());
        let request = bridge.request(Some(START_FEN.into()), None).unwrap();
        assert_eq!(request.depth, 12);
        assert_eq!(request.fen, START_FEN);
    }

    #[test]
    fn test_depth_bounds() {
        let bridge = EngineBridge::new(EngineConfig::default());
        assert!(matches!(
            bridge.request(Some(START_FEN.into()), Some(0)),
            Err(Error::InvalidDepth { depth: 0, .. })
        ));
        assert!(matches!(
            bridge.request(Some(START_FEN.into()), Some(41)),
            Err(Error::InvalidDepth { depth: 41, max: 40 })
        ));
        assert_eq!(
            bridge.request(Some(START_FEN.into()), Some(40)).unwrap().depth,
            40
        );
    }

    #[tokio::test]
    async fn test_missing_fen_never_spawns() {
        // A launch error here would mean the engine was attempted
        let bridge = bridge_with("/nonexistent/engine", &[], Duration::from_secs(1));
        assert!(matches!(bridge.handle(None, None).await, Err(Error::MissingFen)));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let bridge = bridge_with("/nonexistent/engine", &[], Duration::from_secs(1));
        let result = bridge.handle(Some(START_FEN.into()), None).await;
        assert!(matches!(result, Err(Error::Launch(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_search() {
        let bridge = scripted(
            r#"read a; read b; read c
               echo "info depth 11 score cp 80 pv e2e4"
               echo "info depth 12 score cp 250 pv e2e4 e7e5"
               echo "bestmove e2e4 ponder e7e5""#,
        );
        let result = bridge.handle(Some(START_FEN.into()), None).await.unwrap();
        assert_eq!(
            result,
            EngineResult {
                best_move: "e2e4".into(),
                evaluation: "2.50".into(),
                mate: None,
                depth: 12,
                commentary: "I'll play e2e4. I'm gaining an advantage!".into(),
            }
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_depth_is_forwarded_and_echoed() {
        let bridge = scripted(
            r#"read a; read b; read c
               [ "$c" = "go depth 5" ] && echo "bestmove h2h3" || echo "bestmove""#,
        );
        let result = bridge.handle(Some(START_FEN.into()), Some(5)).await.unwrap();
        assert_eq!(result.best_move, "h2h3");
        assert_eq!(result.depth, 5);
        assert_eq!(result.evaluation, "0");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mate_and_score_tracked_separately() {
        let bridge = scripted(
            r#"read a; read b; read c
               echo "info depth 3 score cp -300 pv f7f6"
               echo "info depth 4 score mate -2 pv f7f6"
               echo "bestmove f7f6""#,
        );
        let result = bridge.handle(Some(START_FEN.into()), Some(4)).await.unwrap();
        assert_eq!(result.evaluation, "-3.00");
        assert_eq!(result.mate, Some(-2));
        assert_eq!(
            result.commentary,
            "I'll play f7f6. You're doing great, I need to defend."
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bestmove_without_move_is_protocol_error() {
        let bridge = scripted("read a; read b; read c; echo bestmove; exec sleep 30");
        let result = bridge.handle(Some(START_FEN.into()), None).await;
        assert!(matches!(result, Err(Error::MissingBestMove)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unterminated_bestmove_beats_timeout() {
        let bridge = bridge_with(
            "sh",
            &["-c", "read a; read b; read c; printf 'bestmove e2e4'; exec sleep 30"],
            Duration::from_secs(3),
        );
        let result = bridge.handle(Some(START_FEN.into()), None).await.unwrap();
        assert_eq!(result.best_move, "e2e4");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_engine_times_out() {
        let bridge = bridge_with("sh", &["-c", "exec sleep 30"], Duration::from_millis(200));
        let started = std::time::Instant::now();
        let result = bridge.handle(Some(START_FEN.into()), None).await;
        assert!(matches!(result, Err(Error::Timeout)));
        // Returned promptly, so the engine was killed rather than waited out
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = EngineResult {
            best_move: "e2e4".into(),
            evaluation: "0.10".into(),
            mate: None,
            depth: 12,
            commentary: "I'll play e2e4. It's a balanced game so far.".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bestMove": "e2e4",
                "evaluation": "0.10",
                "mate": null,
                "depth": 12,
                "commentary": "I'll play e2e4. It's a balanced game so far.",
            })
        );
    }

    #[test]
    #[ignore] // Requires stockfish installed
    fn test_real_stockfish() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let bridge = EngineBridge::new(EngineConfig::default());
        let result = runtime
            .block_on(bridge.handle(Some(START_FEN.into()), Some(8)))
            .unwrap();
        assert!(!result.best_move.is_empty());
        println!("{:?}", result);
    }
}
