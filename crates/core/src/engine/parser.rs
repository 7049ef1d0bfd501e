//! Incremental parser for engine output
//!
//! The engine writes free-form text. Output arrives in arbitrary chunks, so
//! partial lines are buffered and every complete line is scanned exactly once.

use tracing::debug;

/// Longest unterminated line kept around; anything past this is dropped
const MAX_PENDING: usize = 64 * 1024;

/// How the search ended, as reported by the `bestmove` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// `bestmove <move> ...`
    Move(String),
    /// `bestmove` with nothing usable after it
    NoMove,
}

/// Running state accumulated from the engine's output stream
#[derive(Debug, Default)]
pub struct OutputParser {
    /// Bytes after the last newline seen so far
    pending: Vec<u8>,
    /// Last `score cp` value
    centipawns: Option<i32>,
    /// Last `score mate` value
    mate: Option<i32>,
}

impl OutputParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk of output; returns the verdict once `bestmove` shows up
    pub fn feed(&mut self, chunk: &[u8]) -> Option<Verdict> {
        self.pending.extend_from_slice(chunk);

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(verdict) = self.scan_line(&String::from_utf8_lossy(&line)) {
                self.pending.clear();
                return Some(verdict);
            }
        }

        if let Some(verdict) = self.scan_partial() {
            self.pending.clear();
            return Some(verdict);
        }
        if self.pending.len() > MAX_PENDING {
            debug!("dropping {} bytes of unterminated engine output", self.pending.len());
            self.pending.clear();
        }
        None
    }

    /// Flushes an unterminated trailing line at end of stream
    pub fn finish(&mut self) -> Option<Verdict> {
        if self.pending.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.pending);
        self.scan_line(&String::from_utf8_lossy(&line))
    }

    /// Evaluation in pawns with two decimals, or `"0"` if no score was seen
    pub fn evaluation(&self) -> String {
        match self.centipawns {
            Some(cp) => format!("{:.2}", cp as f64 / 100.0),
            None => "0".to_string(),
        }
    }

    /// Signed moves-to-mate, if the engine reported one
    pub fn mate(&self) -> Option<i32> {
        self.mate
    }

    /// Looks for a finished `bestmove` in the unterminated tail
    ///
    /// Scores are left alone here since a number may still be cut short.
    fn scan_partial(&self) -> Option<Verdict> {
        let tail = String::from_utf8_lossy(&self.pending);
        let parts: Vec<&str> = tail.split_whitespace().collect();
        let pos = parts.iter().position(|&p| p == "bestmove")?;
        let mv = parts.get(pos + 1)?;

        let token_closed = pos + 2 < parts.len() || tail.ends_with(char::is_whitespace);
        if !token_closed && !is_complete_move(mv) {
            return None;
        }
        Some(match *mv {
            "(none)" => Verdict::NoMove,
            mv => Verdict::Move(mv.to_string()),
        })
    }

    fn scan_line(&mut self, line: &str) -> Option<Verdict> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }
        debug!("engine: {}", line.trim_end());

        let mut i = 0;
        while i < parts.len() {
            match parts[i] {
                "score" if i + 2 < parts.len() => {
                    match parts[i + 1] {
                        "cp" => {
                            if let Ok(cp) = parts[i + 2].parse::<i32>() {
                                self.centipawns = Some(cp);
                            }
                        }
                        "mate" => {
                            if let Ok(m) = parts[i + 2].parse::<i32>() {
                                self.mate = Some(m);
                            }
                        }
                        _ => {}
                    }
                    i += 3;
                }
                "bestmove" => {
                    // "(none)" is what Stockfish prints when there is no legal move
                    return Some(match parts.get(i + 1) {
                        Some(mv) if *mv != "(none)" => Verdict::Move(mv.to_string()),
                        _ => Verdict::NoMove,
                    });
                }
                // The principal variation is just moves; nothing left to find
                "pv" => break,
                _ => i += 1,
            }
        }
        None
    }
}

/// True when `token` cannot grow into a longer UCI move
///
/// `e7e8` may still become `e7e8q`, so pawn-promotion shaped moves need five
/// characters; anything else is done at four.
fn is_complete_move(token: &str) -> bool {
    let bytes = token.as_bytes();
    match bytes.len() {
        5 => true,
        4 => !matches!((bytes[1], bytes[3]), (b'7', b'8') | (b'2', b'1')),
        _ => token == "(none)",
    }
}
