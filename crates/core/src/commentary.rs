//! Short, human-sounding remarks about the engine's choice

/// Evaluation (in pawns) beyond which one side is considered better
const ADVANTAGE_THRESHOLD: f64 = 1.0;

/// Builds a one-line comment for `best_move` given the evaluation string
///
/// # Example
/// ```
/// use stockfish_bridge_core::commentary;
///
/// assert_eq!(
///     commentary("e2e4", "2.50"),
///     "I'll play e2e4. I'm gaining an advantage!"
/// );
/// ```
pub fn commentary(best_move: &str, evaluation: &str) -> String {
    let remark = match evaluation.trim().parse::<f64>() {
        Ok(score) if score > ADVANTAGE_THRESHOLD => "I'm gaining an advantage!",
        Ok(score) if score < -ADVANTAGE_THRESHOLD => "You're doing great, I need to defend.",
        Ok(score) if !score.is_nan() => "It's a balanced game so far.",
        _ => "Let's see how you respond.",
    };
    format!("I'll play {}. {}", best_move, remark)
}
