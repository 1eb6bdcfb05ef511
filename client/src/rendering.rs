//! Text rendering of round results

use shared::{ResultMessage, RoundResult};

/// Multi-line summary of a result message as shown to the player
pub fn describe(result: &ResultMessage) -> String {
    let verdict = match result.result {
        RoundResult::Win => ">>> YOU WON THIS ROUND! <<<",
        RoundResult::Lose => ">>> You lost this round <<<",
        RoundResult::Draw => ">>> DRAW <<<",
        RoundResult::GameOver => ">>> GAME OVER <<<",
    };

    let mut lines = vec![
        format!("Opponent chose: {}", result.opponent_choice),
        verdict.to_string(),
        format!(
            "Current Score: You {} - {} Opponent",
            result.your_score, result.opponent_score
        ),
    ];

    if !result.message.is_empty() {
        lines.push(result.message.clone());
    }

    lines.join("\n")
}
