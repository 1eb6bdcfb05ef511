use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub mod rules;

pub use rules::{resolve, result_label, Outcome};

pub const DEFAULT_PORT: u16 = 5555;
pub const BUFFER_SIZE: usize = 1024;
pub const WINNING_SCORE: u32 = 3;
pub const ROUND_TIMEOUT: Duration = Duration::from_secs(40);
/// Clients wait slightly longer than the server so the server notices a stale round first.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(45);

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("datagram is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("unknown move token {0:?}")]
    UnknownMove(String),
    #[error("malformed result message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Seat of a participant within the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::One, Slot::Two];

    pub fn number(self) -> u8 {
        match self {
            Slot::One => 1,
            Slot::Two => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Slot::One),
            2 => Some(Slot::Two),
            _ => None,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// A move as carried on the wire. `End` is a control move, not a playable choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "R")]
    Rock,
    #[serde(rename = "P")]
    Paper,
    #[serde(rename = "S")]
    Scissors,
    #[serde(rename = "END")]
    End,
}

impl Move {
    pub const PLAYABLE: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    pub fn token(self) -> &'static str {
        match self {
            Move::Rock => "R",
            Move::Paper => "P",
            Move::Scissors => "S",
            Move::End => "END",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
            Move::End => "End",
        }
    }

    pub fn is_playable(self) -> bool {
        !matches!(self, Move::End)
    }

    /// Dominance relation. Every playable move beats `End`.
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Scissors, Move::Paper)
                | (Move::Paper, Move::Rock)
                | (Move::Rock | Move::Paper | Move::Scissors, Move::End)
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Move {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("R") {
            Ok(Move::Rock)
        } else if token.eq_ignore_ascii_case("P") {
            Ok(Move::Paper)
        } else if token.eq_ignore_ascii_case("S") {
            Ok(Move::Scissors)
        } else if token.eq_ignore_ascii_case("END") {
            Ok(Move::End)
        } else {
            Err(ProtocolError::UnknownMove(token.to_string()))
        }
    }
}

/// Per-player verdict carried in a result message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundResult {
    Win,
    Lose,
    Draw,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Ended,
}

/// Outbound message sent to one participant after a round or a terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub opponent_choice: Move,
    pub result: RoundResult,
    pub your_score: u32,
    pub opponent_score: u32,
    pub game_status: GameStatus,
    pub message: String,
}

impl ResultMessage {
    pub fn is_final(&self) -> bool {
        self.game_status == GameStatus::Ended
    }
}

pub fn encode_move(mv: Move) -> Vec<u8> {
    mv.token().as_bytes().to_vec()
}

pub fn decode_move(data: &[u8]) -> Result<Move, ProtocolError> {
    std::str::from_utf8(data)?.parse()
}

pub fn encode_result(message: &ResultMessage) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

pub fn decode_result(data: &[u8]) -> Result<ResultMessage, ProtocolError> {
    Ok(serde_json::from_slice(data)?)
}
