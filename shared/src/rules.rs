//! Round arbitration for rock/paper/scissors.
//!
//! Pure functions only. `resolve` is total over every pair of moves so the
//! coordinator can settle a buffered move against an `End` through the same
//! path as a normal round.

use crate::{Move, RoundResult, Slot};

/// Outcome of one round, with A being slot 1's move and B slot 2's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Draw,
    WinnerA,
    WinnerB,
}

impl Outcome {
    pub fn winner(self) -> Option<Slot> {
        match self {
            Outcome::Draw => None,
            Outcome::WinnerA => Some(Slot::One),
            Outcome::WinnerB => Some(Slot::Two),
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Outcome::Draw => Outcome::Draw,
            Outcome::WinnerA => Outcome::WinnerB,
            Outcome::WinnerB => Outcome::WinnerA,
        }
    }
}

pub fn resolve(a: Move, b: Move) -> Outcome {
    if a == b {
        Outcome::Draw
    } else if a.beats(b) {
        Outcome::WinnerA
    } else {
        Outcome::WinnerB
    }
}

/// Verdict of `outcome` as seen from `viewpoint`.
pub fn result_label(outcome: Outcome, viewpoint: Slot) -> RoundResult {
    match outcome.winner() {
        None => RoundResult::Draw,
        Some(winner) if winner == viewpoint => RoundResult::Win,
        Some(_) => RoundResult::Lose,
    }
}
