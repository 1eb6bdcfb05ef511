//! Move selection for the non-interactive client

use rand::seq::SliceRandom;
use rand::Rng;
use shared::{Move, ProtocolError};

/// Where the next move comes from
pub enum MoveSource<R: Rng> {
    /// Fixed sequence, played in order
    Scripted { moves: Vec<Move>, next: usize },
    /// Uniformly random playable moves, `remaining` rounds left
    Random { rng: R, remaining: u32 },
}

impl<R: Rng> MoveSource<R> {
    /// Parses a comma separated list such as `R,p,S,END`
    pub fn scripted(list: &str) -> Result<Self, ProtocolError> {
        let moves = list
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse::<Move>)
            .collect::<Result<Vec<Move>, _>>()?;

        Ok(MoveSource::Scripted { moves, next: 0 })
    }

    pub fn random(rng: R, rounds: u32) -> Self {
        MoveSource::Random {
            rng,
            remaining: rounds,
        }
    }

    /// Next move to send, or None once the source is exhausted
    pub fn next_move(&mut self) -> Option<Move> {
        match self {
            MoveSource::Scripted { moves, next } => {
                let choice = moves.get(*next).copied()?;
                *next += 1;
                Some(choice)
            }
            MoveSource::Random { rng, remaining } => {
                if *remaining == 0 {
                    return None;
                }
                *remaining -= 1;
                Move::PLAYABLE.choose(rng).copied()
            }
        }
    }
}
