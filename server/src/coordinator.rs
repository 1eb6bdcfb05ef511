//! Match state machine
//!
//! Turns inbound moves and idle wakeups into session transitions and the
//! result messages each participant should receive. The coordinator never
//! touches the socket; it hands back `(address, message)` pairs and the
//! network layer delivers them.

use crate::session::{Attachment, Session};
use log::{debug, info, warn};
use shared::{
    resolve, result_label, GameStatus, Move, ResultMessage, RoundResult, Slot, ROUND_TIMEOUT,
    WINNING_SCORE,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Game rules the coordinator enforces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRules {
    pub winning_score: u32,
    pub round_timeout: Duration,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            winning_score: WINNING_SCORE,
            round_timeout: ROUND_TIMEOUT,
        }
    }
}

/// Observable phase of the live session
///
/// Game over is not a resting phase: the session is reset in the same
/// transition that detects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    WaitingForPlayers,
    Active,
    /// Active with exactly one move buffered
    RoundPending,
}

/// A message for one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub addr: SocketAddr,
    pub message: ResultMessage,
}

pub struct MatchCoordinator {
    session: Session,
    rules: MatchRules,
}

impl MatchCoordinator {
    pub fn new(rules: MatchRules) -> Self {
        Self {
            session: Session::new(),
            rules,
        }
    }

    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> MatchPhase {
        if !self.session.is_active() {
            MatchPhase::WaitingForPlayers
        } else if self.session.pending_count() > 0 {
            MatchPhase::RoundPending
        } else {
            MatchPhase::Active
        }
    }

    /// Processes one decoded move from `addr` received at `now`
    pub fn handle_move(&mut self, addr: SocketAddr, choice: Move, now: Instant) -> Vec<Outbound> {
        let slot = match self.session.attach(addr) {
            Attachment::Joined(slot) => {
                if self.session.is_active() {
                    info!("Both players connected! Game starting...");
                }
                slot
            }
            Attachment::Existing(slot) => slot,
            Attachment::Full => {
                warn!("Session full, ignoring {} from {}", choice, addr);
                return Vec::new();
            }
        };

        info!("{} chose: {}", slot, choice);

        if choice == Move::End {
            return self.end_by_player(slot);
        }

        self.session.record_move(slot, choice, now);

        if !(self.session.is_active() && self.session.has_pending_pair()) {
            if self.session.is_active() {
                debug!("Waiting for {}'s choice...", slot.opponent());
            } else {
                debug!("Waiting for both players to connect...");
            }
            return Vec::new();
        }

        // A late arrival must not be paired with a move that has already expired.
        if let Some(oldest) = self.session.oldest_pending_timestamp() {
            if now.saturating_duration_since(oldest) > self.rules.round_timeout {
                warn!("Round took too long, {} arrived after the timeout", slot);
                return self.end_by_timeout(slot);
            }
        }

        match (
            self.session.take_pending(Slot::One),
            self.session.take_pending(Slot::Two),
        ) {
            (Some(one), Some(two)) => self.settle_round(one.choice, two.choice, None),
            _ => Vec::new(),
        }
    }

    /// Called when the receive wait expires without traffic
    pub fn handle_idle(&mut self, now: Instant) -> Vec<Outbound> {
        let expired = Slot::ALL.into_iter().find(|slot| {
            self.session.pending(*slot).is_some_and(|pending| {
                now.saturating_duration_since(pending.recorded_at) > self.rules.round_timeout
            })
        });

        match expired {
            Some(waiting) => {
                let silent = waiting.opponent();
                info!("{} timed out (didn't respond)", silent);
                self.end_by_timeout(silent)
            }
            None => Vec::new(),
        }
    }

    /// Settles a round; `ended_by` marks a round forced by an `End` move,
    /// which always finishes the match
    fn settle_round(&mut self, one: Move, two: Move, ended_by: Option<Slot>) -> Vec<Outbound> {
        let outcome = resolve(one, two);
        let winner = self.session.apply_round_result(outcome);

        info!("Round result: Player 1: {} | Player 2: {}", one, two);
        match winner {
            Some(slot) => info!("  Winner: {}", slot),
            None => info!("  Draw!"),
        }
        info!(
            "Score: Player 1: {} | Player 2: {}",
            self.session.score(Slot::One),
            self.session.score(Slot::Two)
        );

        let champion = self.session.is_game_over(self.rules.winning_score);
        let terminal = champion.is_some() || ended_by.is_some();
        let game_status = if terminal {
            GameStatus::Ended
        } else {
            GameStatus::Active
        };

        if let Some(slot) = champion {
            info!("*** GAME OVER! {} wins! ***", slot);
        }

        let outbound = Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                let addr = self.session.addr_of(slot)?;
                let (mine, theirs) = self.session.scores_for(slot);
                let opponent_choice = match slot {
                    Slot::One => two,
                    Slot::Two => one,
                };
                let message = match (champion, ended_by) {
                    (Some(c), _) if c == slot => {
                        format!("YOU WON THE GAME! Final score: {}-{}", mine, theirs)
                    }
                    (Some(_), _) => format!("You lost the game. Final score: {}-{}", mine, theirs),
                    (None, Some(e)) if e == slot => {
                        format!("Game ended by player. Final score: {}-{}", mine, theirs)
                    }
                    (None, Some(_)) => {
                        format!("Opponent ended the game. Final score: {}-{}", mine, theirs)
                    }
                    (None, None) => String::new(),
                };

                Some(Outbound {
                    addr,
                    message: ResultMessage {
                        opponent_choice,
                        result: result_label(outcome, slot),
                        your_score: mine,
                        opponent_score: theirs,
                        game_status,
                        message,
                    },
                })
            })
            .collect();

        if terminal {
            self.reset();
        }
        outbound
    }

    fn end_by_player(&mut self, ender: Slot) -> Vec<Outbound> {
        if let Some(pending) = self.session.take_pending(ender.opponent()) {
            self.session.clear_pending();
            let (one, two) = match ender {
                Slot::One => (Move::End, pending.choice),
                Slot::Two => (pending.choice, Move::End),
            };
            return self.settle_round(one, two, Some(ender));
        }

        info!("{} ended the game.", ender);
        let outbound = self.terminal_notice(|slot| {
            if slot == ender {
                "Game ended by player."
            } else {
                "Opponent ended the game."
            }
        });
        self.reset();
        outbound
    }

    fn end_by_timeout(&mut self, timed_out: Slot) -> Vec<Outbound> {
        info!("{} timed out! Game ended due to timeout.", timed_out);
        let outbound = self.terminal_notice(|slot| {
            if slot == timed_out {
                "You timed out!"
            } else {
                "Opponent timed out!"
            }
        });
        self.reset();
        outbound
    }

    /// Game-over notice for every attached participant, scores unchanged
    fn terminal_notice(&self, text: impl Fn(Slot) -> &'static str) -> Vec<Outbound> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| {
                let addr = self.session.addr_of(slot)?;
                let (mine, theirs) = self.session.scores_for(slot);
                Some(Outbound {
                    addr,
                    message: ResultMessage {
                        opponent_choice: Move::End,
                        result: RoundResult::GameOver,
                        your_score: mine,
                        opponent_score: theirs,
                        game_status: GameStatus::Ended,
                        message: text(slot).to_string(),
                    },
                })
            })
            .collect()
    }

    fn reset(&mut self) {
        self.session.reset();
        info!("Game reset. Waiting for new players...");
    }
}
