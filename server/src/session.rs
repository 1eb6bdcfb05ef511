//! State of the single live match hosted by the server
//!
//! This module owns everything the coordinator mutates while a match runs:
//! - Participant roster mapping transport addresses to slots and back
//! - The latest unmatched move per slot, stamped with its arrival time
//! - Running scores for both slots
//!
//! The session is never destroyed. When a match ends it is reset in place and
//! the next two addresses to send a move become the new participants.

use log::info;
use shared::{Move, Outcome, Slot};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

fn index(slot: Slot) -> usize {
    match slot {
        Slot::One => 0,
        Slot::Two => 1,
    }
}

/// A playable move waiting for the opponent's counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingMove {
    pub choice: Move,
    pub recorded_at: Instant,
}

/// Result of an attach attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Address was new and took the next free slot
    Joined(Slot),
    /// Address was already attached
    Existing(Slot),
    /// Both slots are taken by other addresses
    Full,
}

impl Attachment {
    pub fn slot(self) -> Option<Slot> {
        match self {
            Attachment::Joined(slot) | Attachment::Existing(slot) => Some(slot),
            Attachment::Full => None,
        }
    }
}

/// Bidirectional address/slot mapping
///
/// Both directions are only ever written through `insert`, so they always agree.
#[derive(Debug, Default)]
struct Roster {
    by_addr: HashMap<SocketAddr, Slot>,
    by_slot: [Option<SocketAddr>; 2],
}

impl Roster {
    fn slot_of(&self, addr: SocketAddr) -> Option<Slot> {
        self.by_addr.get(&addr).copied()
    }

    fn addr_of(&self, slot: Slot) -> Option<SocketAddr> {
        self.by_slot[index(slot)]
    }

    fn next_free(&self) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|slot| self.by_slot[index(*slot)].is_none())
    }

    fn insert(&mut self, addr: SocketAddr, slot: Slot) {
        self.by_addr.insert(addr, slot);
        self.by_slot[index(slot)] = Some(addr);
    }

    fn len(&self) -> usize {
        self.by_addr.len()
    }

    fn clear(&mut self) {
        self.by_addr.clear();
        self.by_slot = [None, None];
    }
}

/// Participants, scores and buffered moves of the current match
#[derive(Debug, Default)]
pub struct Session {
    roster: Roster,
    scores: [u32; 2],
    pending: [Option<PendingMove>; 2],
    active: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next free slot to a new address in arrival order
    ///
    /// A known address gets its existing slot back. A new address arriving
    /// while both slots are taken is rejected without touching any state.
    pub fn attach(&mut self, addr: SocketAddr) -> Attachment {
        if let Some(slot) = self.roster.slot_of(addr) {
            return Attachment::Existing(slot);
        }

        let Some(slot) = self.roster.next_free() else {
            return Attachment::Full;
        };

        self.roster.insert(addr, slot);
        info!("{} connected from {}", slot, addr);

        if self.roster.len() == 2 {
            self.active = true;
        }

        Attachment::Joined(slot)
    }

    pub fn slot_of(&self, addr: SocketAddr) -> Option<Slot> {
        self.roster.slot_of(addr)
    }

    pub fn addr_of(&self, slot: Slot) -> Option<SocketAddr> {
        self.roster.addr_of(slot)
    }

    pub fn participant_count(&self) -> usize {
        self.roster.len()
    }

    /// True once both slots are filled
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Buffers a playable move for `slot`
    ///
    /// Only the latest move per slot is kept, but a replacement keeps the
    /// first arrival time so retransmissions cannot postpone a timeout.
    /// `End` is never buffered and returns false.
    pub fn record_move(&mut self, slot: Slot, choice: Move, at: Instant) -> bool {
        if !choice.is_playable() {
            return false;
        }

        let entry = &mut self.pending[index(slot)];
        let recorded_at = entry.map_or(at, |existing| existing.recorded_at.min(at));
        *entry = Some(PendingMove {
            choice,
            recorded_at,
        });
        true
    }

    pub fn pending(&self, slot: Slot) -> Option<PendingMove> {
        self.pending[index(slot)]
    }

    pub fn take_pending(&mut self, slot: Slot) -> Option<PendingMove> {
        self.pending[index(slot)].take()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.iter().filter(|p| p.is_some()).count()
    }

    pub fn has_pending_pair(&self) -> bool {
        self.pending_count() == 2
    }

    /// Arrival time of the oldest buffered move, if any
    pub fn oldest_pending_timestamp(&self) -> Option<Instant> {
        self.pending.iter().flatten().map(|p| p.recorded_at).min()
    }

    pub fn clear_pending(&mut self) {
        self.pending = [None, None];
    }

    /// Adds one point to the round's winner and returns it; draws change nothing
    pub fn apply_round_result(&mut self, outcome: Outcome) -> Option<Slot> {
        let winner = outcome.winner()?;
        self.scores[index(winner)] += 1;
        Some(winner)
    }

    pub fn score(&self, slot: Slot) -> u32 {
        self.scores[index(slot)]
    }

    /// Scores as (own, opponent) from the viewpoint of `slot`
    pub fn scores_for(&self, slot: Slot) -> (u32, u32) {
        (self.score(slot), self.score(slot.opponent()))
    }

    /// Slot that has reached `threshold`, if any
    pub fn is_game_over(&self, threshold: u32) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|slot| self.score(*slot) >= threshold)
    }

    /// Clears participants, pending moves and scores
    pub fn reset(&mut self) {
        self.roster.clear();
        self.scores = [0, 0];
        self.clear_pending();
        self.active = false;
    }
}
