//! # Match Server Library
//!
//! Authoritative rock/paper/scissors arbiter for two players over UDP. The
//! server pairs the first two addresses that send a move into a session,
//! settles each round, keeps score and tells both players when the game is
//! over, whether by score, by an `END` move or because one side went silent.
//!
//! ## Core Responsibilities
//!
//! ### Matchmaking Without a Handshake
//! There is no connect packet. The first datagram from an unknown address
//! claims the next free slot; a third address is ignored until the current
//! match ends.
//!
//! ### Round Arbitration
//! Each participant has at most one buffered move. When both sides have one,
//! the round is resolved with the shared rules and both players receive a
//! result message carrying the opponent's choice and the updated scores.
//!
//! ### Recovery
//! Datagrams can be lost, so a buffered move that waits longer than the round
//! timeout ends the match for both players. Every match ends with a terminal
//! notification to each attached participant followed by a full reset.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! One receive at a time, fully processed before the next. The session is
//! owned by the coordinator and only touched from the loop, so no locks are
//! needed around game state.
//!
//! ### Idle Wakeup
//! Every receive is bounded by a poll interval. When it expires the
//! coordinator checks for a stalled round, which lets the server notice a
//! silent player even when no traffic arrives at all.
//!
//! ## Module Organization
//!
//! ### Session Module (`session`)
//! Participants, scores and pending moves of the live match.
//!
//! ### Coordinator Module (`coordinator`)
//! The state machine mapping inbound moves and idle wakeups to transitions
//! and outbound result messages.
//!
//! ### Network Module (`network`)
//! UDP socket, receive loop with bounded wait, and best-effort delivery.
//!
//! ### Config Module (`config`)
//! Startup constants and their validation.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::bind(&ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod network;
pub mod session;
