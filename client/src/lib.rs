//! # Game Client Library
//!
//! Client side of the two-player rock/paper/scissors protocol. A client sends
//! a single move token per datagram (`R`, `P`, `S` or `END`) and receives one
//! JSON result message per settled round or terminal event.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! `GameClient` owns an ephemeral UDP socket, sends moves and waits for
//! results with a bounded timeout. The server never retransmits, so a
//! timeout here is the client's signal that the match is lost.
//!
//! ### Input Module (`input`)
//! `MoveSource` supplies moves from a scripted list or at random, so the
//! client binary can play unattended.
//!
//! ### Rendering Module (`rendering`)
//! Plain-text summary of each result message.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::GameClient;
//! use shared::{Move, CLIENT_TIMEOUT};
//!
//! # async fn example() -> Result<(), client::ClientError> {
//! let client = GameClient::connect("127.0.0.1:5555".parse().unwrap(), CLIENT_TIMEOUT).await?;
//! let result = client.play(Move::Rock).await?;
//! println!("{}", client::rendering::describe(&result));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

pub mod input;
pub mod network;
pub mod rendering;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no response from server within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Protocol(#[from] shared::ProtocolError),
}
