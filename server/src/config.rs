//! Startup configuration for the match server

use crate::coordinator::MatchRules;
use shared::{BUFFER_SIZE, CLIENT_TIMEOUT, DEFAULT_PORT, ROUND_TIMEOUT, WINNING_SCORE};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("winning score must be at least 1")]
    ZeroWinningScore,
    #[error("maximum datagram size must be at least 1 byte")]
    ZeroDatagramSize,
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
    #[error("round timeout {round:?} must be shorter than the client timeout {client:?}")]
    RoundTimeoutTooLong { round: Duration, client: Duration },
}

/// Values fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the UDP socket binds to
    pub bind_addr: SocketAddr,
    /// How long a buffered move may wait for its counterpart
    pub round_timeout: Duration,
    /// Bounded wait of each receive; expiry triggers the idle check
    pub poll_interval: Duration,
    /// Score that ends the match
    pub winning_score: u32,
    /// Largest datagram accepted; longer ones are dropped
    pub max_datagram_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            round_timeout: ROUND_TIMEOUT,
            poll_interval: Duration::from_millis(500),
            winning_score: WINNING_SCORE,
            max_datagram_size: BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn rules(&self) -> MatchRules {
        MatchRules {
            winning_score: self.winning_score,
            round_timeout: self.round_timeout,
        }
    }

    /// The server must notice a stale round before the client gives up waiting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.winning_score == 0 {
            return Err(ConfigError::ZeroWinningScore);
        }
        if self.max_datagram_size == 0 {
            return Err(ConfigError::ZeroDatagramSize);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.round_timeout >= CLIENT_TIMEOUT {
            return Err(ConfigError::RoundTimeoutTooLong {
                round: self.round_timeout,
                client: CLIENT_TIMEOUT,
            });
        }
        Ok(())
    }
}
