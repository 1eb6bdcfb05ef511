use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::Server;
use shared::{BUFFER_SIZE, DEFAULT_PORT, WINNING_SCORE};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds a move may wait for the opponent's move
    #[arg(short, long, default_value = "40")]
    timeout_secs: u64,

    /// Receive wait in milliseconds before checking for stalled rounds
    #[arg(long, default_value = "500")]
    poll_interval_ms: u64,

    /// Points needed to win the game
    #[arg(short, long, default_value_t = WINNING_SCORE)]
    winning_score: u32,

    /// Largest datagram accepted, in bytes
    #[arg(long, default_value_t = BUFFER_SIZE)]
    max_datagram_size: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            bind_addr: SocketAddr::new(args.host, args.port),
            round_timeout: Duration::from_secs(args.timeout_secs),
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            winning_score: args.winning_score,
            max_datagram_size: args.max_datagram_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ServerConfig::from(Args::parse());
    let mut server = Server::bind(&config).await?;

    server.run().await?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_gives_default_config() {
        let config = ServerConfig::from(Args::parse_from(["server"]));
        let expected = ServerConfig::default();

        assert_eq!(config.bind_addr, expected.bind_addr);
        assert_eq!(config.round_timeout, expected.round_timeout);
        assert_eq!(config.poll_interval, expected.poll_interval);
        assert_eq!(config.winning_score, expected.winning_score);
        assert_eq!(config.max_datagram_size, expected.max_datagram_size);
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from(["server", "-p", "6000", "-t", "10", "-w", "5"]);
        let config = ServerConfig::from(args);

        assert_eq!(config.bind_addr.port(), 6000);
        assert_eq!(config.round_timeout, Duration::from_secs(10));
        assert_eq!(config.winning_score, 5);
    }
}
