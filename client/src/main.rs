use clap::Parser;
use client::input::MoveSource;
use client::network::GameClient;
use client::{rendering, ClientError};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Move, CLIENT_TIMEOUT};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5555")]
    server: SocketAddr,

    /// Comma separated moves to play in order, e.g. R,P,S
    #[arg(short = 'm', long)]
    moves: Option<String>,

    /// Number of random moves to play when no script is given
    #[arg(short = 'r', long, default_value = "5")]
    rounds: u32,

    /// Seconds to wait for each server response
    #[arg(short = 't', long, default_value_t = CLIENT_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut source: MoveSource<StdRng> = match &args.moves {
        Some(list) => MoveSource::scripted(list).map_err(ClientError::from)?,
        None => MoveSource::random(StdRng::from_entropy(), args.rounds),
    };

    let client = GameClient::connect(args.server, Duration::from_secs(args.timeout_secs)).await?;
    info!("Connected to server at {}", args.server);

    loop {
        // Out of moves: leave the match explicitly.
        let choice = source.next_move().unwrap_or(Move::End);
        info!("Sent: {}. Waiting for opponent...", choice);

        match client.play(choice).await {
            Ok(result) => {
                println!("{}", rendering::describe(&result));
                if result.is_final() {
                    info!("Game over. Disconnecting...");
                    break;
                }
            }
            Err(ClientError::Timeout(waited)) => {
                warn!("Timeout! Server not responding after {:?}", waited);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
