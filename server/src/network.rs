//! Server network layer handling UDP communications and the idle wakeup

use crate::config::ServerConfig;
use crate::coordinator::{MatchCoordinator, Outbound};
use log::{debug, error, info, warn};
use shared::{decode_move, encode_result};
use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// Single-socket match server
///
/// One receive at a time, fully processed (state transition plus every
/// resulting send) before the next one. The bounded wait on each receive is
/// the only suspension point. Stalled rounds are checked after every
/// datagram as well as on each expired wait, so steady traffic from
/// strangers cannot hold off a timeout.
pub struct Server {
    socket: UdpSocket,
    coordinator: MatchCoordinator,
    poll_interval: Duration,
    max_datagram_size: usize,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let socket = UdpSocket::bind(config.bind_addr).await?;
        info!("Server listening on {}", socket.local_addr()?);
        info!(
            "Game settings: first to {} points wins, {}s round timeout",
            config.winning_score,
            config.round_timeout.as_secs_f32()
        );

        Ok(Server {
            socket,
            coordinator: MatchCoordinator::new(config.rules()),
            poll_interval: config.poll_interval,
            max_datagram_size: config.max_datagram_size,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn coordinator(&self) -> &MatchCoordinator {
        &self.coordinator
    }

    /// Decodes one datagram and feeds it to the coordinator
    async fn handle_datagram(&mut self, data: &[u8], addr: SocketAddr) {
        if data.len() > self.max_datagram_size {
            warn!(
                "Dropping oversized datagram from {} ({} bytes, limit {})",
                addr,
                data.len(),
                self.max_datagram_size
            );
            return;
        }

        let choice = match decode_move(data) {
            Ok(choice) => choice,
            Err(e) => {
                warn!("Dropping datagram from {}: {}", addr, e);
                return;
            }
        };

        let outbound = self.coordinator.handle_move(addr, choice, Instant::now());
        self.send_all(outbound).await;
    }

    async fn check_stalled_round(&mut self) {
        let outbound = self.coordinator.handle_idle(Instant::now());
        self.send_all(outbound).await;
    }

    /// Best-effort delivery; a failure for one address does not stop the others
    async fn send_all(&self, outbound: Vec<Outbound>) {
        for Outbound { addr, message } in outbound {
            let data = match encode_result(&message) {
                Ok(data) => data,
                Err(e) => {
                    error!("Failed to encode result for {}: {}", addr, e);
                    continue;
                }
            };

            if let Err(e) = self.socket.send_to(&data, addr).await {
                error!("Failed to send result to {}: {}", addr, e);
            }
        }
    }

    /// Runs until Ctrl+C
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await
    }

    /// Runs until `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        // One spare byte so an oversized datagram is detected instead of truncated
        let mut buffer = vec![0u8; self.max_datagram_size + 1];

        info!("Server started successfully. Waiting for players to connect...");

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Server shutting down...");
                    break;
                }

                received = timeout(self.poll_interval, self.socket.recv_from(&mut buffer)) => {
                    match received {
                        Ok(Ok((len, addr))) => {
                            self.handle_datagram(&buffer[..len], addr).await;
                            self.check_stalled_round().await;
                        }
                        Ok(Err(e)) => {
                            error!("Error receiving datagram: {}", e);
                        }
                        Err(_) => {
                            debug!("No traffic for {:?}, checking pending moves", self.poll_interval);
                            self.check_stalled_round().await;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::MatchPhase;
    use shared::{decode_result, GameStatus, RoundResult};
    use tokio::sync::oneshot;
    use tokio_test::assert_ok;

    fn test_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            round_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(20),
            ..ServerConfig::default()
        }
    }

    async fn recv_result(socket: &UdpSocket) -> shared::ResultMessage {
        let mut buf = [0u8; 1024];
        let (len, _) = timeout(Duration::from_secs(2), socket.recv_from(&mut buf))
            .await
            .expect("timed out waiting for result")
            .unwrap();
        decode_result(&buf[..len]).unwrap()
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let config = ServerConfig {
            winning_score: 0,
            ..test_config()
        };
        assert!(Server::bind(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_reports_local_addr() {
        let server = assert_ok!(Server::bind(&test_config()).await);
        let addr = assert_ok!(server.local_addr());
        assert_ne!(addr.port(), 0);
        assert_eq!(server.coordinator().phase(), MatchPhase::WaitingForPlayers);
    }

    #[tokio::test]
    async fn test_handle_datagram_drops_unknown_token() {
        let mut server = Server::bind(&test_config()).await.unwrap();
        let addr: SocketAddr = "127.0.0.1:40001".parse().unwrap();

        server.handle_datagram(b"LIZARD", addr).await;
        assert_eq!(server.coordinator().session().participant_count(), 0);

        server.handle_datagram(b"r", addr).await;
        assert_eq!(server.coordinator().session().participant_count(), 1);
    }

    #[tokio::test]
    async fn test_handle_datagram_drops_oversized_payload() {
        let config = ServerConfig {
            max_datagram_size: 8,
            ..test_config()
        };
        let mut server = Server::bind(&config).await.unwrap();
        let addr: SocketAddr = "127.0.0.1:40002".parse().unwrap();

        server.handle_datagram(b"R       garbage", addr).await;
        assert_eq!(server.coordinator().session().participant_count(), 0);

        server.handle_datagram(b"R       ", addr).await;
        assert_eq!(server.coordinator().session().participant_count(), 1);
    }

    #[tokio::test]
    async fn test_oversized_datagram_over_loopback_gets_no_slot() {
        let config = ServerConfig {
            max_datagram_size: 8,
            ..test_config()
        };
        let mut server = Server::bind(&config).await.unwrap();
        let server_addr = server.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await
                .map_err(|e| e.to_string())
        });

        let padded = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let one = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let two = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        padded.send_to(b"R       garbage", server_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The padded sender never took a slot, so these two form the pair.
        one.send_to(b"S", server_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        two.send_to(b"R", server_addr).await.unwrap();

        let r1 = recv_result(&one).await;
        let r2 = recv_result(&two).await;
        assert_eq!(r1.result, RoundResult::Lose);
        assert_eq!(r2.result, RoundResult::Win);

        stop_tx.send(()).unwrap();
        assert_ok!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_round_over_loopback() {
        let mut server = Server::bind(&test_config()).await.unwrap();
        let server_addr = server.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await
                .map_err(|e| e.to_string())
        });

        let one = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let two = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        one.send_to(b"R", server_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        two.send_to(b"P", server_addr).await.unwrap();

        let r1 = recv_result(&one).await;
        let r2 = recv_result(&two).await;
        assert_eq!(r1.result, RoundResult::Lose);
        assert_eq!(r2.result, RoundResult::Win);
        assert_eq!(r2.your_score, 1);
        assert_eq!(r1.game_status, GameStatus::Active);

        stop_tx.send(()).unwrap();
        assert_ok!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_idle_wakeup_reports_timeout() {
        let mut server = Server::bind(&test_config()).await.unwrap();
        let server_addr = server.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await
                .map_err(|e| e.to_string())
        });

        let lonely = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        lonely.send_to(b"S", server_addr).await.unwrap();

        let result = recv_result(&lonely).await;
        assert_eq!(result.game_status, GameStatus::Ended);
        assert_eq!(result.message, "Opponent timed out!");

        stop_tx.send(()).unwrap();
        assert_ok!(handle.await.unwrap());
    }

    #[tokio::test]
    async fn test_timeout_fires_under_steady_stranger_traffic() {
        let mut server = Server::bind(&test_config()).await.unwrap();
        let server_addr = server.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await
                .map_err(|e| e.to_string())
        });

        let one = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let two = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        one.send_to(b"R", server_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        two.send_to(b"R", server_addr).await.unwrap();
        assert_eq!(recv_result(&one).await.result, RoundResult::Draw);
        assert_eq!(recv_result(&two).await.result, RoundResult::Draw);

        one.send_to(b"P", server_addr).await.unwrap();

        // A third address keeps the socket busy well inside the poll interval.
        let stranger = tokio::spawn(async move {
            let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
            loop {
                let _ = socket.send_to(b"R", server_addr).await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let r1 = recv_result(&one).await;
        let r2 = recv_result(&two).await;
        stranger.abort();

        assert_eq!(r1.game_status, GameStatus::Ended);
        assert_eq!(r1.message, "Opponent timed out!");
        assert_eq!(r2.game_status, GameStatus::Ended);
        assert_eq!(r2.message, "You timed out!");

        stop_tx.send(()).unwrap();
        assert_ok!(handle.await.unwrap());
    }
}
