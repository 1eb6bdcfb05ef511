use crate::ClientError;
use log::{debug, warn};
use shared::{decode_result, encode_move, Move, ResultMessage, BUFFER_SIZE};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

/// UDP endpoint talking to the match server
///
/// Retransmission is the client's job: if no result arrives within the
/// timeout the caller decides whether to resend or give up.
pub struct GameClient {
    socket: UdpSocket,
    server_addr: SocketAddr,
    timeout: Duration,
}

impl GameClient {
    pub async fn connect(server_addr: SocketAddr, timeout: Duration) -> Result<Self, ClientError> {
        let bind_addr = if server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        debug!(
            "Client socket bound to {}, server at {}",
            socket.local_addr()?,
            server_addr
        );

        Ok(GameClient {
            socket,
            server_addr,
            timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ClientError> {
        Ok(self.socket.local_addr()?)
    }

    pub async fn send_move(&self, choice: Move) -> Result<(), ClientError> {
        self.socket
            .send_to(&encode_move(choice), self.server_addr)
            .await?;
        Ok(())
    }

    /// Waits for the next result from the server, bounded by the client timeout
    pub async fn recv_result(&self) -> Result<ResultMessage, ClientError> {
        timeout(self.timeout, self.next_result())
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }

    /// Datagrams from other senders and undecodable payloads are skipped.
    async fn next_result(&self) -> Result<ResultMessage, ClientError> {
        let mut buffer = [0u8; BUFFER_SIZE];

        loop {
            let (len, from) = self.socket.recv_from(&mut buffer).await?;
            if from != self.server_addr {
                warn!("Ignoring datagram from unexpected sender {}", from);
                continue;
            }
            match decode_result(&buffer[..len]) {
                Ok(message) => return Ok(message),
                Err(e) => warn!("Ignoring malformed result: {}", e),
            }
        }
    }

    /// Sends a move and waits for the server's answer
    pub async fn play(&self, choice: Move) -> Result<ResultMessage, ClientError> {
        self.send_move(choice).await?;
        self.recv_result().await
    }
}
