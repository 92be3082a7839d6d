use crate::core_error::{SessionError, SessionResult};
use crate::core_network::pasv::setup_pasv_listener;
use crate::core_network::port::setup_port_connection;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::mem;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

/// What happens to the data-connection mode once a transfer has used it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataChannelPolicy {
    /// The mode, and a passive listener, stay in place for later transfers.
    #[default]
    Persist,
    /// Each transfer consumes the mode; the next one needs PASV or PORT again.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    None,
    Passive,
    Active,
}

/// An open passive listener. Dropping it closes the socket and aborts any
/// transfer task still waiting for a client on it.
#[derive(Debug)]
struct PassiveListener {
    listener: Arc<TcpListener>,
    local_addr: SocketAddr,
    closed: watch::Sender<()>,
}

impl PassiveListener {
    fn acceptor(&self) -> PendingAccept {
        PendingAccept {
            listener: Arc::clone(&self.listener),
            closed: self.closed.subscribe(),
            owned: None,
        }
    }

    fn into_acceptor(self) -> PendingAccept {
        let mut acceptor = self.acceptor();
        acceptor.owned = Some(self);
        acceptor
    }
}

#[derive(Debug)]
enum DataChannel {
    None,
    Passive(PassiveListener),
    Active(SocketAddr),
}

/// A single inbound connection still to be accepted on a passive listener.
#[derive(Debug)]
pub struct PendingAccept {
    listener: Arc<TcpListener>,
    closed: watch::Receiver<()>,
    // Set when the transfer took the listener over (reset policy), so the
    // socket lives exactly as long as this accept.
    owned: Option<PassiveListener>,
}

impl PendingAccept {
    pub async fn accept(mut self) -> io::Result<TcpStream> {
        tokio::select! {
            accepted = self.listener.accept() => {
                let (data_stream, addr) = accepted?;
                debug!("Accepted data connection from: {}", addr);
                Ok(data_stream)
            }
            _ = self.closed.changed() => Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "passive listener was closed before a client connected",
            )),
        }
    }
}

/// How a transfer task gets hold of its data connection.
#[derive(Debug)]
pub enum PendingConnection {
    Accept(PendingAccept),
    Dial(SocketAddr),
}

impl PendingConnection {
    pub async fn establish(self) -> io::Result<TcpStream> {
        match self {
            PendingConnection::Accept(acceptor) => acceptor.accept().await,
            PendingConnection::Dial(addr) => setup_port_connection(addr).await,
        }
    }
}

impl fmt::Display for PendingConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingConnection::Accept(acceptor) => match acceptor.listener.local_addr() {
                Ok(addr) => write!(f, "accept on {}", addr),
                Err(_) => write!(f, "accept on closed listener"),
            },
            PendingConnection::Dial(addr) => write!(f, "dial {}", addr),
        }
    }
}

/// Owns the NONE / PASSIVE / ACTIVE state of one session's data channel.
///
/// The listener and the peer address live inside the variant they belong
/// to, so at most one of them exists at any time.
#[derive(Debug)]
pub struct DataChannelManager {
    channel: DataChannel,
    policy: DataChannelPolicy,
}

impl DataChannelManager {
    pub fn new(policy: DataChannelPolicy) -> Self {
        Self {
            channel: DataChannel::None,
            policy,
        }
    }

    pub fn policy(&self) -> DataChannelPolicy {
        self.policy
    }

    pub fn mode(&self) -> Mode {
        match self.channel {
            DataChannel::None => Mode::None,
            DataChannel::Passive(_) => Mode::Passive,
            DataChannel::Active(_) => Mode::Active,
        }
    }

    pub fn passive_addr(&self) -> Option<SocketAddr> {
        match &self.channel {
            DataChannel::Passive(passive) => Some(passive.local_addr),
            _ => None,
        }
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        match self.channel {
            DataChannel::Active(addr) => Some(addr),
            _ => None,
        }
    }

    /// Opens a new passive listener on `host` and switches to PASSIVE.
    ///
    /// The new socket is bound before the current state is touched, so a
    /// failed bind leaves the previous mode in place.
    pub fn enter_passive(&mut self, host: IpAddr) -> io::Result<SocketAddr> {
        let listener = setup_pasv_listener(host)?;
        let local_addr = listener.local_addr()?;
        let (closed, _) = watch::channel(());

        let previous = mem::replace(
            &mut self.channel,
            DataChannel::Passive(PassiveListener {
                listener: Arc::new(listener),
                local_addr,
                closed,
            }),
        );
        if let DataChannel::Passive(old) = previous {
            debug!("Closing superseded passive listener on {}", old.local_addr);
        }

        info!("Entered passive mode on {}", local_addr);
        Ok(local_addr)
    }

    /// Remembers the client's address and switches to ACTIVE, closing any
    /// passive listener.
    pub fn enter_active(&mut self, peer: SocketAddr) {
        if let DataChannel::Passive(old) =
            mem::replace(&mut self.channel, DataChannel::Active(peer))
        {
            debug!("Closing passive listener on {}", old.local_addr);
        }
        info!("Entered active mode, peer {}", peer);
    }

    /// Hands out the means to open the data connection of the next transfer.
    ///
    /// Under [`DataChannelPolicy::Reset`] the current mode is consumed and
    /// the manager goes back to NONE.
    pub fn obtain_connection(&mut self) -> SessionResult<PendingConnection> {
        match self.policy {
            DataChannelPolicy::Persist => match &self.channel {
                DataChannel::None => Err(SessionError::NoDataConnection),
                DataChannel::Passive(passive) => Ok(PendingConnection::Accept(passive.acceptor())),
                DataChannel::Active(peer) => Ok(PendingConnection::Dial(*peer)),
            },
            DataChannelPolicy::Reset => match mem::replace(&mut self.channel, DataChannel::None) {
                DataChannel::None => Err(SessionError::NoDataConnection),
                DataChannel::Passive(passive) => {
                    Ok(PendingConnection::Accept(passive.into_acceptor()))
                }
                DataChannel::Active(peer) => Ok(PendingConnection::Dial(peer)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_starts_without_data_connection() {
        let mut manager = DataChannelManager::new(DataChannelPolicy::Persist);
        assert_eq!(manager.mode(), Mode::None);
        assert!(matches!(
            manager.obtain_connection(),
            Err(SessionError::NoDataConnection)
        ));
    }

    #[tokio::test]
    async fn test_passive_then_active_clears_listener() {
        let mut manager = DataChannelManager::new(DataChannelPolicy::Persist);
        let addr = manager.enter_passive(LOCALHOST).unwrap();
        assert_eq!(manager.mode(), Mode::Passive);
        assert_eq!(manager.passive_addr(), Some(addr));
        assert_eq!(manager.peer_addr(), None);

        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        manager.enter_active(peer);
        assert_eq!(manager.mode(), Mode::Active);
        assert_eq!(manager.passive_addr(), None);
        assert_eq!(manager.peer_addr(), Some(peer));

        // The old listener is gone.
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_second_pasv_replaces_listener() {
        let mut manager = DataChannelManager::new(DataChannelPolicy::Persist);
        let first = manager.enter_passive(LOCALHOST).unwrap();
        let second = manager.enter_passive(LOCALHOST).unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.passive_addr(), Some(second));
        assert!(TcpStream::connect(first).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_bind_keeps_previous_state() {
        let mut manager = DataChannelManager::new(DataChannelPolicy::Persist);
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        manager.enter_active(peer);

        // TEST-NET-3 is never assigned to a local interface.
        let unreachable = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));
        assert!(manager.enter_passive(unreachable).is_err());
        assert_eq!(manager.mode(), Mode::Active);
        assert_eq!(manager.peer_addr(), Some(peer));
    }

    #[tokio::test]
    async fn test_persist_policy_accepts_repeatedly() {
        let mut manager = DataChannelManager::new(DataChannelPolicy::Persist);
        let addr = manager.enter_passive(LOCALHOST).unwrap();

        for round in 0u8..2 {
            let pending = manager.obtain_connection().unwrap();
            let accept = tokio::spawn(pending.establish());
            let mut client = TcpStream::connect(addr).await.unwrap();
            let mut server = accept.await.unwrap().unwrap();
            server.write_all(&[round]).await.unwrap();
            let mut buf = [0u8; 1];
            client.read_exact(&mut buf).await.unwrap();
            assert_eq!(buf[0], round);
        }
        assert_eq!(manager.mode(), Mode::Passive);
    }

    #[tokio::test]
    async fn test_reset_policy_consumes_mode() {
        let mut manager = DataChannelManager::new(DataChannelPolicy::Reset);
        let addr = manager.enter_passive(LOCALHOST).unwrap();

        let pending = manager.obtain_connection().unwrap();
        assert_eq!(manager.mode(), Mode::None);
        assert!(matches!(
            manager.obtain_connection(),
            Err(SessionError::NoDataConnection)
        ));

        // The consumed listener still serves its one accept.
        let accept = tokio::spawn(pending.establish());
        let _client = TcpStream::connect(addr).await.unwrap();
        assert!(accept.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_superseded_listener_aborts_pending_accept() {
        let mut manager = DataChannelManager::new(DataChannelPolicy::Persist);
        manager.enter_passive(LOCALHOST).unwrap();
        let pending = manager.obtain_connection().unwrap();
        let accept = tokio::spawn(pending.establish());

        manager.enter_active("127.0.0.1:4000".parse().unwrap());
        let err = accept.await.unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionAborted);
    }
}
