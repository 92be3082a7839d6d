//! End-to-end behaviour of a session over real loopback sockets and a
//! temporary confinement root.

use rouillexfer::core_network::{DataChannelPolicy, Mode};
use rouillexfer::{Session, SessionError};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn srv_root() -> TempDir {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("docs")).unwrap();
    std::fs::write(root.path().join("docs/readme.txt"), b"Welcome to the docs.\n").unwrap();
    std::fs::write(root.path().join("docs/changelog.md"), b"# Changes\n").unwrap();
    root
}

fn session_in(root: &Path) -> Session {
    Session::new(root.to_path_buf(), LOCALHOST)
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

#[tokio::test]
async fn docs_scenario_passive_get() {
    let root = srv_root();
    let mut session = session_in(root.path());

    session.cd("docs").unwrap();
    assert_eq!(session.pwd(), "/docs/");
    assert_eq!(session.dir().await.unwrap(), vec!["changelog.md", "readme.txt"]);

    let addr = session.pasv().unwrap();
    assert_eq!(addr.ip(), LOCALHOST);
    assert_ne!(addr.port(), 0);

    let transfer = session.get("readme.txt").await.unwrap();
    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut received = Vec::new();
    // Returns only once the server closes the connection after EOF.
    client.read_to_end(&mut received).await.unwrap();

    assert_eq!(received, b"Welcome to the docs.\n");
    assert!(transfer.wait().await.is_complete());
}

#[tokio::test]
async fn passive_put_then_get_round_trip() {
    let root = srv_root();
    let mut session = session_in(root.path());
    let data = payload(5 * 512 + 77);

    let addr = session.pasv().unwrap();
    let upload = session.put("blob.bin").await.unwrap();
    let mut client = TcpStream::connect(addr).await.unwrap();
    client.write_all(&data).await.unwrap();
    client.shutdown().await.unwrap();
    drop(client);

    let report = upload.wait().await;
    assert!(report.is_complete(), "{:?}", report.error);
    assert_eq!(report.bytes, data.len() as u64);
    assert_eq!(std::fs::read(root.path().join("blob.bin")).unwrap(), data);

    // Same listener, same mode: nothing to re-negotiate.
    assert_eq!(session.mode(), Mode::Passive);
    let download = session.get("blob.bin").await.unwrap();
    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();

    assert_eq!(received, data);
    assert_eq!(download.wait().await.bytes, data.len() as u64);
}

#[tokio::test]
async fn active_get_dials_the_client() {
    let root = srv_root();
    let mut session = session_in(root.path());
    session.cd("docs").unwrap();

    let client_listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    session.port(client_listener.local_addr().unwrap());

    let transfer = session.get("changelog.md").await.unwrap();
    let (mut conn, _) = client_listener.accept().await.unwrap();
    let mut received = Vec::new();
    conn.read_to_end(&mut received).await.unwrap();

    assert_eq!(received, b"# Changes\n");
    assert!(transfer.wait().await.is_complete());
}

#[tokio::test]
async fn active_put_receives_from_the_client() {
    let root = srv_root();
    let mut session = session_in(root.path());
    let data = payload(2048);

    let client_listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    session.port(client_listener.local_addr().unwrap());

    let transfer = session.put("upload.bin").await.unwrap();
    let (mut conn, _) = client_listener.accept().await.unwrap();
    conn.write_all(&data).await.unwrap();
    conn.shutdown().await.unwrap();
    drop(conn);

    assert!(transfer.wait().await.is_complete());
    assert_eq!(std::fs::read(root.path().join("upload.bin")).unwrap(), data);
}

#[tokio::test]
async fn active_put_without_client_listener_leaves_empty_file() {
    let root = srv_root();
    let mut session = session_in(root.path());

    let gone = std::net::TcpListener::bind((LOCALHOST, 0)).unwrap();
    let client_addr = gone.local_addr().unwrap();
    drop(gone);
    session.port(client_addr);

    // The control call succeeds; the dial fails inside the task.
    let transfer = session.put("upload.bin").await.unwrap();
    let report = transfer.wait().await;
    assert!(!report.is_complete());

    let metadata = std::fs::metadata(root.path().join("upload.bin")).unwrap();
    assert_eq!(metadata.len(), 0);

    // The session is still usable.
    assert_eq!(session.pwd(), "/");
    assert!(session.dir().await.is_ok());
}

#[tokio::test]
async fn transfers_before_pasv_or_port_fail() {
    let root = srv_root();
    let mut session = session_in(root.path());
    session.cd("docs").unwrap();

    assert!(matches!(
        session.get("readme.txt").await,
        Err(SessionError::NoDataConnection)
    ));
    assert!(matches!(
        session.put("new.txt").await,
        Err(SessionError::NoDataConnection)
    ));
    assert!(!root.path().join("docs/new.txt").exists());
}

#[tokio::test]
async fn names_with_separator_never_reach_the_filesystem() {
    // The root does not exist, so any lookup would fail with NotFound/Io.
    let mut session = Session::new("/nonexistent/rouillexfer-root".into(), LOCALHOST);
    session.pasv().unwrap();

    for name in ["a/b", "/etc/passwd", "../../x"] {
        assert!(matches!(session.cd(name), Err(SessionError::InvalidName(_))));
        assert!(matches!(session.get(name).await, Err(SessionError::InvalidName(_))));
        assert!(matches!(session.put(name).await, Err(SessionError::InvalidName(_))));
    }
    assert_eq!(session.pwd(), "/");
}

#[tokio::test]
async fn pwd_tracks_nested_pushes() {
    let root = TempDir::new().unwrap();
    let segments = ["s1", "s2", "s3", "s4"];
    std::fs::create_dir_all(root.path().join(segments.join("/"))).unwrap();
    let mut session = session_in(root.path());

    let mut expected = String::from("/");
    for segment in segments {
        session.cd(segment).unwrap();
        expected.push_str(segment);
        expected.push('/');
        assert_eq!(session.pwd(), expected);
    }
    assert_eq!(session.pwd(), "/s1/s2/s3/s4/");

    for _ in segments {
        session.cd("..").unwrap();
    }
    assert!(matches!(session.cd(".."), Err(SessionError::RootBoundary)));
    assert_eq!(session.pwd(), "/");
}

#[tokio::test]
async fn reset_policy_requires_new_mode_per_transfer() {
    let root = srv_root();
    let mut session = Session::with_options(
        root.path().to_path_buf(),
        LOCALHOST,
        DataChannelPolicy::Reset,
        512,
    );
    session.cd("docs").unwrap();

    let addr = session.pasv().unwrap();
    let transfer = session.get("readme.txt").await.unwrap();
    assert_eq!(session.mode(), Mode::None);

    let mut client = TcpStream::connect(addr).await.unwrap();
    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();
    assert!(transfer.wait().await.is_complete());

    assert!(matches!(
        session.get("readme.txt").await,
        Err(SessionError::NoDataConnection)
    ));
    // The consumed listener is closed after its single accept.
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn new_pasv_aborts_transfer_waiting_on_old_listener() {
    let root = srv_root();
    let mut session = session_in(root.path());
    session.cd("docs").unwrap();

    let first = session.pasv().unwrap();
    let stranded = session.get("readme.txt").await.unwrap();
    let second = session.pasv().unwrap();
    assert_ne!(first, second);

    let report = stranded.wait().await;
    assert!(!report.is_complete());
    assert_eq!(report.bytes, 0);
}
