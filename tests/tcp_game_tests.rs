#![cfg(feature = "std")]

use rand::{rngs::SmallRng, SeedableRng};
use seabattle::transport::tcp::{read_frame, write_frame, ClientTcpTransport};
use seabattle::transport::Transport;
use seabattle::{
    serve_tcp, Bot, ClientMessage, ClientNode, ClientResult, Difficulty, Hub, HubHandle, MatchMode, MemoryStats,
    PlayerIdentity, ServerConfig, ServerMessage, PROTOCOL_VERSION,
};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

async fn start_server() -> anyhow::Result<(std::net::SocketAddr, HubHandle)> {
    start_server_with(ServerConfig::default()).await
}

async fn start_server_with(config: ServerConfig) -> anyhow::Result<(std::net::SocketAddr, HubHandle)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (hub, handle) = Hub::new(&config, Box::new(MemoryStats::new()));
    tokio::spawn(hub.run());
    let accept_handle = handle.clone();
    tokio::spawn(async move { serve_tcp(listener, accept_handle, &config).await });
    Ok((addr, handle))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ai_vs_ai_tcp_game() -> anyhow::Result<()> {
    let (addr, _handle) = start_server().await?;

    let player = |id: &'static str, seed: u64, difficulty: Difficulty| {
        tokio::spawn(async move {
            let transport = ClientTcpTransport::connect(addr).await?;
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut node = ClientNode::new(PlayerIdentity::new(id, id), Bot::new(difficulty), Box::new(transport));
            node.run(&mut rng).await
        })
    };
    let a = player("tcp-a", 10, Difficulty::Hard);
    let b = player("tcp-b", 11, Difficulty::Hard);

    let (a, b) = timeout(Duration::from_secs(30), async { tokio::try_join!(a, b) }).await??;
    let (a, b) = (a?, b?);
    assert!(
        (a.result == ClientResult::Won && b.result == ClientResult::Lost)
            || (a.result == ClientResult::Lost && b.result == ClientResult::Won)
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_over_tcp() -> anyhow::Result<()> {
    let (addr, _handle) = start_server().await?;
    let mut t = ClientTcpTransport::connect(addr).await?;
    t.send(ClientMessage::Hello { version: PROTOCOL_VERSION }).await?;
    assert_eq!(t.recv().await?, ServerMessage::Welcome { version: PROTOCOL_VERSION });
    t.send(ClientMessage::Status).await?;
    assert!(matches!(t.recv().await?, ServerMessage::Status { rooms: 0, .. }));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_garbage_frame_closes_connection() -> anyhow::Result<()> {
    let (addr, _handle) = start_server().await?;
    let mut raw = TcpStream::connect(addr).await?;
    raw.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await?;
    raw.flush().await?;

    // the server drops the connection instead of answering
    let res = timeout(
        Duration::from_secs(5),
        read_frame::<_, ServerMessage>(&mut raw, 1024),
    )
    .await?;
    assert!(res.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tcp_drop_forfeits() -> anyhow::Result<()> {
    let (addr, _handle) = start_server().await?;

    let mut leaver = ClientTcpTransport::connect(addr).await?;
    leaver
        .send(ClientMessage::Matchmake {
            mode: MatchMode::Random,
            room: None,
            player: PlayerIdentity::new("leaver", "Leaver"),
        })
        .await?;
    leaver.send(ClientMessage::Status).await?;
    assert!(matches!(leaver.recv().await?, ServerMessage::Status { waiting: 1, .. }));

    let stayer = tokio::spawn(async move {
        let transport = ClientTcpTransport::connect(addr).await?;
        let mut node = ClientNode::new(
            PlayerIdentity::new("stayer", "Stayer"),
            Bot::new(Difficulty::Easy),
            Box::new(transport),
        );
        node.run(&mut SmallRng::seed_from_u64(12)).await
    });

    assert!(matches!(leaver.recv().await?, ServerMessage::Paired { .. }));
    drop(leaver);

    let outcome = timeout(Duration::from_secs(10), stayer).await???;
    assert_eq!(outcome.result, ClientResult::OpponentLeft);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_write_releases_the_seat() -> anyhow::Result<()> {
    // Matchmake and Status fit in 64 bytes; Paired (uuid room token) does not
    let config = ServerConfig {
        max_message_size: 64,
        ..ServerConfig::default()
    };
    let (addr, _handle) = start_server_with(config).await?;

    // both players keep their sockets open; they only read to see the close
    let mut a = TcpStream::connect(addr).await?;
    let mut b = TcpStream::connect(addr).await?;
    for (stream, id) in [(&mut a, "a"), (&mut b, "b")] {
        let msg = ClientMessage::Matchmake {
            mode: MatchMode::Random,
            room: None,
            player: PlayerIdentity::new(id, id),
        };
        write_frame(stream, &msg, 1024).await?;
    }
    // the Paired notice could not be written, so the server closes both
    for stream in [&mut a, &mut b] {
        let res = timeout(Duration::from_secs(5), read_frame::<_, ServerMessage>(stream, 1024)).await?;
        assert!(res.is_err());
    }

    let mut observer = ClientTcpTransport::connect(addr).await?;
    timeout(Duration::from_secs(5), async {
        loop {
            observer.send(ClientMessage::Status).await?;
            if let ServerMessage::Status { rooms: 0, waiting: 0, .. } = observer.recv().await? {
                return anyhow::Ok(());
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("room was never torn down after the failed write"))??;
    drop((a, b));
    Ok(())
}

#[tokio::test]
async fn test_frame_round_trip_and_limits() -> anyhow::Result<()> {
    let (mut a, mut b) = tokio::io::duplex(4096);
    let msg = ServerMessage::ShotResult {
        row: 3,
        col: 4,
        hit: true,
        sunk: true,
        sunk_cells: vec![(3, 4), (3, 5)],
        shooter: "p".into(),
        game_over: false,
        winner: None,
    };
    write_frame(&mut a, &msg, 1024).await?;
    let got: ServerMessage = read_frame(&mut b, 1024).await?;
    assert_eq!(got, msg);

    let err = write_frame(&mut a, &msg, 4).await.unwrap_err();
    assert!(err.to_string().contains("too large"));

    a.write_all(&[0, 0, 0, 0]).await?;
    let err = read_frame::<_, ServerMessage>(&mut b, 1024).await.unwrap_err();
    assert!(err.to_string().contains("length: 0"));
    Ok(())
}

#[tokio::test]
async fn test_closed_peer_is_reported() -> anyhow::Result<()> {
    let (a, mut b) = tokio::io::duplex(64);
    drop(a);
    let err = read_frame::<_, ClientMessage>(&mut b, 1024).await.unwrap_err();
    assert!(err.to_string().contains("closed"));
    Ok(())
}
