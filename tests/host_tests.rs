use std::sync::{mpsc, Arc, Mutex};

use connect4::{
    Client, Host, HostConfig, InMemoryTransport, Intent, MatchRunner, Message, MoveError,
    MoveSource, RandomMover, Rejection, Reply, Session, SessionHooks, SessionId, SessionRegistry,
    Snapshot, Status, Transport, PROTOCOL_VERSION,
};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

fn spawn_host(config: HostConfig) -> (Client<InMemoryTransport>, JoinHandle<anyhow::Result<()>>) {
    let (host_side, client_side) = InMemoryTransport::pair();
    let mut host = Host::new(host_side, config);
    let task = tokio::spawn(async move { host.run().await });
    (Client::new(client_side), task)
}

fn expect_update(reply: Reply) -> connect4::Snapshot {
    match reply {
        Reply::Update(snapshot) => snapshot,
        other => panic!("expected Update, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_game_over_in_memory() -> anyhow::Result<()> {
    let (mut client, host) = spawn_host(HostConfig::default());

    let (session, snapshot) = client.start(10, 20).await?.unwrap();
    assert_eq!(snapshot.current_player, Some(10));
    assert_eq!(snapshot.players, [10, 20]);

    for (player, col) in [(10, 3), (20, 0), (10, 3), (20, 0), (10, 3), (20, 0)] {
        let snapshot = expect_update(client.play(session, player, col).await?);
        assert_ne!(snapshot.current_player, Some(player));
    }
    let finished = match client.play(session, 10, 3).await? {
        Reply::Finished(snapshot) => snapshot,
        other => panic!("expected Finished, got {:?}", other),
    };
    assert_eq!(finished.status, Status::Won(10));
    assert_eq!(finished.current_player, None);
    assert_eq!(finished.move_count, 7);

    // the finished session is gone
    assert_eq!(
        client.refresh(session).await?,
        Reply::Rejected(Rejection::UnknownSession)
    );

    drop(client);
    host.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejections_are_reported_and_harmless() -> anyhow::Result<()> {
    let (mut client, host) = spawn_host(HostConfig::default());

    assert_eq!(client.start(5, 5).await?, Err(Rejection::InvalidPlayers));

    let (session, _) = client.start(1, 2).await?.unwrap();
    assert_eq!(
        client.play(session, 2, 0).await?,
        Reply::Rejected(Rejection::Move(MoveError::NotYourTurn))
    );
    assert_eq!(
        client.play(session, 1, 9).await?,
        Reply::Rejected(Rejection::Move(MoveError::InvalidColumn))
    );
    for player in [1, 2, 1, 2, 1, 2] {
        expect_update(client.play(session, player, 6).await?);
    }
    assert_eq!(
        client.play(session, 1, 6).await?,
        Reply::Rejected(Rejection::Move(MoveError::ColumnFull))
    );
    assert_eq!(
        client.play(999, 1, 0).await?,
        Reply::Rejected(Rejection::UnknownSession)
    );

    let snapshot = expect_update(client.refresh(session).await?);
    assert_eq!(snapshot.move_count, 6);
    assert_eq!(snapshot.current_player, Some(1));
    assert!(!snapshot.legal_columns.contains(&6));

    drop(client);
    host.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_abandon_by_player() -> anyhow::Result<()> {
    let (mut client, host) = spawn_host(HostConfig::default());
    let (session, _) = client.start(1, 2).await?.unwrap();

    assert_eq!(
        client.abandon(session, 3).await?,
        Reply::Rejected(Rejection::NotInSession)
    );
    match client.abandon(session, 2).await? {
        Reply::Finished(snapshot) => assert_eq!(snapshot.status, Status::Abandoned),
        other => panic!("expected Finished, got {:?}", other),
    }
    assert_eq!(
        client.play(session, 1, 0).await?,
        Reply::Rejected(Rejection::UnknownSession)
    );

    drop(client);
    host.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_idle_session_times_out_as_abandoned() -> anyhow::Result<()> {
    let config = HostConfig::default()
        .with_move_timeout(Duration::from_millis(50))
        .with_sweep_interval(Duration::from_millis(10));
    let (mut client, host) = spawn_host(config);
    let (session, _) = client.start(1, 2).await?.unwrap();

    let pushed = timeout(Duration::from_secs(5), client.next_notification()).await??;
    match pushed {
        Message::Finished {
            seq: None,
            session: id,
            snapshot,
        } => {
            assert_eq!(id, session);
            assert_eq!(snapshot.status, Status::Abandoned);
            assert_eq!(snapshot.move_count, 0);
        }
        other => panic!("expected pushed Finished, got {:?}", other),
    }

    drop(client);
    host.await??;
    Ok(())
}

#[derive(Clone, Default)]
struct RecordingHooks {
    disposed: Arc<Mutex<Vec<(SessionId, Status<u64>)>>>,
}

impl SessionHooks<u64> for RecordingHooks {
    fn on_dispose(&self, id: SessionId, session: &Session<u64>) {
        self.disposed.lock().unwrap().push((id, *session.status()));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_closing_transport_abandons_live_sessions() -> anyhow::Result<()> {
    let hooks = RecordingHooks::default();
    let (host_side, client_side) = InMemoryTransport::pair();
    let registry = SessionRegistry::with_hooks(Box::new(hooks.clone()));
    let mut host = Host::with_registry(host_side, registry, HostConfig::default());
    let task = tokio::spawn(async move {
        host.run().await?;
        anyhow::Ok(host.registry().len())
    });

    let mut client = Client::new(client_side);
    let (first, _) = client.start(1, 2).await?.unwrap();
    let (second, _) = client.start(3, 4).await?.unwrap();
    expect_update(client.play(second, 3, 2).await?);
    drop(client);

    let remaining = task.await??;
    assert_eq!(remaining, 0);
    let mut disposed = hooks.disposed.lock().unwrap().clone();
    disposed.sort_by_key(|(id, _)| *id);
    assert_eq!(
        disposed,
        vec![(first, Status::Abandoned), (second, Status::Abandoned)]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_handshake_version_mismatch() -> anyhow::Result<()> {
    let (host_side, mut client_side) = InMemoryTransport::pair();
    let mut host = Host::new(host_side, HostConfig::default());
    let task = tokio::spawn(async move { host.run().await });

    client_side
        .send(Message::Handshake {
            version: PROTOCOL_VERSION + 1,
        })
        .await?;
    assert!(task.await?.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unexpected_message_is_rejected() -> anyhow::Result<()> {
    let (host_side, mut client_side) = InMemoryTransport::pair();
    let mut host = Host::new(host_side, HostConfig::default());
    let task = tokio::spawn(async move { host.run().await });

    client_side
        .send(Message::Handshake {
            version: PROTOCOL_VERSION,
        })
        .await?;
    assert_eq!(
        client_side.recv().await?,
        Message::HandshakeAck {
            version: PROTOCOL_VERSION
        }
    );
    client_side
        .send(Message::Handshake {
            version: PROTOCOL_VERSION,
        })
        .await?;
    match client_side.recv().await? {
        Message::Rejected { reason, .. } => assert_eq!(reason, Rejection::UnexpectedMessage),
        other => panic!("expected Rejected, got {:?}", other),
    }

    drop(client_side);
    task.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_random_match_reaches_terminal_status() -> anyhow::Result<()> {
    for seed in 0..5u64 {
        let (client, host) = spawn_host(HostConfig::default());
        let seats: [Box<dyn MoveSource>; 2] = [
            Box::new(RandomMover::seeded(seed)),
            Box::new(RandomMover::seeded(seed + 100)),
        ];
        let mut runner = MatchRunner::new(client, seats);
        let report = runner.run(1, 2).await?;

        assert!(matches!(report.snapshot.status, Status::Won(_) | Status::Draw));
        assert!(report.snapshot.move_count >= 7 && report.snapshot.move_count <= 42);
        assert_eq!(report.rejections, 0);

        drop(runner);
        host.await??;
    }
    Ok(())
}

/// Thinks for a fixed time before every move.
struct SlowMover {
    delay: std::time::Duration,
    inner: RandomMover,
}

impl MoveSource for SlowMover {
    fn choose(&mut self, snapshot: &Snapshot) -> Intent {
        std::thread::sleep(self.delay);
        self.inner.choose(snapshot)
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_runner_reports_idle_timeout_as_abandoned() -> anyhow::Result<()> {
    let config = HostConfig::default()
        .with_move_timeout(Duration::from_millis(50))
        .with_sweep_interval(Duration::from_millis(10));
    let (client, host) = spawn_host(config);
    let seats: [Box<dyn MoveSource>; 2] = [
        Box::new(SlowMover {
            delay: std::time::Duration::from_millis(300),
            inner: RandomMover::seeded(1),
        }),
        Box::new(RandomMover::seeded(2)),
    ];
    let mut runner = MatchRunner::new(client, seats);

    let report = timeout(Duration::from_secs(5), runner.run(1, 2)).await??;
    assert_eq!(report.snapshot.status, Status::Abandoned);
    assert_eq!(report.snapshot.current_player, None);
    assert_eq!(report.snapshot.move_count, 0);

    drop(runner);
    host.await??;
    Ok(())
}

/// Blocks on a std channel before its first move.
struct GatedMover {
    gate: Option<mpsc::Receiver<()>>,
    inner: RandomMover,
}

impl MoveSource for GatedMover {
    fn choose(&mut self, snapshot: &Snapshot) -> Intent {
        if let Some(gate) = self.gate.take() {
            let _ = gate.recv();
        }
        self.inner.choose(snapshot)
    }
}

// single-threaded runtime: the gate is opened by a task on the same runtime
#[tokio::test]
async fn test_blocking_move_source_leaves_runtime_free() -> anyhow::Result<()> {
    let (client, host) = spawn_host(HostConfig::default());
    let (open, gate) = mpsc::channel();
    let seats: [Box<dyn MoveSource>; 2] = [
        Box::new(GatedMover {
            gate: Some(gate),
            inner: RandomMover::seeded(3),
        }),
        Box::new(RandomMover::seeded(4)),
    ];
    let opener = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = open.send(());
    });

    let mut runner = MatchRunner::new(client, seats);
    let report = runner.run(1, 2).await?;
    assert!(matches!(report.snapshot.status, Status::Won(_) | Status::Draw));

    opener.await?;
    drop(runner);
    host.await??;
    Ok(())
}
