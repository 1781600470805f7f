use connect4::transport::tcp::{decode_frame, encode_frame, MAX_FRAME_SIZE};
use connect4::{
    Client, Host, HostConfig, Message, MoveError, Rejection, Reply, Status, TcpTransport,
    Transport, PROTOCOL_VERSION,
};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

#[tokio::test(flavor = "multi_thread")]
async fn test_host_over_tcp() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut host = Host::new(TcpTransport::new(socket), HostConfig::default());
        host.run().await
    });

    let mut client = Client::new(TcpTransport::connect(addr).await?);
    let (session, snapshot) = client.start(7, 8).await?.unwrap();
    assert_eq!(snapshot.current_player, Some(7));

    assert_eq!(
        client.play(session, 8, 0).await?,
        Reply::Rejected(Rejection::Move(MoveError::NotYourTurn))
    );
    for (player, col) in [(7, 0), (8, 1), (7, 0), (8, 1), (7, 0), (8, 1)] {
        assert!(matches!(
            client.play(session, player, col).await?,
            Reply::Update(_)
        ));
    }
    match client.play(session, 7, 0).await? {
        Reply::Finished(snapshot) => {
            assert_eq!(snapshot.status, Status::Won(7));
            let last = snapshot.last_move.unwrap();
            assert_eq!((last.player, last.column, last.row), (7, 0, 2));
        }
        other => panic!("expected Finished, got {:?}", other),
    }

    drop(client);
    server.await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_split_writes_are_reassembled() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut transport = TcpTransport::new(socket);
        let first = transport.recv().await?;
        let second = transport.recv().await?;
        anyhow::Ok((first, second))
    });

    let mut stream = TcpStream::connect(addr).await?;
    let mut bytes = encode_frame(
        &Message::Handshake {
            version: PROTOCOL_VERSION,
        },
        MAX_FRAME_SIZE,
    )?;
    bytes.extend(encode_frame(&Message::Refresh { seq: 3, session: 9 }, MAX_FRAME_SIZE)?);

    // one byte at a time across both frames
    for byte in bytes {
        stream.write_all(&[byte]).await?;
        stream.flush().await?;
    }

    let (first, second) = server.await??;
    assert_eq!(
        first,
        Message::Handshake {
            version: PROTOCOL_VERSION
        }
    );
    assert_eq!(second, Message::Refresh { seq: 3, session: 9 });
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_peer_close_is_reported() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await?;
        let mut transport = TcpTransport::new(socket);
        anyhow::Ok(transport.recv().await)
    });

    let stream = TcpStream::connect(addr).await?;
    drop(stream);

    let err = server.await??.unwrap_err();
    assert!(err.to_string().contains("Connection closed by peer"));
    Ok(())
}

#[test]
fn test_decode_waits_for_complete_frame() {
    let frame = encode_frame(&Message::Refresh { seq: 1, session: 2 }, MAX_FRAME_SIZE).unwrap();

    let mut buf = frame[..3].to_vec();
    assert!(decode_frame(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
    assert_eq!(buf.len(), 3);

    let mut buf = frame[..frame.len() - 1].to_vec();
    assert!(decode_frame(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
    assert_eq!(buf.len(), frame.len() - 1);
}

#[test]
fn test_decode_consumes_one_frame_at_a_time() {
    let first = Message::Refresh { seq: 1, session: 2 };
    let second = Message::Abandon {
        seq: 2,
        session: 2,
        player: 5,
    };
    let mut buf = encode_frame(&first, MAX_FRAME_SIZE).unwrap();
    buf.extend(encode_frame(&second, MAX_FRAME_SIZE).unwrap());

    assert_eq!(decode_frame(&mut buf, MAX_FRAME_SIZE).unwrap(), Some(first));
    assert_eq!(decode_frame(&mut buf, MAX_FRAME_SIZE).unwrap(), Some(second));
    assert!(buf.is_empty());
    assert!(decode_frame(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
}

#[test]
fn test_decode_rejects_bad_lengths() {
    let mut zero = vec![0, 0, 0, 0, 1];
    let err = decode_frame(&mut zero, MAX_FRAME_SIZE).unwrap_err();
    assert!(err.to_string().contains("Invalid message length"));

    let mut huge = (MAX_FRAME_SIZE + 1).to_be_bytes().to_vec();
    let err = decode_frame(&mut huge, MAX_FRAME_SIZE).unwrap_err();
    assert!(err.to_string().contains("Message too large"));
}

#[test]
fn test_decode_rejects_garbage_body() {
    // variant index far past the last Message variant
    let mut buf = vec![0, 0, 0, 4, 0xff, 0xff, 0xff, 0xff];
    let err = decode_frame(&mut buf, MAX_FRAME_SIZE).unwrap_err();
    assert!(err.to_string().contains("Deserialization error"));
}

#[test]
fn test_encode_respects_frame_limit() {
    let msg = Message::Refresh { seq: 1, session: 2 };
    let err = encode_frame(&msg, 4).unwrap_err();
    assert!(err.to_string().contains("Message too large"));
}
