#![cfg(feature = "std")]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::Transport;

/// Default timeout for writing one frame.
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame body size. Snapshots are a few hundred bytes.
pub const MAX_FRAME_SIZE: u32 = 64 * 1024;

/// Length of the big-endian size prefix in front of every frame.
const HEADER_LEN: usize = 4;

/// Serialize `msg` into a length-prefixed frame.
pub fn encode_frame(msg: &Message, max_frame_size: u32) -> anyhow::Result<Vec<u8>> {
    let body =
        bincode::serialize(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
    if body.len() as u64 > max_frame_size as u64 {
        return Err(anyhow::anyhow!(
            "Message too large: {} bytes (max: {})",
            body.len(),
            max_frame_size
        ));
    }
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Split one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` while the frame is still incomplete; the buffer is
/// only consumed once a whole frame is available.
pub fn decode_frame(buf: &mut Vec<u8>, max_frame_size: u32) -> anyhow::Result<Option<Message>> {
    if buf.len() < HEADER_LEN {
        return Ok(None);
    }
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if len == 0 {
        return Err(anyhow::anyhow!("Invalid message length: 0"));
    }
    if len > max_frame_size {
        return Err(anyhow::anyhow!(
            "Message too large: {} bytes (max: {})",
            len,
            max_frame_size
        ));
    }
    let end = HEADER_LEN + len as usize;
    if buf.len() < end {
        return Ok(None);
    }
    let msg = bincode::deserialize(&buf[HEADER_LEN..end])
        .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))?;
    buf.drain(..end);
    Ok(Some(msg))
}

/// Length-prefixed `bincode` frames over a TCP stream.
///
/// `recv` only buffers bytes that were actually read, so dropping a pending
/// `recv` (e.g. inside `tokio::select!`) never loses part of a frame.
pub struct TcpTransport {
    stream: TcpStream,
    pending: Vec<u8>,
    write_timeout: Duration,
    max_frame_size: u32,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_WRITE_TIMEOUT, MAX_FRAME_SIZE)
    }

    pub fn with_config(stream: TcpStream, write_timeout: Duration, max_frame_size: u32) -> Self {
        Self {
            stream,
            pending: Vec::new(),
            write_timeout,
            max_frame_size,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }
}

fn map_io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof
        | std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection closed by peer"),
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let frame = encode_frame(&msg, self.max_frame_size)?;
        timeout(self.write_timeout, self.stream.write_all(&frame))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.write_timeout))?
            .map_err(map_io_error)?;
        log::debug!("sent {} byte frame", frame.len());
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(msg) = decode_frame(&mut self.pending, self.max_frame_size)? {
                return Ok(msg);
            }
            let n = self.stream.read(&mut chunk).await.map_err(map_io_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.pending.extend_from_slice(&chunk[..n]);
        }
    }
}
