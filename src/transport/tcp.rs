//! Length-prefixed bincode frames over TCP: a 4-byte big-endian length
//! followed by the encoded message.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::settings::{DEFAULT_WRITE_TIMEOUT, MAX_MESSAGE_SIZE};
use crate::transport::Transport;

fn io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        std::io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        std::io::ErrorKind::BrokenPipe => anyhow::anyhow!("Connection closed by peer"),
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

/// Encode and write one frame.
pub async fn write_frame<W, M>(writer: &mut W, msg: &M, max_message_size: u32) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    M: Serialize,
{
    let data = bincode::serialize(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
    if data.len() as u64 > max_message_size as u64 {
        return Err(anyhow::anyhow!(
            "Message too large: {} bytes (max: {})",
            data.len(),
            max_message_size
        ));
    }
    writer
        .write_all(&(data.len() as u32).to_be_bytes())
        .await
        .map_err(io_error)?;
    writer.write_all(&data).await.map_err(io_error)?;
    writer.flush().await.map_err(io_error)?;
    Ok(())
}

/// Read and decode one frame.
pub async fn read_frame<R, M>(reader: &mut R, max_message_size: u32) -> anyhow::Result<M>
where
    R: AsyncRead + Unpin,
    M: DeserializeOwned,
{
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await.map_err(io_error)?;
    let len = u32::from_be_bytes(len_buf);
    if len > max_message_size {
        return Err(anyhow::anyhow!(
            "Message too large: {} bytes (max: {})",
            len,
            max_message_size
        ));
    }
    if len == 0 {
        return Err(anyhow::anyhow!("Invalid message length: 0"));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await.map_err(io_error)?;
    bincode::deserialize(&buf).map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))
}

/// TCP transport sending `O` and receiving `I`.
///
/// Receiving has no timeout by default: a player may sit in the
/// matchmaking pool indefinitely.
pub struct TcpTransport<O, I> {
    stream: TcpStream,
    write_timeout: Duration,
    recv_timeout: Option<Duration>,
    max_message_size: u32,
    _direction: PhantomData<fn(O) -> I>,
}

/// The player's end of a TCP connection to the server.
pub type ClientTcpTransport = TcpTransport<ClientMessage, ServerMessage>;

impl<O, I> TcpTransport<O, I> {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            recv_timeout: None,
            max_message_size: MAX_MESSAGE_SIZE,
            _direction: PhantomData,
        }
    }

    pub fn with_config(
        stream: TcpStream,
        write_timeout: Duration,
        recv_timeout: Option<Duration>,
        max_message_size: u32,
    ) -> Self {
        Self {
            stream,
            write_timeout,
            recv_timeout,
            max_message_size,
            _direction: PhantomData,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }
}

#[async_trait::async_trait]
impl<O, I> Transport for TcpTransport<O, I>
where
    O: Serialize + Send + Sync + 'static,
    I: DeserializeOwned + Send + 'static,
{
    type Outbound = O;
    type Inbound = I;

    async fn send(&mut self, msg: O) -> anyhow::Result<()> {
        let max = self.max_message_size;
        timeout(self.write_timeout, write_frame(&mut self.stream, &msg, max))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.write_timeout))?
    }

    async fn recv(&mut self) -> anyhow::Result<I> {
        let max = self.max_message_size;
        match self.recv_timeout {
            Some(limit) => timeout(limit, read_frame(&mut self.stream, max))
                .await
                .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", limit))?,
            None => read_frame(&mut self.stream, max).await,
        }
    }
}
