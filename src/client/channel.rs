//! Control channel I/O
//!
//! The control connection is a full-duplex byte stream (plain TCP or TLS)
//! carrying CRLF-delimited command and reply lines. Two mutexes serialize
//! access: the **send** token is held for a whole send-then-receive
//! exchange, the **receive** token only while reading one reply. Transfer
//! completion replies are read under the receive token alone, so they never
//! block a concurrent close while a command holds the send token.

use crate::commands::FtpCommand;
use crate::error::{FtpError, Result};
use crate::response::{self, Reply, StatusCode};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf,
    ReadHalf, WriteHalf,
};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{trace, warn};

/// A byte stream that is plain TCP or one of the two TLS roles
///
/// Control channels and passive data channels authenticate as TLS clients;
/// active-mode data channels under explicit TLS authenticate as the server
/// on the accepted socket.
pub(crate) enum MaybeTlsStream {
    Plain(TcpStream),
    ClientTls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
    ServerTls(Box<tokio_rustls::server::TlsStream<TcpStream>>),
}

impl AsyncRead for MaybeTlsStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            MaybeTlsStream::ClientTls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
            MaybeTlsStream::ServerTls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTlsStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            MaybeTlsStream::ClientTls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
            MaybeTlsStream::ServerTls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_flush(cx),
            MaybeTlsStream::ClientTls(s) => Pin::new(s.as_mut()).poll_flush(cx),
            MaybeTlsStream::ServerTls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            MaybeTlsStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            MaybeTlsStream::ClientTls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
            MaybeTlsStream::ServerTls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Read one complete reply from a buffered line reader
///
/// Lines are accumulated (CR/LF stripped, bytes decoded lossily) until the
/// terminal `DDD message` line arrives; continuation lines (`DDD-...`) are
/// kept verbatim ahead of it.
pub(crate) async fn read_reply_from<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Reply> {
    let mut lines: Vec<String> = Vec::new();
    loop {
        let mut raw = Vec::with_capacity(512);
        let n = reader.read_until(b'\n', &mut raw).await?;
        if n == 0 {
            return Err(FtpError::ConnectionClosed);
        }

        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\r', '\n']);
        trace!("<- {}", line);

        if let Some((code, message)) = response::terminal_line(line) {
            let message = message.to_string();
            lines.push(line.to_string());
            return Ok(Reply {
                status: StatusCode::from_u16(code),
                message,
                lines,
            });
        }
        lines.push(line.to_string());
    }
}

/// The shared control channel of one FTP session
pub(crate) struct ControlChannel {
    /// Receive token: guards reply reads
    reader: Mutex<BufReader<ReadHalf<MaybeTlsStream>>>,
    /// Send token: guards command submission for a whole exchange
    writer: Mutex<WriteHalf<MaybeTlsStream>>,
    encrypted: bool,
    timeout: Duration,
}

impl ControlChannel {
    pub fn new(stream: MaybeTlsStream, encrypted: bool, timeout: Duration) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: Mutex::new(BufReader::new(read_half)),
            writer: Mutex::new(write_half),
            encrypted,
            timeout,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Submit one command and read its reply, holding the send token for
    /// the whole exchange
    pub async fn send_command(&self, command: &FtpCommand) -> Result<Reply> {
        let wire = command.to_wire();
        self.exchange(&wire, &command.to_string()).await
    }

    /// Submit a raw command line (CRLF appended) and read its reply
    pub async fn send_raw(&self, line: &str) -> Result<Reply> {
        let wire = format!("{}\r\n", line.trim_end_matches(['\r', '\n']));
        let display_line = line.trim_end_matches(['\r', '\n']).to_string();
        self.exchange(&wire, &display_line).await
    }

    async fn exchange(&self, wire: &str, display_line: &str) -> Result<Reply> {
        let mut writer = self.writer.lock().await;

        self.drain_stale().await;

        trace!("-> {}", display_line);
        timeout(self.timeout, writer.write_all(wire.as_bytes()))
            .await
            .map_err(|_| FtpError::Timeout)??;
        timeout(self.timeout, writer.flush())
            .await
            .map_err(|_| FtpError::Timeout)??;

        // Still holding the send token: the reply belongs to this command
        self.read_reply().await
    }

    /// Read one reply under the receive token with the default timeout
    pub async fn read_reply(&self) -> Result<Reply> {
        self.read_reply_with_timeout(self.timeout).await
    }

    /// Read one reply under the receive token with an explicit timeout
    pub async fn read_reply_with_timeout(&self, limit: Duration) -> Result<Reply> {
        let mut reader = self.reader.lock().await;
        timeout(limit, read_reply_from(&mut *reader))
            .await
            .map_err(|_| FtpError::Timeout)?
    }

    /// Consume replies the server sent outside a command exchange
    ///
    /// A cancelled transfer can leave its completion code unread; it must
    /// not be attributed to the next command.
    pub async fn drain_stale(&self) {
        loop {
            let mut reader = self.reader.lock().await;
            let pending = matches!(
                timeout(Duration::ZERO, reader.fill_buf()).await,
                Ok(Ok(buf)) if !buf.is_empty()
            );
            if !pending {
                return;
            }
            match timeout(self.timeout, read_reply_from(&mut *reader)).await {
                Ok(Ok(reply)) => {
                    warn!("drained stale reply: {} {}", reply.code(), reply.message);
                }
                _ => return,
            }
        }
    }

    /// Poll whether the peer closed the read side of the connection
    ///
    /// Readable with zero bytes means EOF; not readable means the
    /// connection is idle but alive.
    pub async fn is_disconnected(&self) -> bool {
        let mut reader = self.reader.lock().await;
        match timeout(Duration::ZERO, reader.fill_buf()).await {
            Ok(Ok(buf)) => buf.is_empty(),
            Ok(Err(_)) => true,
            Err(_) => false,
        }
    }

    /// Shut down the write side; errors are the caller's to ignore
    pub async fn shutdown(&self) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        Ok(())
    }
}
