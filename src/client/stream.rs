//! Transfer data stream
//!
//! A [`DataStream`] is the byte stream of exactly one transfer. Closing it
//! finalizes the transfer: the data connection is shut down and the
//! completion reply (226/250) is consumed from the control channel so the
//! session is ready for the next command. The wrapper holds the control
//! channel by `Arc` and the session's transfer permit; no back-reference to
//! the client exists.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::sync::OwnedSemaphorePermit;
use tracing::{trace, warn};

use super::channel::{ControlChannel, MaybeTlsStream};
use std::sync::Arc;

/// Byte stream of one file transfer
///
/// Implements `AsyncRead` for downloads (RETR) and `AsyncWrite` for
/// uploads (STOR). Call [`close`](Self::close) when done; it consumes the
/// transfer completion reply from the control channel. Dropping the stream
/// without closing releases the transfer slot but leaves the completion
/// reply on the wire, where the next command drains it as stale data.
#[must_use]
pub struct DataStream {
    inner: MaybeTlsStream,
    channel: Arc<ControlChannel>,
    /// False when the server already sent 226 at command time
    completion_pending: bool,
    /// Close-time override for the completion read
    completion_timeout: Option<Duration>,
    /// Held for the lifetime of the transfer
    _permit: OwnedSemaphorePermit,
}

impl DataStream {
    pub(crate) fn new(
        inner: MaybeTlsStream,
        channel: Arc<ControlChannel>,
        completion_pending: bool,
        completion_timeout: Option<Duration>,
        permit: OwnedSemaphorePermit,
    ) -> Self {
        Self {
            inner,
            channel,
            completion_pending,
            completion_timeout,
            _permit: permit,
        }
    }

    /// Finish the transfer
    ///
    /// Shuts the data connection down, then reads the completion reply from
    /// the control channel (honoring the configured disconnect timeout).
    /// Failures here are logged and swallowed; the transfer slot is freed
    /// either way.
    pub async fn close(mut self) {
        if let Err(e) = self.inner.shutdown().await {
            warn!("error closing data connection: {e}");
        }

        if self.completion_pending {
            let result = match self.completion_timeout {
                Some(limit) => self.channel.read_reply_with_timeout(limit).await,
                None => self.channel.read_reply().await,
            };
            match result {
                Ok(reply) if reply.is_success() => {
                    trace!("transfer complete: {} {}", reply.code(), reply.message);
                }
                Ok(reply) => {
                    warn!("transfer ended with {} {}", reply.code(), reply.message);
                }
                Err(e) => warn!("error reading transfer completion: {e}"),
            }
        }
    }
}

impl AsyncRead for DataStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for DataStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
