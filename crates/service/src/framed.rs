use crate::MessageListener;
use futures::{SinkExt, StreamExt};
use styx_proto::{error::Result, DecoderConfig, MessageCodec, TaggedMessage};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

/// A session driven by the tokio event loop through [`MessageCodec`].
pub struct FramedSession<T> {
    connection: Framed<T, MessageCodec>,
}

impl<T> FramedSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: T, config: DecoderConfig) -> Self {
        Self {
            connection: Framed::new(io, MessageCodec::with_config(config)),
        }
    }

    /// Encode and flush `message`.
    ///
    /// # Errors
    /// - the message is larger than the configured maximum
    /// - the transport write fails
    pub async fn send(&mut self, message: TaggedMessage) -> Result<()> {
        self.connection.send(message).await
    }

    /// Next decoded message; `None` once the transport is closed cleanly.
    pub async fn recv(&mut self) -> Option<Result<TaggedMessage>> {
        self.connection.next().await
    }

    /// Feed every message to `listener` until the stream ends.
    ///
    /// Exactly one of `connection_closed` or `connection_error` is reported.
    ///
    /// # Errors
    /// - the same error passed to `connection_error`
    pub async fn dispatch<L>(&mut self, listener: &mut L) -> Result<()>
    where
        L: MessageListener,
    {
        while let Some(result) = self.connection.next().await {
            match result {
                Ok(message) => listener.message_received(message),
                Err(err) => {
                    warn!("connection failed: {err}");
                    listener.connection_error(&err);
                    return Err(err);
                }
            }
        }

        debug!("connection closed");
        listener.connection_closed();
        Ok(())
    }

    pub fn into_inner(self) -> T {
        self.connection.into_inner()
    }
}
