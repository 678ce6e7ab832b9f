use futures::executor::block_on;
use std::{io::Write, sync::Arc};
use styx_proto::{
    consts::{DEFAULT_MAX_MESSAGE_SIZE, VERSION_9P2000},
    error::{Error, Result},
    DecoderConfig, Message, Role, Rversion, TaggedMessage, Tattach, Tauth, Tclunk, Tcreate,
    Tflush, Topen, Tread, Tremove, Tstat, Tversion, Twalk, Twrite, Twstat,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error};

mod framed;
mod stream;

pub use framed::FramedSession;
pub use stream::{StreamSender, StreamSession};

/// Receives the decoded side of a session.
///
/// Messages arrive in the order their last byte arrived on the wire, on
/// the thread or task that read those bytes. A stream ends with exactly
/// one call to either `connection_closed` or `connection_error`.
pub trait MessageListener {
    fn message_received(&mut self, message: TaggedMessage);

    fn connection_error(&mut self, _error: &Error) {}

    fn connection_closed(&mut self) {}
}

fn unsupported() -> Message {
    Message::error("Operation not supported")
}

/// Server-side request handling, one method per T-message.
pub trait MessageHandler {
    /// Upper bound offered during version negotiation.
    fn max_message_size(&self) -> u32 {
        DEFAULT_MAX_MESSAGE_SIZE
    }

    fn version(&self, message: &Tversion) -> impl std::future::Future<Output = Message> {
        async {
            Message::Rversion(Rversion {
                msize: message.msize.min(self.max_message_size()),
                version: if message.version.starts_with(VERSION_9P2000) {
                    VERSION_9P2000.to_string()
                } else {
                    "unknown".to_string()
                },
            })
        }
    }

    fn auth(&self, _msg: &Tauth) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn attach(&self, _msg: &Tattach) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn flush(&self, _msg: &Tflush) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn walk(&self, _msg: &Twalk) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn open(&self, _msg: &Topen) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn create(&self, _msg: &Tcreate) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn read(&self, _msg: &Tread) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn write(&self, _msg: &Twrite) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn clunk(&self, _msg: &Tclunk) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn remove(&self, _msg: &Tremove) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn stat(&self, _msg: &Tstat) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    fn wstat(&self, _msg: &Twstat) -> impl std::future::Future<Output = Message> {
        async { unsupported() }
    }

    /// Dispatcher method that routes messages to specific handlers
    fn handle_message(&self, message: &Message) -> impl std::future::Future<Output = Message> {
        async move {
            match message {
                Message::Tversion(msg) => self.version(msg).await,
                Message::Tauth(msg) => self.auth(msg).await,
                Message::Tattach(msg) => self.attach(msg).await,
                Message::Tflush(msg) => self.flush(msg).await,
                Message::Twalk(msg) => self.walk(msg).await,
                Message::Topen(msg) => self.open(msg).await,
                Message::Tcreate(msg) => self.create(msg).await,
                Message::Tread(msg) => self.read(msg).await,
                Message::Twrite(msg) => self.write(msg).await,
                Message::Tclunk(msg) => self.clunk(msg).await,
                Message::Tremove(msg) => self.remove(msg).await,
                Message::Tstat(msg) => self.stat(msg).await,
                Message::Twstat(msg) => self.wstat(msg).await,

                // a server-role decoder never produces replies
                _ => Message::error("Unexpected message type"),
            }
        }
    }
}

/// Answers requests arriving on a [`FramedSession`].
pub struct Server<T, H>
where
    T: AsyncRead + AsyncWrite + Unpin,
    H: MessageHandler,
{
    session: FramedSession<T>,
    handler: Arc<H>,
}

impl<T, H> Server<T, H>
where
    T: AsyncRead + AsyncWrite + Unpin,
    H: MessageHandler,
{
    pub fn new(connection: T, handler: Arc<H>) -> Self {
        let config = DecoderConfig::new(Role::Server);
        Self::with_config(connection, handler, config)
    }

    pub fn with_config(connection: T, handler: Arc<H>, config: DecoderConfig) -> Self {
        Self {
            session: FramedSession::new(connection, config),
            handler,
        }
    }

    /// # Errors
    /// - a protocol violation or transport failure on the connection
    pub async fn run(mut self) -> Result<()> {
        while let Some(request) = self.session.recv().await {
            let request = request?;
            debug!("<- {request}");

            let response = self.handler.handle_message(&request.message).await;
            let tagged = response.to_tagged(request.tag);
            debug!("-> {tagged}");
            self.session.send(tagged).await?;
        }

        Ok(())
    }
}

/// Listener that answers each request through a [`StreamSender`].
///
/// The handler runs to completion on the reader thread, so replies go out
/// in request order.
pub struct RequestListener<H, W> {
    handler: Arc<H>,
    sender: StreamSender<W>,
}

impl<H, W> RequestListener<H, W> {
    pub fn new(handler: Arc<H>, sender: StreamSender<W>) -> Self {
        Self { handler, sender }
    }
}

impl<H, W> MessageListener for RequestListener<H, W>
where
    H: MessageHandler,
    W: Write,
{
    fn message_received(&mut self, request: TaggedMessage) {
        debug!("<- {request}");
        let response = block_on(self.handler.handle_message(&request.message));
        let tagged = response.to_tagged(request.tag);
        debug!("-> {tagged}");
        if let Err(err) = self.sender.send(&tagged) {
            error!("failed to send reply: {err}");
        }
    }

    fn connection_error(&mut self, err: &Error) {
        error!("connection error: {err}");
    }

    fn connection_closed(&mut self) {
        debug!("connection closed");
    }
}

/// Serve one connection over a stream pair until its input ends.
///
/// # Errors
/// - the reader thread could not be started or panicked
pub fn serve_stream<R, W, H>(input: R, output: W, handler: Arc<H>, config: DecoderConfig) -> Result<()>
where
    R: std::io::Read + Send + 'static,
    W: Write + Send + 'static,
    H: MessageHandler + Send + Sync + 'static,
{
    let session = StreamSession::spawn_with(input, output, config, |sender| {
        RequestListener::new(handler, sender)
    })?;
    session.join()
}
