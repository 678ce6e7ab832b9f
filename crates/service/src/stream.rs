//! Sessions over a plain `Read`/`Write` pair, such as a child process's
//! stdin and stdout when the transport is tunnelled.
use crate::MessageListener;
use std::{
    io::{self, Read, Write},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle},
};
use styx_proto::{
    encode_message,
    error::{Error, Result},
    DecoderConfig, FrameDecoder, TaggedMessage,
};
use tracing::{debug, error};

const READ_CHUNK: usize = 8192;

/// Cloneable handle that writes whole messages to the session's output.
pub struct StreamSender<W> {
    writer: Arc<Mutex<W>>,
    max_message_size: usize,
}

impl<W> Clone for StreamSender<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            max_message_size: self.max_message_size,
        }
    }
}

impl<W: Write> StreamSender<W> {
    /// Encode `message` and write it out. The bytes have been handed to
    /// the writer and flushed by the time this returns.
    ///
    /// # Errors
    /// - the message is larger than the configured maximum
    /// - the write or flush fails
    pub fn send(&self, message: &TaggedMessage) -> Result<()> {
        let size = message.encoded_len();
        if size > self.max_message_size {
            return Err(Error::MessageTooLarge {
                size,
                max: self.max_message_size,
            });
        }

        let frame = encode_message(message)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "writer lock poisoned"))?;
        writer.write_all(&frame)?;
        writer.flush()?;
        Ok(())
    }
}

/// A session whose input is pumped by a dedicated reader thread.
pub struct StreamSession<W> {
    sender: StreamSender<W>,
    reader: JoinHandle<()>,
}

impl<W: Write> StreamSession<W> {
    /// Start reading `input` on a new thread, reporting to `listener`.
    ///
    /// # Errors
    /// - the reader thread could not be spawned
    pub fn spawn<R, L>(input: R, output: W, config: DecoderConfig, listener: L) -> Result<Self>
    where
        R: Read + Send + 'static,
        L: MessageListener + Send + 'static,
    {
        Self::spawn_with(input, output, config, |_| listener)
    }

    /// Like [`StreamSession::spawn`], for listeners that reply on the
    /// same session: `make_listener` receives the session's sender.
    ///
    /// # Errors
    /// - the reader thread could not be spawned
    pub fn spawn_with<R, L, F>(
        input: R,
        output: W,
        config: DecoderConfig,
        make_listener: F,
    ) -> Result<Self>
    where
        R: Read + Send + 'static,
        L: MessageListener + Send + 'static,
        F: FnOnce(StreamSender<W>) -> L,
    {
        let sender = StreamSender {
            writer: Arc::new(Mutex::new(output)),
            max_message_size: config.max_message_size() as usize,
        };
        let listener = make_listener(sender.clone());

        let reader = thread::Builder::new()
            .name(format!("styx-{}-reader", config.role()))
            .spawn(move || pump(input, FrameDecoder::new(config), listener))?;

        Ok(Self { sender, reader })
    }

    #[must_use]
    pub fn sender(&self) -> StreamSender<W> {
        self.sender.clone()
    }

    /// # Errors
    /// - see [`StreamSender::send`]
    pub fn send(&self, message: &TaggedMessage) -> Result<()> {
        self.sender.send(message)
    }

    /// Wait for the input to end.
    ///
    /// # Errors
    /// - the reader thread panicked
    pub fn join(self) -> Result<()> {
        self.reader
            .join()
            .map_err(|_| Error::Io(io::Error::new(io::ErrorKind::Other, "reader thread panicked")))
    }
}

/// Read until end of input or the first failure, then report exactly one
/// of `connection_closed` or `connection_error`.
fn pump<R, L>(mut input: R, mut decoder: FrameDecoder, mut listener: L)
where
    R: Read,
    L: MessageListener,
{
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        match input.read(&mut buf) {
            Ok(0) => {
                match decoder.finish() {
                    Ok(()) => {
                        debug!("input closed");
                        listener.connection_closed();
                    }
                    Err(err) => {
                        error!("input closed mid-message: {err}");
                        listener.connection_error(&err);
                    }
                }
                return;
            }
            Ok(n) => {
                if let Err(err) = decoder.feed(&buf[..n], |m| listener.message_received(m)) {
                    listener.connection_error(&err);
                    return;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                error!("read failed: {err}");
                listener.connection_error(&Error::Io(err));
                return;
            }
        }
    }
}
