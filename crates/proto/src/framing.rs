//! Incremental message framing.
//!
//! A [`FrameDecoder`] is fed whatever chunks the transport produces and
//! emits each message as soon as its last byte arrives. It keeps exactly
//! one piece of state between calls: either the partial 7-byte header or
//! the header plus the partial body.
use crate::{
    consts::{DEFAULT_MAX_MESSAGE_SIZE, HEADER_LENGTH},
    error::{Error, Result},
    registry::{identify, MessageType, Role},
    Message, TaggedMessage, WireReader, WireWriter,
};
use bytes::{Bytes, BytesMut};
use std::io;
use tracing::{debug, trace, warn};

/// Per-connection decoding parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    role: Role,
    max_message_size: u32,
}

impl DecoderConfig {
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Largest `length` a header may declare.
    ///
    /// # Errors
    /// - `size` is smaller than a bare header or does not fit a signed 32-bit length
    pub fn with_max_message_size(mut self, size: u32) -> Result<Self> {
        if (size as usize) < HEADER_LENGTH {
            return Err(Error::Config(format!(
                "max message size {size} is smaller than the {HEADER_LENGTH}-byte header"
            )));
        }
        if i32::try_from(size).is_err() {
            return Err(Error::Config(format!(
                "max message size {size} exceeds {}",
                i32::MAX
            )));
        }
        self.max_message_size = size;
        Ok(self)
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn max_message_size(&self) -> u32 {
        self.max_message_size
    }
}

#[derive(Debug, Clone, Copy)]
struct Header {
    length: u32,
    message_type: MessageType,
    tag: u16,
}

impl Header {
    fn body_len(&self) -> usize {
        self.length as usize - HEADER_LENGTH
    }
}

#[derive(Debug)]
enum State {
    AwaitingHeader {
        header: [u8; HEADER_LENGTH],
        filled: usize,
    },
    AwaitingBody {
        header: Header,
        body: BytesMut,
    },
    /// A protocol violation was seen; nothing after it can be trusted.
    Failed,
}

impl State {
    fn idle() -> Self {
        State::AwaitingHeader {
            header: [0; HEADER_LENGTH],
            filled: 0,
        }
    }
}

#[derive(Debug)]
pub struct FrameDecoder {
    config: DecoderConfig,
    state: State,
}

impl FrameDecoder {
    #[must_use]
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            state: State::idle(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// True when no part of a message is being held.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::AwaitingHeader { filled: 0, .. })
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed)
    }

    /// Bytes of the current partial message accumulated so far.
    #[must_use]
    pub fn buffered(&self) -> usize {
        match &self.state {
            State::AwaitingHeader { filled, .. } => *filled,
            State::AwaitingBody { body, .. } => HEADER_LENGTH + body.len(),
            State::Failed => 0,
        }
    }

    /// Discard any partial message and accept input again.
    pub fn reset(&mut self) {
        debug!(role = %self.config.role(), "decoder reset");
        self.state = State::idle();
    }

    /// Consume `chunk`, calling `on_message` for every message it completes.
    ///
    /// Returns the number of messages emitted. Leftover bytes of an
    /// incomplete message are kept for the next call.
    ///
    /// # Errors
    /// - a header declares a length below 7 or above the configured maximum
    /// - a type code is unknown or not decodable in this role
    /// - a body does not match its declared length
    ///
    /// Any of these leaves the decoder failed; later calls return
    /// [`Error::StreamTerminated`].
    pub fn feed<F>(&mut self, mut chunk: &[u8], mut on_message: F) -> Result<usize>
    where
        F: FnMut(TaggedMessage),
    {
        let mut emitted = 0;

        loop {
            match &mut self.state {
                State::Failed => return Err(Error::StreamTerminated),
                State::AwaitingHeader { header, filled } => {
                    if chunk.is_empty() {
                        break;
                    }

                    let take = (HEADER_LENGTH - *filled).min(chunk.len());
                    header[*filled..*filled + take].copy_from_slice(&chunk[..take]);
                    *filled += take;
                    chunk = &chunk[take..];

                    if *filled < HEADER_LENGTH {
                        break;
                    }

                    let raw = *header;
                    match parse_header(&self.config, &raw) {
                        Ok(header) => {
                            self.state = State::AwaitingBody {
                                header,
                                body: BytesMut::with_capacity(header.body_len()),
                            };
                        }
                        Err(err) => return Err(self.fail(err)),
                    }
                }
                State::AwaitingBody { header, body } => {
                    let take = (header.body_len() - body.len()).min(chunk.len());
                    body.extend_from_slice(&chunk[..take]);
                    chunk = &chunk[take..];

                    if body.len() < header.body_len() {
                        break;
                    }

                    let header = *header;
                    let body = std::mem::take(body);
                    self.state = State::idle();

                    match decode_frame(&header, &body) {
                        Ok(message) => {
                            trace!(
                                tag = header.tag,
                                length = header.length,
                                "decoded {}",
                                header.message_type
                            );
                            emitted += 1;
                            on_message(message);
                        }
                        Err(err) => return Err(self.fail(err)),
                    }
                }
            }
        }

        Ok(emitted)
    }

    /// Feed `chunk` and collect what it completes.
    ///
    /// # Errors
    /// - see [`FrameDecoder::feed`]
    pub fn decode_all(&mut self, chunk: &[u8]) -> Result<Vec<TaggedMessage>> {
        let mut messages = Vec::new();
        self.feed(chunk, |message| messages.push(message))?;
        Ok(messages)
    }

    /// Signal end of input.
    ///
    /// # Errors
    /// - a message was partially received; the stream ended abnormally
    pub fn finish(&mut self) -> Result<()> {
        if self.is_idle() || self.is_failed() {
            return Ok(());
        }

        let buffered = self.buffered();
        self.state = State::Failed;
        Err(Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream closed with {buffered} bytes of an incomplete message"),
        )))
    }

    fn fail(&mut self, err: Error) -> Error {
        warn!(role = %self.config.role(), "terminating stream: {err}");
        self.state = State::Failed;
        err
    }
}

fn parse_header(config: &DecoderConfig, raw: &[u8; HEADER_LENGTH]) -> Result<Header> {
    let mut r = WireReader::new(raw);
    let length = r.read_u32()?;
    let code = r.read_u8()?;
    let tag = r.read_u16()?;

    if (length as usize) < HEADER_LENGTH {
        return Err(Error::violation(format!(
            "message length {length} is shorter than the header"
        )));
    }
    if length > config.max_message_size() {
        return Err(Error::violation(format!(
            "message length {length} exceeds maximum {}",
            config.max_message_size()
        )));
    }

    let message_type = identify(config.role(), code)?;

    Ok(Header {
        length,
        message_type,
        tag,
    })
}

fn decode_frame(header: &Header, body: &[u8]) -> Result<TaggedMessage> {
    let mut r = WireReader::new(body);
    let message = Message::decode_body(header.message_type, &mut r).map_err(|err| {
        if err.is_protocol_violation() {
            err
        } else {
            Error::violation(format!("malformed {} body: {err}", header.message_type))
        }
    })?;

    if r.remaining() != 0 {
        return Err(Error::violation(format!(
            "{} body has {} trailing bytes",
            header.message_type,
            r.remaining()
        )));
    }

    Ok(TaggedMessage::new(header.tag, message))
}

/// Serialize a message into exactly `message.encoded_len()` bytes.
///
/// # Errors
/// - the message is longer than a 32-bit length can describe
/// - a field cannot be represented on the wire
pub fn encode_message(message: &TaggedMessage) -> Result<Bytes> {
    let len = message.encoded_len();
    let length = u32::try_from(len).map_err(|_| Error::MessageTooLarge {
        size: len,
        max: u32::MAX as usize,
    })?;

    let mut buf = BytesMut::zeroed(len);
    let mut w = WireWriter::new(&mut buf[..]);
    w.write_u32(length)?
        .write_u8(message.message_type().to_u8())?
        .write_u16(message.tag)?;
    message.message.encode_body(&mut w)?;

    let written = w.finish();
    if written != len {
        return Err(Error::violation(format!(
            "{} wrote {written} bytes but declared {len}",
            message.message_type()
        )));
    }

    Ok(buf.freeze())
}
