use crate::registry::Role;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} out of range: {value}")]
    Range { kind: &'static str, value: i128 },

    #[error("buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("invalid message type {code} for {role} connection")]
    InvalidMessageType { code: u8, role: Role },

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("invalid UTF-8 string")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("string too long: {0} bytes")]
    StringTooLong(usize),

    #[error("too many walk elements: {0}")]
    TooManyElements(usize),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("stream terminated by an earlier protocol violation")]
    StreamTerminated,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn violation(message: impl Into<String>) -> Self {
        Error::ProtocolViolation(message.into())
    }

    /// Errors after which the byte offset of the next message is unknown.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Error::ProtocolViolation(_)
                | Error::InvalidMessageType { .. }
                | Error::StreamTerminated
        )
    }

    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
