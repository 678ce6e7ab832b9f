//! Message type codes and which side of a connection may decode them.
use crate::error::{Error, Result};
use std::fmt;

/// Which end of the conversation a decoder sits on.
///
/// A server only ever decodes T-messages, a client only R-messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    #[must_use]
    pub fn peer(self) -> Role {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }

    /// Whether a decoder in this role accepts `message_type`.
    #[must_use]
    pub fn decodes(self, message_type: MessageType) -> bool {
        match self {
            Role::Server => message_type.is_request(),
            Role::Client => !message_type.is_request(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => f.write_str("client"),
            Role::Server => f.write_str("server"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "client" => Ok(Role::Client),
            "server" => Ok(Role::Server),
            other => Err(Error::Config(format!("unknown role: {other}"))),
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Tversion = 100,
    Rversion = 101,
    Tauth = 102,
    Rauth = 103,
    Tattach = 104,
    Rattach = 105,
    // there is no Terror (106)
    Rerror = 107,
    Tflush = 108,
    Rflush = 109,
    Twalk = 110,
    Rwalk = 111,
    Topen = 112,
    Ropen = 113,
    Tcreate = 114,
    Rcreate = 115,
    Tread = 116,
    Rread = 117,
    Twrite = 118,
    Rwrite = 119,
    Tclunk = 120,
    Rclunk = 121,
    Tremove = 122,
    Rremove = 123,
    Tstat = 124,
    Rstat = 125,
    Twstat = 126,
    Rwstat = 127,
}

impl MessageType {
    /// # Errors
    /// - `value` is not one of the 27 defined codes
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            100 => Ok(MessageType::Tversion),
            101 => Ok(MessageType::Rversion),
            102 => Ok(MessageType::Tauth),
            103 => Ok(MessageType::Rauth),
            104 => Ok(MessageType::Tattach),
            105 => Ok(MessageType::Rattach),
            107 => Ok(MessageType::Rerror),
            108 => Ok(MessageType::Tflush),
            109 => Ok(MessageType::Rflush),
            110 => Ok(MessageType::Twalk),
            111 => Ok(MessageType::Rwalk),
            112 => Ok(MessageType::Topen),
            113 => Ok(MessageType::Ropen),
            114 => Ok(MessageType::Tcreate),
            115 => Ok(MessageType::Rcreate),
            116 => Ok(MessageType::Tread),
            117 => Ok(MessageType::Rread),
            118 => Ok(MessageType::Twrite),
            119 => Ok(MessageType::Rwrite),
            120 => Ok(MessageType::Tclunk),
            121 => Ok(MessageType::Rclunk),
            122 => Ok(MessageType::Tremove),
            123 => Ok(MessageType::Rremove),
            124 => Ok(MessageType::Tstat),
            125 => Ok(MessageType::Rstat),
            126 => Ok(MessageType::Twstat),
            127 => Ok(MessageType::Rwstat),
            _ => Err(Error::violation(format!("unknown message type {value}"))),
        }
    }

    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// T-messages have even codes.
    #[must_use]
    pub fn is_request(self) -> bool {
        self.to_u8() % 2 == 0
    }

    /// The R-message answering this T-message; `None` for replies.
    #[must_use]
    pub fn reply_type(self) -> Option<MessageType> {
        if self.is_request() {
            MessageType::from_u8(self.to_u8() + 1).ok()
        } else {
            None
        }
    }

    /// The T-message this R-message answers; `None` for requests and Rerror.
    #[must_use]
    pub fn request_type(self) -> Option<MessageType> {
        if self.is_request() {
            None
        } else {
            MessageType::from_u8(self.to_u8() - 1).ok()
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            MessageType::Tversion => "Tversion",
            MessageType::Rversion => "Rversion",
            MessageType::Tauth => "Tauth",
            MessageType::Rauth => "Rauth",
            MessageType::Tattach => "Tattach",
            MessageType::Rattach => "Rattach",
            MessageType::Rerror => "Rerror",
            MessageType::Tflush => "Tflush",
            MessageType::Rflush => "Rflush",
            MessageType::Twalk => "Twalk",
            MessageType::Rwalk => "Rwalk",
            MessageType::Topen => "Topen",
            MessageType::Ropen => "Ropen",
            MessageType::Tcreate => "Tcreate",
            MessageType::Rcreate => "Rcreate",
            MessageType::Tread => "Tread",
            MessageType::Rread => "Rread",
            MessageType::Twrite => "Twrite",
            MessageType::Rwrite => "Rwrite",
            MessageType::Tclunk => "Tclunk",
            MessageType::Rclunk => "Rclunk",
            MessageType::Tremove => "Tremove",
            MessageType::Rremove => "Rremove",
            MessageType::Tstat => "Tstat",
            MessageType::Rstat => "Rstat",
            MessageType::Twstat => "Twstat",
            MessageType::Rwstat => "Rwstat",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a header's type code for a decoder acting as `role`.
///
/// # Errors
/// - `code` is outside 100..=127, is 106, or belongs to the other role
pub fn identify(role: Role, code: u8) -> Result<MessageType> {
    match MessageType::from_u8(code) {
        Ok(message_type) if role.decodes(message_type) => Ok(message_type),
        _ => Err(Error::InvalidMessageType { code, role }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_accepts_only_requests() {
        for code in (100..=126).step_by(2).filter(|code| *code != 106) {
            let message_type = identify(Role::Server, code).unwrap();
            assert!(message_type.is_request());
            assert_eq!(message_type.to_u8(), code);
        }
        for code in (101..=127).step_by(2) {
            assert!(matches!(
                identify(Role::Server, code),
                Err(Error::InvalidMessageType {
                    role: Role::Server,
                    ..
                })
            ));
        }
    }

    #[test]
    fn client_accepts_only_replies() {
        for code in (101..=127).step_by(2) {
            let message_type = identify(Role::Client, code).unwrap();
            assert!(!message_type.is_request());
        }
        assert!(identify(Role::Client, 100).is_err());
        assert!(identify(Role::Client, 126).is_err());
    }

    #[test]
    fn terror_is_never_valid() {
        for role in [Role::Client, Role::Server] {
            let err = identify(role, 106).unwrap_err();
            assert!(err.is_protocol_violation());
            assert!(err.to_string().contains("106"));
        }
    }

    #[test]
    fn codes_outside_band_are_rejected() {
        for code in [0, 99, 128, 255] {
            assert!(identify(Role::Server, code).is_err());
            assert!(identify(Role::Client, code).is_err());
        }
    }

    #[test]
    fn requests_pair_with_replies() {
        assert_eq!(
            MessageType::Tattach.reply_type(),
            Some(MessageType::Rattach)
        );
        assert_eq!(MessageType::Rwstat.request_type(), Some(MessageType::Twstat));
        assert_eq!(MessageType::Rerror.request_type(), None);
        assert_eq!(MessageType::Rread.reply_type(), None);
    }

    #[test]
    fn role_parses() {
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
        assert_eq!(Role::Server.peer(), Role::Client);
        assert!("both".parse::<Role>().is_err());
    }
}
