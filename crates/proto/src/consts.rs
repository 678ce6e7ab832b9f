/// Size of the `length[4] type[1] tag[2]` header that starts every message.
pub const HEADER_LENGTH: usize = 7;

pub const NOTAG: u16 = 0xFFFF;
pub const NOFID: u32 = 0xFFFF_FFFF;

/// Maximum number of path elements in a single Twalk/Rwalk.
pub const MAXWELEM: usize = 16;

/// Room for the Tread/Twrite/Rread header on top of the payload.
pub const IOHDRSZ: u32 = 24;

pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 1 << 20;

pub const VERSION_9P2000: &str = "9P2000";

pub const QID_TYPE_DIR: u8 = 0x80;
pub const QID_TYPE_APPEND: u8 = 0x40;
pub const QID_TYPE_EXCL: u8 = 0x20;
pub const QID_TYPE_MOUNT: u8 = 0x10;
pub const QID_TYPE_AUTH: u8 = 0x08;
pub const QID_TYPE_TMP: u8 = 0x04;
pub const QID_TYPE_FILE: u8 = 0x00;

pub const DMDIR: u32 = 0x8000_0000;
pub const DMAPPEND: u32 = 0x4000_0000;
pub const DMEXCL: u32 = 0x2000_0000;
pub const DMAUTH: u32 = 0x0800_0000;

pub const OREAD: u8 = 0;
pub const OWRITE: u8 = 1;
pub const ORDWR: u8 = 2;
pub const OEXEC: u8 = 3;
pub const OTRUNC: u8 = 0x10;
pub const ORCLOSE: u8 = 0x40;
