use crate::{
    consts::{HEADER_LENGTH, MAXWELEM},
    error::{Error, Result},
};
use bytes::Bytes;

pub mod codec;
pub mod consts;
pub mod error;
mod fmt;
pub mod framing;
pub mod registry;
pub mod types;
pub mod wire;

pub use codec::MessageCodec;
pub use framing::{encode_message, DecoderConfig, FrameDecoder};
pub use registry::{identify, MessageType, Role};
pub use types::{DirEntry, FileMode, Qid, QidType, ULong};
pub use wire::{UByte, UInt, UShort, Wire, WireReader, WireWriter};

/// A message together with the tag that correlates it with its reply.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedMessage {
    pub tag: u16,
    pub message: Message,
}

impl TaggedMessage {
    #[must_use]
    pub fn new(tag: u16, message: Message) -> Self {
        Self { tag, message }
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        self.message.message_type()
    }

    /// Value of the header's `length` field: header plus body.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        HEADER_LENGTH + self.message.body_len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Tversion(Tversion),
    Rversion(Rversion),
    Tauth(Tauth),
    Rauth(Rauth),
    Tattach(Tattach),
    Rattach(Rattach),
    Rerror(Rerror),
    Tflush(Tflush),
    Rflush(Rflush),
    Twalk(Twalk),
    Rwalk(Rwalk),
    Topen(Topen),
    Ropen(Ropen),
    Tcreate(Tcreate),
    Rcreate(Rcreate),
    Tread(Tread),
    Rread(Rread),
    Twrite(Twrite),
    Rwrite(Rwrite),
    Tclunk(Tclunk),
    Rclunk(Rclunk),
    Tremove(Tremove),
    Rremove(Rremove),
    Tstat(Tstat),
    Rstat(Rstat),
    Twstat(Twstat),
    Rwstat(Rwstat),
}

impl Message {
    #[must_use]
    pub fn error(ename: impl Into<String>) -> Message {
        Message::Rerror(Rerror {
            ename: ename.into(),
        })
    }

    #[must_use]
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Tversion(_) => MessageType::Tversion,
            Message::Rversion(_) => MessageType::Rversion,
            Message::Tauth(_) => MessageType::Tauth,
            Message::Rauth(_) => MessageType::Rauth,
            Message::Tattach(_) => MessageType::Tattach,
            Message::Rattach(_) => MessageType::Rattach,
            Message::Rerror(_) => MessageType::Rerror,
            Message::Tflush(_) => MessageType::Tflush,
            Message::Rflush(_) => MessageType::Rflush,
            Message::Twalk(_) => MessageType::Twalk,
            Message::Rwalk(_) => MessageType::Rwalk,
            Message::Topen(_) => MessageType::Topen,
            Message::Ropen(_) => MessageType::Ropen,
            Message::Tcreate(_) => MessageType::Tcreate,
            Message::Rcreate(_) => MessageType::Rcreate,
            Message::Tread(_) => MessageType::Tread,
            Message::Rread(_) => MessageType::Rread,
            Message::Twrite(_) => MessageType::Twrite,
            Message::Rwrite(_) => MessageType::Rwrite,
            Message::Tclunk(_) => MessageType::Tclunk,
            Message::Rclunk(_) => MessageType::Rclunk,
            Message::Tremove(_) => MessageType::Tremove,
            Message::Rremove(_) => MessageType::Rremove,
            Message::Tstat(_) => MessageType::Tstat,
            Message::Rstat(_) => MessageType::Rstat,
            Message::Twstat(_) => MessageType::Twstat,
            Message::Rwstat(_) => MessageType::Rwstat,
        }
    }

    #[must_use]
    pub fn to_tagged(self, tag: u16) -> TaggedMessage {
        TaggedMessage { tag, message: self }
    }

    /// Number of bytes the body occupies after the 7-byte header.
    #[must_use]
    pub fn body_len(&self) -> usize {
        match self {
            Message::Tversion(msg) => msg.encoded_len(),
            Message::Rversion(msg) => msg.encoded_len(),
            Message::Tauth(msg) => msg.encoded_len(),
            Message::Rauth(msg) => msg.encoded_len(),
            Message::Tattach(msg) => msg.encoded_len(),
            Message::Rattach(msg) => msg.encoded_len(),
            Message::Rerror(msg) => msg.encoded_len(),
            Message::Tflush(msg) => msg.encoded_len(),
            Message::Rflush(msg) => msg.encoded_len(),
            Message::Twalk(msg) => msg.encoded_len(),
            Message::Rwalk(msg) => msg.encoded_len(),
            Message::Topen(msg) => msg.encoded_len(),
            Message::Ropen(msg) => msg.encoded_len(),
            Message::Tcreate(msg) => msg.encoded_len(),
            Message::Rcreate(msg) => msg.encoded_len(),
            Message::Tread(msg) => msg.encoded_len(),
            Message::Rread(msg) => msg.encoded_len(),
            Message::Twrite(msg) => msg.encoded_len(),
            Message::Rwrite(msg) => msg.encoded_len(),
            Message::Tclunk(msg) => msg.encoded_len(),
            Message::Rclunk(msg) => msg.encoded_len(),
            Message::Tremove(msg) => msg.encoded_len(),
            Message::Rremove(msg) => msg.encoded_len(),
            Message::Tstat(msg) => msg.encoded_len(),
            Message::Rstat(msg) => msg.encoded_len(),
            Message::Twstat(msg) => msg.encoded_len(),
            Message::Rwstat(msg) => msg.encoded_len(),
        }
    }

    /// Write the type-specific fields, in wire order.
    ///
    /// # Errors
    /// - a field cannot be represented on the wire
    /// - the writer is too small for the body
    pub fn encode_body(&self, w: &mut WireWriter<'_>) -> Result<()> {
        match self {
            Message::Tversion(msg) => msg.encode(w),
            Message::Rversion(msg) => msg.encode(w),
            Message::Tauth(msg) => msg.encode(w),
            Message::Rauth(msg) => msg.encode(w),
            Message::Tattach(msg) => msg.encode(w),
            Message::Rattach(msg) => msg.encode(w),
            Message::Rerror(msg) => msg.encode(w),
            Message::Tflush(msg) => msg.encode(w),
            Message::Rflush(msg) => msg.encode(w),
            Message::Twalk(msg) => msg.encode(w),
            Message::Rwalk(msg) => msg.encode(w),
            Message::Topen(msg) => msg.encode(w),
            Message::Ropen(msg) => msg.encode(w),
            Message::Tcreate(msg) => msg.encode(w),
            Message::Rcreate(msg) => msg.encode(w),
            Message::Tread(msg) => msg.encode(w),
            Message::Rread(msg) => msg.encode(w),
            Message::Twrite(msg) => msg.encode(w),
            Message::Rwrite(msg) => msg.encode(w),
            Message::Tclunk(msg) => msg.encode(w),
            Message::Rclunk(msg) => msg.encode(w),
            Message::Tremove(msg) => msg.encode(w),
            Message::Rremove(msg) => msg.encode(w),
            Message::Tstat(msg) => msg.encode(w),
            Message::Rstat(msg) => msg.encode(w),
            Message::Twstat(msg) => msg.encode(w),
            Message::Rwstat(msg) => msg.encode(w),
        }
    }

    /// Read the fields of a `message_type` body, in wire order.
    ///
    /// # Errors
    /// - the body is too short for its fields
    /// - a field holds an invalid value
    pub fn decode_body(message_type: MessageType, r: &mut WireReader<'_>) -> Result<Message> {
        Ok(match message_type {
            MessageType::Tversion => Message::Tversion(Tversion::decode(r)?),
            MessageType::Rversion => Message::Rversion(Rversion::decode(r)?),
            MessageType::Tauth => Message::Tauth(Tauth::decode(r)?),
            MessageType::Rauth => Message::Rauth(Rauth::decode(r)?),
            MessageType::Tattach => Message::Tattach(Tattach::decode(r)?),
            MessageType::Rattach => Message::Rattach(Rattach::decode(r)?),
            MessageType::Rerror => Message::Rerror(Rerror::decode(r)?),
            MessageType::Tflush => Message::Tflush(Tflush::decode(r)?),
            MessageType::Rflush => Message::Rflush(Rflush::decode(r)?),
            MessageType::Twalk => Message::Twalk(Twalk::decode(r)?),
            MessageType::Rwalk => Message::Rwalk(Rwalk::decode(r)?),
            MessageType::Topen => Message::Topen(Topen::decode(r)?),
            MessageType::Ropen => Message::Ropen(Ropen::decode(r)?),
            MessageType::Tcreate => Message::Tcreate(Tcreate::decode(r)?),
            MessageType::Rcreate => Message::Rcreate(Rcreate::decode(r)?),
            MessageType::Tread => Message::Tread(Tread::decode(r)?),
            MessageType::Rread => Message::Rread(Rread::decode(r)?),
            MessageType::Twrite => Message::Twrite(Twrite::decode(r)?),
            MessageType::Rwrite => Message::Rwrite(Rwrite::decode(r)?),
            MessageType::Tclunk => Message::Tclunk(Tclunk::decode(r)?),
            MessageType::Rclunk => Message::Rclunk(Rclunk::decode(r)?),
            MessageType::Tremove => Message::Tremove(Tremove::decode(r)?),
            MessageType::Rremove => Message::Rremove(Rremove::decode(r)?),
            MessageType::Tstat => Message::Tstat(Tstat::decode(r)?),
            MessageType::Rstat => Message::Rstat(Rstat::decode(r)?),
            MessageType::Twstat => Message::Twstat(Twstat::decode(r)?),
            MessageType::Rwstat => Message::Rwstat(Rwstat::decode(r)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tversion {
    pub msize: u32,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rversion {
    pub msize: u32,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tauth {
    pub afid: u32,
    pub uname: String,
    pub aname: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rauth {
    pub aqid: Qid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tattach {
    pub fid: u32,
    /// `NOFID` when the connection is not authenticated
    pub afid: u32,
    pub uname: String,
    pub aname: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rattach {
    pub qid: Qid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rerror {
    pub ename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tflush {
    pub oldtag: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rflush;

#[derive(Debug, Clone, PartialEq)]
pub struct Twalk {
    pub fid: u32,
    pub newfid: u32,
    pub wnames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rwalk {
    pub wqids: Vec<Qid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Topen {
    pub fid: u32,
    pub mode: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ropen {
    pub qid: Qid,
    pub iounit: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tcreate {
    pub fid: u32,
    pub name: String,
    pub perm: u32,
    pub mode: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rcreate {
    pub qid: Qid,
    pub iounit: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tread {
    pub fid: u32,
    pub offset: ULong,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rread {
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Twrite {
    pub fid: u32,
    pub offset: ULong,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rwrite {
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tclunk {
    pub fid: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rclunk;

#[derive(Debug, Clone, PartialEq)]
pub struct Tremove {
    pub fid: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rremove;

#[derive(Debug, Clone, PartialEq)]
pub struct Tstat {
    pub fid: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rstat {
    pub stat: DirEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Twstat {
    pub fid: u32,
    pub stat: DirEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rwstat;

fn check_walk_len(len: usize) -> Result<()> {
    if len > MAXWELEM {
        return Err(Error::TooManyElements(len));
    }
    Ok(())
}

fn data_len(data: &Bytes) -> Result<u32> {
    u32::try_from(data.len()).map_err(|_| Error::MessageTooLarge {
        size: data.len(),
        max: u32::MAX as usize,
    })
}

fn read_data(r: &mut WireReader<'_>) -> Result<Bytes> {
    let count = r.read_u32()? as usize;
    Ok(Bytes::copy_from_slice(r.read_bytes(count)?))
}

/// Stat fields are wrapped in a second `n[2]` count on the wire.
fn encode_stat(stat: &DirEntry, w: &mut WireWriter<'_>) -> Result<()> {
    let size = stat.size();
    let n = u16::try_from(size).map_err(|_| Error::MessageTooLarge {
        size,
        max: u16::MAX as usize,
    })?;
    w.write_u16(n)?;
    stat.encode(w)
}

fn decode_stat(r: &mut WireReader<'_>) -> Result<DirEntry> {
    let n = r.read_u16()? as usize;
    let stat = DirEntry::decode(r)?;
    if stat.size() != n {
        return Err(Error::violation(format!(
            "stat count {n} does not match entry size {}",
            stat.size()
        )));
    }
    Ok(stat)
}

impl Wire for Tversion {
    fn encoded_len(&self) -> usize {
        4 + self.version.encoded_len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.msize)?.write_string(&self.version)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tversion {
            msize: r.read_u32()?,
            version: r.read_string()?,
        })
    }
}

impl Wire for Rversion {
    fn encoded_len(&self) -> usize {
        4 + self.version.encoded_len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.msize)?.write_string(&self.version)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rversion {
            msize: r.read_u32()?,
            version: r.read_string()?,
        })
    }
}

impl Wire for Tauth {
    fn encoded_len(&self) -> usize {
        4 + self.uname.encoded_len() + self.aname.encoded_len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.afid)?
            .write_string(&self.uname)?
            .write_string(&self.aname)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tauth {
            afid: r.read_u32()?,
            uname: r.read_string()?,
            aname: r.read_string()?,
        })
    }
}

impl Wire for Rauth {
    fn encoded_len(&self) -> usize {
        Qid::WIRE_LEN
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.aqid.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rauth {
            aqid: Qid::decode(r)?,
        })
    }
}

impl Wire for Tattach {
    fn encoded_len(&self) -> usize {
        4 + 4 + self.uname.encoded_len() + self.aname.encoded_len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.fid)?
            .write_u32(self.afid)?
            .write_string(&self.uname)?
            .write_string(&self.aname)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tattach {
            fid: r.read_u32()?,
            afid: r.read_u32()?,
            uname: r.read_string()?,
            aname: r.read_string()?,
        })
    }
}

impl Wire for Rattach {
    fn encoded_len(&self) -> usize {
        Qid::WIRE_LEN
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.qid.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rattach {
            qid: Qid::decode(r)?,
        })
    }
}

impl Wire for Rerror {
    fn encoded_len(&self) -> usize {
        self.ename.encoded_len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.ename.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rerror {
            ename: r.read_string()?,
        })
    }
}

impl Wire for Tflush {
    fn encoded_len(&self) -> usize {
        2
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.oldtag.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tflush {
            oldtag: r.read_u16()?,
        })
    }
}

impl Wire for Rflush {
    fn encoded_len(&self) -> usize {
        0
    }

    fn encode(&self, _w: &mut WireWriter<'_>) -> Result<()> {
        Ok(())
    }

    fn decode(_r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rflush)
    }
}

impl Wire for Twalk {
    fn encoded_len(&self) -> usize {
        4 + 4 + self.wnames.encoded_len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        check_walk_len(self.wnames.len())?;
        w.write_u32(self.fid)?.write_u32(self.newfid)?;
        self.wnames.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let fid = r.read_u32()?;
        let newfid = r.read_u32()?;
        let wnames = Vec::<String>::decode(r)?;
        check_walk_len(wnames.len())?;
        Ok(Twalk {
            fid,
            newfid,
            wnames,
        })
    }
}

impl Wire for Rwalk {
    fn encoded_len(&self) -> usize {
        self.wqids.encoded_len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        check_walk_len(self.wqids.len())?;
        self.wqids.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let wqids = Vec::<Qid>::decode(r)?;
        check_walk_len(wqids.len())?;
        Ok(Rwalk { wqids })
    }
}

impl Wire for Topen {
    fn encoded_len(&self) -> usize {
        4 + 1
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.fid)?.write_u8(self.mode)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Topen {
            fid: r.read_u32()?,
            mode: r.read_u8()?,
        })
    }
}

impl Wire for Ropen {
    fn encoded_len(&self) -> usize {
        Qid::WIRE_LEN + 4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.qid.encode(w)?;
        w.write_u32(self.iounit)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Ropen {
            qid: Qid::decode(r)?,
            iounit: r.read_u32()?,
        })
    }
}

impl Wire for Tcreate {
    fn encoded_len(&self) -> usize {
        4 + self.name.encoded_len() + 4 + 1
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.fid)?
            .write_string(&self.name)?
            .write_u32(self.perm)?
            .write_u8(self.mode)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tcreate {
            fid: r.read_u32()?,
            name: r.read_string()?,
            perm: r.read_u32()?,
            mode: r.read_u8()?,
        })
    }
}

impl Wire for Rcreate {
    fn encoded_len(&self) -> usize {
        Qid::WIRE_LEN + 4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.qid.encode(w)?;
        w.write_u32(self.iounit)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rcreate {
            qid: Qid::decode(r)?,
            iounit: r.read_u32()?,
        })
    }
}

impl Wire for Tread {
    fn encoded_len(&self) -> usize {
        4 + 8 + 4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.fid)?;
        self.offset.encode(w)?;
        w.write_u32(self.count)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tread {
            fid: r.read_u32()?,
            offset: ULong::decode(r)?,
            count: r.read_u32()?,
        })
    }
}

impl Wire for Rread {
    fn encoded_len(&self) -> usize {
        4 + self.data.len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(data_len(&self.data)?)?.write_bytes(&self.data)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rread {
            data: read_data(r)?,
        })
    }
}

impl Wire for Twrite {
    fn encoded_len(&self) -> usize {
        4 + 8 + 4 + self.data.len()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.fid)?;
        self.offset.encode(w)?;
        w.write_u32(data_len(&self.data)?)?.write_bytes(&self.data)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Twrite {
            fid: r.read_u32()?,
            offset: ULong::decode(r)?,
            data: read_data(r)?,
        })
    }
}

impl Wire for Rwrite {
    fn encoded_len(&self) -> usize {
        4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.count.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rwrite {
            count: r.read_u32()?,
        })
    }
}

impl Wire for Tclunk {
    fn encoded_len(&self) -> usize {
        4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.fid.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tclunk { fid: r.read_u32()? })
    }
}

impl Wire for Rclunk {
    fn encoded_len(&self) -> usize {
        0
    }

    fn encode(&self, _w: &mut WireWriter<'_>) -> Result<()> {
        Ok(())
    }

    fn decode(_r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rclunk)
    }
}

impl Wire for Tremove {
    fn encoded_len(&self) -> usize {
        4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.fid.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tremove { fid: r.read_u32()? })
    }
}

impl Wire for Rremove {
    fn encoded_len(&self) -> usize {
        0
    }

    fn encode(&self, _w: &mut WireWriter<'_>) -> Result<()> {
        Ok(())
    }

    fn decode(_r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rremove)
    }
}

impl Wire for Tstat {
    fn encoded_len(&self) -> usize {
        4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        self.fid.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Tstat { fid: r.read_u32()? })
    }
}

impl Wire for Rstat {
    fn encoded_len(&self) -> usize {
        2 + self.stat.size()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        encode_stat(&self.stat, w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rstat {
            stat: decode_stat(r)?,
        })
    }
}

impl Wire for Twstat {
    fn encoded_len(&self) -> usize {
        4 + 2 + self.stat.size()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(self.fid)?;
        encode_stat(&self.stat, w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Twstat {
            fid: r.read_u32()?,
            stat: decode_stat(r)?,
        })
    }
}

impl Wire for Rwstat {
    fn encoded_len(&self) -> usize {
        0
    }

    fn encode(&self, _w: &mut WireWriter<'_>) -> Result<()> {
        Ok(())
    }

    fn decode(_r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Rwstat)
    }
}

#[cfg(test)]
mod tests;
