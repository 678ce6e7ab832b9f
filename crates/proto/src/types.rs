use crate::{
    error::{Error, Result},
    wire::{string_len, Wire, WireReader, WireWriter},
};
use flagset::{flags, FlagSet};

flags! {
    /// Bits of `Qid::qtype`.
    pub enum QidType: u8 {
        Dir = 0x80,
        Append = 0x40,
        Exclusive = 0x20,
        Mount = 0x10,
        Auth = 0x08,
        Tmp = 0x04,
    }

    /// Permission and flag bits of `DirEntry::mode` / `Tcreate::perm`.
    pub enum FileMode: u32 {
        Dir = 0x8000_0000,
        Append = 0x4000_0000,
        Exclusive = 0x2000_0000,
        Auth = 0x0800_0000,
        OwnerRead = 0o400,
        OwnerWrite = 0o200,
        OwnerExec = 0o100,
        GroupRead = 0o040,
        GroupWrite = 0o020,
        GroupExec = 0o010,
        OtherRead = 0o004,
        OtherWrite = 0o002,
        OtherExec = 0o001,
    }
}

/// 64-bit unsigned wire value kept as its eight little-endian bytes.
///
/// The value is only turned into an integer when asked for. [`ULong::MAX`]
/// is the all-ones pattern used as "unknown / no limit"; it is a named
/// constant rather than something derived from `-1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ULong([u8; 8]);

impl ULong {
    pub const ZERO: ULong = ULong([0; 8]);
    pub const MAX: ULong = ULong([0xFF; 8]);

    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        u64::from_le_bytes(self.0)
    }

    /// Widen to an integer that can hold any value without a sign bit.
    #[must_use]
    pub const fn to_u128(self) -> u128 {
        self.value() as u128
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        self == Self::MAX
    }
}

impl From<u64> for ULong {
    fn from(value: u64) -> Self {
        Self(value.to_le_bytes())
    }
}

impl From<ULong> for u64 {
    fn from(value: ULong) -> Self {
        value.value()
    }
}

impl TryFrom<i128> for ULong {
    type Error = Error;

    fn try_from(value: i128) -> Result<Self> {
        u64::try_from(value)
            .map(Self::from)
            .map_err(|_| Error::Range {
                kind: "ULong",
                value,
            })
    }
}

impl TryFrom<i64> for ULong {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::try_from(i128::from(value))
    }
}

impl Wire for ULong {
    fn encoded_len(&self) -> usize {
        8
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_ulong(*self)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        r.read_ulong()
    }
}

/// Server-assigned file identity, `type[1] version[4] path[8]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Qid {
    qtype: u8,
    version: u32,
    path: ULong,
}

impl Qid {
    pub const WIRE_LEN: usize = 13;

    #[must_use]
    pub fn new(qtype: u8, version: u32, path: impl Into<ULong>) -> Self {
        Self {
            qtype,
            version,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn qtype(&self) -> u8 {
        self.qtype
    }

    #[must_use]
    pub fn flags(&self) -> FlagSet<QidType> {
        FlagSet::new_truncated(self.qtype)
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn path(&self) -> ULong {
        self.path
    }
}

impl Wire for Qid {
    fn encoded_len(&self) -> usize {
        Self::WIRE_LEN
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u8(self.qtype)?.write_u32(self.version)?;
        self.path.encode(w)
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        Ok(Qid {
            qtype: r.read_u8()?,
            version: r.read_u32()?,
            path: ULong::decode(r)?,
        })
    }
}

/// File metadata record carried by Rstat and Twstat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirEntry {
    /// For kernel use
    pub r#type: u16,
    /// For kernel use
    pub dev: u32,
    pub qid: Qid,
    /// Permissions and flags
    pub mode: u32,
    /// Last access time, seconds since the epoch
    pub atime: u32,
    /// Last modification time, seconds since the epoch
    pub mtime: u32,
    /// Length in bytes
    pub length: ULong,
    pub name: String,
    /// Owner name
    pub uid: String,
    /// Group name
    pub gid: String,
    /// Name of the user who last modified the file
    pub muid: String,
}

impl DirEntry {
    /// Fixed-width part of the record, size field included.
    const FIXED_LEN: usize = 2 + 2 + 4 + Qid::WIRE_LEN + 4 + 4 + 4 + 8;

    /// Total encoded size of the record, including its own 2-byte size field.
    #[must_use]
    pub fn size(&self) -> usize {
        Self::FIXED_LEN
            + string_len(&self.name)
            + string_len(&self.uid)
            + string_len(&self.gid)
            + string_len(&self.muid)
    }

    #[must_use]
    pub fn mode_flags(&self) -> FlagSet<FileMode> {
        FlagSet::new_truncated(self.mode)
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.mode_flags().contains(FileMode::Dir)
    }

    #[must_use]
    pub fn is_append_only(&self) -> bool {
        self.mode_flags().contains(FileMode::Append)
    }

    #[must_use]
    pub fn is_exclusive(&self) -> bool {
        self.mode_flags().contains(FileMode::Exclusive)
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        self.mode_flags().contains(FileMode::Auth)
    }
}

impl Wire for DirEntry {
    fn encoded_len(&self) -> usize {
        self.size()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        let body = self.size() - 2;
        let body = u16::try_from(body).map_err(|_| Error::MessageTooLarge {
            size: body,
            max: u16::MAX as usize,
        })?;

        w.write_u16(body)?
            .write_u16(self.r#type)?
            .write_u32(self.dev)?;
        self.qid.encode(w)?;
        w.write_u32(self.mode)?
            .write_u32(self.atime)?
            .write_u32(self.mtime)?;
        self.length.encode(w)?;
        w.write_string(&self.name)?
            .write_string(&self.uid)?
            .write_string(&self.gid)?
            .write_string(&self.muid)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let declared = r.read_u16()? as usize;
        let mut body = WireReader::new(r.read_bytes(declared)?);

        let entry = DirEntry {
            r#type: body.read_u16()?,
            dev: body.read_u32()?,
            qid: Qid::decode(&mut body)?,
            mode: body.read_u32()?,
            atime: body.read_u32()?,
            mtime: body.read_u32()?,
            length: ULong::decode(&mut body)?,
            name: body.read_string()?,
            uid: body.read_string()?,
            gid: body.read_string()?,
            muid: body.read_string()?,
        };

        if body.remaining() != 0 {
            return Err(Error::violation(format!(
                "stat declares {declared} bytes but its fields use {}",
                declared - body.remaining()
            )));
        }

        Ok(entry)
    }
}
