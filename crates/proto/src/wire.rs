//! Little-endian primitive codec over borrowed byte regions.
//!
//! [`WireReader`] and [`WireWriter`] never own their storage: the caller
//! hands in a slice for the duration of one decode/encode call and every
//! typed read or write advances the position by exactly the width of the
//! primitive. Running off the end of the region is a
//! [`Error::BufferUnderrun`], never an out-of-bounds access.
use crate::{
    error::{Error, Result},
    types::ULong,
};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::Cursor;

pub trait Wire: Sized {
    /// Exact number of bytes `encode` will write.
    fn encoded_len(&self) -> usize;

    /// # Errors
    /// - the value cannot be represented on the wire
    /// - the writer has fewer than `encoded_len` bytes left
    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()>;

    /// # Errors
    /// - the reader runs out of bytes
    /// - the bytes do not form a valid value
    fn decode(r: &mut WireReader<'_>) -> Result<Self>;
}

pub struct WireReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> WireReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // bounded by the slice length
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(Error::BufferUnderrun { needed, remaining });
        }
        Ok(())
    }

    /// # Errors
    /// - fewer than 1 byte remaining
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.cursor.read_u8()?)
    }

    /// # Errors
    /// - fewer than 2 bytes remaining
    pub fn read_u16(&mut self) -> Result<u16> {
        self.ensure(2)?;
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    /// # Errors
    /// - fewer than 4 bytes remaining
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure(4)?;
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    /// # Errors
    /// - fewer than 8 bytes remaining
    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure(8)?;
        Ok(self.cursor.read_u64::<LittleEndian>()?)
    }

    /// Borrow the next `len` bytes of the underlying region.
    ///
    /// # Errors
    /// - fewer than `len` bytes remaining
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure(len)?;
        let start = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    /// # Errors
    /// - fewer than 8 bytes remaining
    pub fn read_ulong(&mut self) -> Result<ULong> {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.read_bytes(8)?);
        Ok(ULong::from_le_bytes(bytes))
    }

    /// Read a `len[2] utf8[len]` string.
    ///
    /// # Errors
    /// - the length prefix or the string bytes run past the region
    /// - the bytes are not valid UTF-8
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

pub struct WireWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WireWriter<'a> {
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Number of bytes written, consuming the writer.
    #[must_use]
    pub fn finish(self) -> usize {
        self.pos
    }

    fn claim(&mut self, needed: usize) -> Result<&mut [u8]> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(Error::BufferUnderrun { needed, remaining });
        }
        let start = self.pos;
        self.pos += needed;
        Ok(&mut self.buf[start..start + needed])
    }

    /// # Errors
    /// - no room left in the region
    pub fn write_u8(&mut self, value: u8) -> Result<&mut Self> {
        self.claim(1)?[0] = value;
        Ok(self)
    }

    /// # Errors
    /// - fewer than 2 bytes of room left
    pub fn write_u16(&mut self, value: u16) -> Result<&mut Self> {
        LittleEndian::write_u16(self.claim(2)?, value);
        Ok(self)
    }

    /// # Errors
    /// - fewer than 4 bytes of room left
    pub fn write_u32(&mut self, value: u32) -> Result<&mut Self> {
        LittleEndian::write_u32(self.claim(4)?, value);
        Ok(self)
    }

    /// # Errors
    /// - fewer than 8 bytes of room left
    pub fn write_u64(&mut self, value: u64) -> Result<&mut Self> {
        LittleEndian::write_u64(self.claim(8)?, value);
        Ok(self)
    }

    /// # Errors
    /// - fewer than 8 bytes of room left
    pub fn write_ulong(&mut self, value: ULong) -> Result<&mut Self> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// # Errors
    /// - `value` is outside 0..=255
    /// - no room left in the region
    pub fn write_ubyte(&mut self, value: i64) -> Result<&mut Self> {
        self.write_u8(UByte::new(value)?.get())
    }

    /// # Errors
    /// - `value` is outside 0..=65535
    /// - fewer than 2 bytes of room left
    pub fn write_ushort(&mut self, value: i64) -> Result<&mut Self> {
        self.write_u16(UShort::new(value)?.get())
    }

    /// # Errors
    /// - `value` is outside 0..=4294967295
    /// - fewer than 4 bytes of room left
    pub fn write_uint(&mut self, value: i64) -> Result<&mut Self> {
        self.write_u32(UInt::new(value)?.get())
    }

    /// # Errors
    /// - fewer than `data.len()` bytes of room left
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<&mut Self> {
        self.claim(data.len())?.copy_from_slice(data);
        Ok(self)
    }

    /// Write a `len[2] utf8[len]` string.
    ///
    /// # Errors
    /// - the UTF-8 encoding is longer than 65535 bytes
    /// - not enough room for the prefix and the bytes
    pub fn write_string(&mut self, value: &str) -> Result<&mut Self> {
        let bytes = value.as_bytes();
        let len = u16::try_from(bytes.len()).map_err(|_| Error::StringTooLong(bytes.len()))?;
        self.write_u16(len)?.write_bytes(bytes)
    }
}

/// Wire size of a string: 2-byte length prefix plus its UTF-8 bytes.
#[must_use]
pub fn string_len(value: &str) -> usize {
    2 + value.len()
}

macro_rules! unsigned_primitive {
    ($name:ident, $inner:ty, $write:ident, $read:ident) => {
        /// Unsigned wire value whose constructor rejects anything outside
        #[doc = concat!("the range of `", stringify!($inner), "`.")]
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($inner);

        impl $name {
            pub const MAX: Self = Self(<$inner>::MAX);

            /// # Errors
            /// - `value` is negative or too large
            pub fn new(value: i64) -> Result<Self> {
                <$inner>::try_from(value).map(Self).map_err(|_| Error::Range {
                    kind: stringify!($name),
                    value: i128::from(value),
                })
            }

            #[must_use]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = Error;

            fn try_from(value: i64) -> Result<Self> {
                Self::new(value)
            }
        }

        impl Wire for $name {
            fn encoded_len(&self) -> usize {
                std::mem::size_of::<$inner>()
            }

            fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
                w.$write(self.0)?;
                Ok(())
            }

            fn decode(r: &mut WireReader<'_>) -> Result<Self> {
                Ok(Self(r.$read()?))
            }
        }
    };
}

unsigned_primitive!(UByte, u8, write_u8, read_u8);
unsigned_primitive!(UShort, u16, write_u16, read_u16);
unsigned_primitive!(UInt, u32, write_u32, read_u32);

impl Wire for u8 {
    fn encoded_len(&self) -> usize {
        1
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u8(*self)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        r.read_u8()
    }
}

impl Wire for u16 {
    fn encoded_len(&self) -> usize {
        2
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u16(*self)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        r.read_u16()
    }
}

impl Wire for u32 {
    fn encoded_len(&self) -> usize {
        4
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u32(*self)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        r.read_u32()
    }
}

impl Wire for u64 {
    fn encoded_len(&self) -> usize {
        8
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_u64(*self)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        r.read_u64()
    }
}

impl Wire for String {
    fn encoded_len(&self) -> usize {
        string_len(self)
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.write_string(self)?;
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        r.read_string()
    }
}

/// `count[2]` followed by `count` elements.
impl<T: Wire> Wire for Vec<T> {
    fn encoded_len(&self) -> usize {
        2 + self.iter().map(Wire::encoded_len).sum::<usize>()
    }

    fn encode(&self, w: &mut WireWriter<'_>) -> Result<()> {
        let count = u16::try_from(self.len()).map_err(|_| Error::TooManyElements(self.len()))?;
        w.write_u16(count)?;
        for item in self {
            item.encode(w)?;
        }
        Ok(())
    }

    fn decode(r: &mut WireReader<'_>) -> Result<Self> {
        let count = r.read_u16()? as usize;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::decode(r)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_and_advances() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut r = WireReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0x01);
        assert_eq!(r.position(), 1);
        assert_eq!(r.read_u16().unwrap(), 0x0302);
        assert_eq!(r.position(), 3);
        assert_eq!(r.read_u32().unwrap(), 0x0706_0504);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn read_past_end_is_underrun() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut r = WireReader::new(&data);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(
            err,
            Error::BufferUnderrun {
                needed: 4,
                remaining: 3
            }
        ));
        // the failed read must not move the cursor
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u16().unwrap(), 0xBBAA);
    }

    #[test]
    fn string_length_counts_bytes() {
        let mut buf = [0u8; 8];
        let mut w = WireWriter::new(&mut buf);
        w.write_string("héé").unwrap();
        assert_eq!(w.finish(), 7);
        assert_eq!(&buf[..2], &[5, 0]);

        let mut r = WireReader::new(&buf[..7]);
        assert_eq!(r.read_string().unwrap(), "héé");
    }

    #[test]
    fn truncated_string_is_underrun() {
        let data = [4, 0, b'a', b'b'];
        let mut r = WireReader::new(&data);
        assert!(matches!(
            r.read_string(),
            Err(Error::BufferUnderrun {
                needed: 4,
                remaining: 2
            })
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let data = [2, 0, 0xC3, 0x28];
        let mut r = WireReader::new(&data);
        assert!(matches!(r.read_string(), Err(Error::InvalidUtf8(_))));
    }

    #[test]
    fn write_past_end_is_underrun() {
        let mut buf = [0u8; 3];
        let mut w = WireWriter::new(&mut buf);
        w.write_u16(7).unwrap();
        assert!(matches!(
            w.write_u32(1),
            Err(Error::BufferUnderrun {
                needed: 4,
                remaining: 1
            })
        ));
    }

    #[test]
    fn writes_chain() {
        let mut buf = [0u8; 7];
        let mut w = WireWriter::new(&mut buf);
        w.write_u32(24).unwrap().write_u8(104).unwrap().write_u16(1).unwrap();
        assert_eq!(w.finish(), 7);
        assert_eq!(buf, [24, 0, 0, 0, 104, 1, 0]);
    }

    #[test]
    fn unsigned_boundaries() {
        assert_eq!(UByte::new(255).unwrap().get(), 255);
        assert!(matches!(
            UByte::new(256),
            Err(Error::Range {
                kind: "UByte",
                value: 256
            })
        ));
        assert!(UByte::new(-1).is_err());

        assert_eq!(UShort::new(65535).unwrap().get(), 65535);
        assert!(matches!(UShort::new(65536), Err(Error::Range { .. })));
        assert!(matches!(UShort::new(-1), Err(Error::Range { .. })));

        assert_eq!(UInt::new(4_294_967_295).unwrap(), UInt::MAX);
        assert!(matches!(
            UInt::new(4_294_967_296),
            Err(Error::Range { kind: "UInt", .. })
        ));
        assert!(matches!(UInt::new(-1), Err(Error::Range { .. })));
    }

    #[test]
    fn checked_writers_reject_out_of_range() {
        let mut buf = [0u8; 4];
        let mut w = WireWriter::new(&mut buf);
        assert!(matches!(w.write_uint(-1), Err(Error::Range { .. })));
        assert!(matches!(w.write_uint(4_294_967_296), Err(Error::Range { .. })));
        // nothing was written by the rejected calls
        assert_eq!(w.position(), 0);
        w.write_uint(4_294_967_295).unwrap();
        assert_eq!(buf, [0xFF; 4]);

        let mut r = WireReader::new(&buf);
        assert_eq!(UInt::decode(&mut r).unwrap(), UInt::MAX);
    }

    #[test]
    fn vector_has_count_prefix() {
        let names = vec!["a".to_string(), "bc".to_string()];
        assert_eq!(names.encoded_len(), 2 + 3 + 4);

        let mut buf = vec![0u8; names.encoded_len()];
        names.encode(&mut WireWriter::new(&mut buf)).unwrap();
        assert_eq!(&buf[..2], &[2, 0]);

        let decoded = Vec::<String>::decode(&mut WireReader::new(&buf)).unwrap();
        assert_eq!(decoded, names);
    }

    #[test]
    fn ulong_all_ones_is_not_negative() {
        let mut buf = [0u8; 8];
        WireWriter::new(&mut buf).write_ulong(ULong::MAX).unwrap();
        assert_eq!(buf, [0xFF; 8]);

        let value = WireReader::new(&buf).read_ulong().unwrap();
        assert!(value.is_max());
        assert_eq!(value.to_u128(), u128::from(u64::MAX));
    }
}
