//! Binary archives, backed by `byteorder`.
//!
//! Names and object boundaries are not recorded. Strings and sequences are
//! prefixed with a `u64` length, `bool` is one byte and `char` is a `u32`.
//!
//! The plain binary archives use the native byte order. The portable ones
//! start with one tag byte (`1` little endian, `0` big endian); the writer's
//! order is configurable and the reader follows the tag.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::SerialError;
use crate::archive::{InputArchive, OutputArchive, Scalar, ScalarKind};

// -----------------------------------------------------------------------------
// Endian

/// Byte order of multi-byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// The byte order of the target.
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::Little
        } else {
            Self::Big
        }
    }

    const fn tag(self) -> u8 {
        match self {
            Self::Little => 1,
            Self::Big => 0,
        }
    }

    fn from_tag(tag: u8) -> Result<Self, SerialError> {
        match tag {
            1 => Ok(Self::Little),
            0 => Ok(Self::Big),
            other => Err(SerialError::Endianness(other)),
        }
    }
}

impl Default for Endian {
    fn default() -> Self {
        Self::native()
    }
}

// Dispatches a generic `byteorder` call on a runtime `Endian`.
macro_rules! ordered {
    ($endian:expr, $io:expr, $method:ident ( $($arg:expr)? )) => {
        match $endian {
            Endian::Little => $io.$method::<LittleEndian>($($arg)?),
            Endian::Big => $io.$method::<BigEndian>($($arg)?),
        }
    };
}

// -----------------------------------------------------------------------------
// BinaryOutputArchive

/// Writes values to `W` in a compact binary layout.
///
/// The writer is flushed by [`finish`](Self::finish), and again on drop.
pub struct BinaryOutputArchive<W: Write> {
    writer: W,
    endian: Endian,
    depth: usize,
}

impl<W: Write> BinaryOutputArchive<W> {
    /// Creates an archive using the native byte order.
    pub fn new(writer: W) -> Self {
        Self::with_endian(writer, Endian::native())
    }

    fn with_endian(writer: W, endian: Endian) -> Self {
        Self {
            writer,
            endian,
            depth: 0,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Checks that every node was closed and flushes the writer.
    pub fn finish(&mut self) -> Result<(), SerialError> {
        if self.depth != 0 {
            return Err(SerialError::Unbalanced("binary node left open at finish"));
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_len(&mut self, len: usize) -> Result<(), SerialError> {
        ordered!(self.endian, self.writer, write_u64(len as u64))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SerialError> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or(SerialError::Unbalanced("binary node closed twice"))?;
        Ok(())
    }
}

impl<W: Write> Drop for BinaryOutputArchive<W> {
    fn drop(&mut self) {
        if let Err(err) = self.writer.flush() {
            log::error!("failed to flush binary archive on drop: {err}");
        }
    }
}

impl<W: Write> OutputArchive for BinaryOutputArchive<W> {
    #[inline]
    fn set_next_name(&mut self, _name: &str) {}

    fn write_scalar(&mut self, value: Scalar<'_>) -> Result<(), SerialError> {
        let endian = self.endian;
        let w = &mut self.writer;
        match value {
            Scalar::Bool(v) => w.write_u8(u8::from(v))?,
            Scalar::Char(v) => ordered!(endian, w, write_u32(u32::from(v)))?,
            Scalar::I8(v) => w.write_i8(v)?,
            Scalar::I16(v) => ordered!(endian, w, write_i16(v))?,
            Scalar::I32(v) => ordered!(endian, w, write_i32(v))?,
            Scalar::I64(v) => ordered!(endian, w, write_i64(v))?,
            Scalar::U8(v) => w.write_u8(v)?,
            Scalar::U16(v) => ordered!(endian, w, write_u16(v))?,
            Scalar::U32(v) => ordered!(endian, w, write_u32(v))?,
            Scalar::U64(v) => ordered!(endian, w, write_u64(v))?,
            Scalar::F32(v) => ordered!(endian, w, write_f32(v))?,
            Scalar::F64(v) => ordered!(endian, w, write_f64(v))?,
            Scalar::Str(v) => {
                self.write_len(v.len())?;
                self.writer.write_all(v.as_bytes())?;
            }
        }
        Ok(())
    }

    fn begin_object(&mut self) -> Result<(), SerialError> {
        self.depth += 1;
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), SerialError> {
        self.close()
    }

    fn begin_sequence(&mut self, len: usize) -> Result<(), SerialError> {
        self.write_len(len)?;
        self.depth += 1;
        Ok(())
    }

    fn end_sequence(&mut self) -> Result<(), SerialError> {
        self.close()
    }
}

// -----------------------------------------------------------------------------
// BinaryInputArchive

/// Reads values written by [`BinaryOutputArchive`].
pub struct BinaryInputArchive<R: Read> {
    reader: R,
    endian: Endian,
    depth: usize,
}

impl<R: Read> BinaryInputArchive<R> {
    /// Creates an archive using the native byte order.
    pub fn new(reader: R) -> Self {
        Self::with_endian(reader, Endian::native())
    }

    fn with_endian(reader: R, endian: Endian) -> Self {
        Self {
            reader,
            endian,
            depth: 0,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    fn read_len(&mut self) -> Result<usize, SerialError> {
        let len = ordered!(self.endian, self.reader, read_u64())?;
        usize::try_from(len).map_err(|_| SerialError::OutOfRange {
            kind: ScalarKind::U64,
            value: alloc::format!("{len}"),
        })
    }

    fn close(&mut self) -> Result<(), SerialError> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or(SerialError::Unbalanced("binary node closed twice"))?;
        Ok(())
    }
}

impl<R: Read> InputArchive for BinaryInputArchive<R> {
    fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>, SerialError> {
        let endian = self.endian;
        let r = &mut self.reader;
        Ok(match kind {
            ScalarKind::Bool => match r.read_u8()? {
                0 => Scalar::Bool(false),
                1 => Scalar::Bool(true),
                other => return Err(SerialError::mismatch("bool", alloc::format!("byte {other}"))),
            },
            ScalarKind::Char => {
                let code = ordered!(endian, r, read_u32())?;
                let c = char::from_u32(code).ok_or_else(|| SerialError::OutOfRange {
                    kind,
                    value: alloc::format!("{code:#x}"),
                })?;
                Scalar::Char(c)
            }
            ScalarKind::I8 => Scalar::I8(r.read_i8()?),
            ScalarKind::I16 => Scalar::I16(ordered!(endian, r, read_i16())?),
            ScalarKind::I32 => Scalar::I32(ordered!(endian, r, read_i32())?),
            ScalarKind::I64 => Scalar::I64(ordered!(endian, r, read_i64())?),
            ScalarKind::U8 => Scalar::U8(r.read_u8()?),
            ScalarKind::U16 => Scalar::U16(ordered!(endian, r, read_u16())?),
            ScalarKind::U32 => Scalar::U32(ordered!(endian, r, read_u32())?),
            ScalarKind::U64 => Scalar::U64(ordered!(endian, r, read_u64())?),
            ScalarKind::F32 => Scalar::F32(ordered!(endian, r, read_f32())?),
            ScalarKind::F64 => Scalar::F64(ordered!(endian, r, read_f64())?),
            ScalarKind::Str => {
                let len = self.read_len()?;
                let mut bytes = Vec::new();
                (&mut self.reader).take(len as u64).read_to_end(&mut bytes)?;
                if bytes.len() != len {
                    return Err(SerialError::UnexpectedEnd("binary string"));
                }
                Scalar::Str(Cow::Owned(String::from_utf8(bytes)?))
            }
        })
    }

    fn begin_object(&mut self) -> Result<(), SerialError> {
        self.depth += 1;
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), SerialError> {
        self.close()
    }

    fn begin_sequence(&mut self) -> Result<usize, SerialError> {
        let len = self.read_len()?;
        self.depth += 1;
        Ok(len)
    }

    fn end_sequence(&mut self) -> Result<(), SerialError> {
        self.close()
    }
}

// -----------------------------------------------------------------------------
// Portable binary

/// Output settings of [`PortableBinaryOutputArchive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortableBinaryOptions {
    /// Byte order of the written data, native by default.
    pub endian: Endian,
}

/// A [`BinaryOutputArchive`] whose stream starts with its byte order tag.
pub struct PortableBinaryOutputArchive<W: Write>(BinaryOutputArchive<W>);

impl<W: Write> PortableBinaryOutputArchive<W> {
    /// Writes the tag for the native byte order.
    pub fn new(writer: W) -> Result<Self, SerialError> {
        Self::with_options(writer, PortableBinaryOptions::default())
    }

    pub fn with_options(mut writer: W, options: PortableBinaryOptions) -> Result<Self, SerialError> {
        writer.write_u8(options.endian.tag())?;
        Ok(Self(BinaryOutputArchive::with_endian(writer, options.endian)))
    }

    pub fn endian(&self) -> Endian {
        self.0.endian
    }

    /// See [`BinaryOutputArchive::finish`].
    pub fn finish(&mut self) -> Result<(), SerialError> {
        self.0.finish()
    }
}

impl<W: Write> OutputArchive for PortableBinaryOutputArchive<W> {
    #[inline]
    fn set_next_name(&mut self, _name: &str) {}

    #[inline]
    fn write_scalar(&mut self, value: Scalar<'_>) -> Result<(), SerialError> {
        self.0.write_scalar(value)
    }

    #[inline]
    fn begin_object(&mut self) -> Result<(), SerialError> {
        self.0.begin_object()
    }

    #[inline]
    fn end_object(&mut self) -> Result<(), SerialError> {
        self.0.end_object()
    }

    #[inline]
    fn begin_sequence(&mut self, len: usize) -> Result<(), SerialError> {
        self.0.begin_sequence(len)
    }

    #[inline]
    fn end_sequence(&mut self) -> Result<(), SerialError> {
        self.0.end_sequence()
    }
}

/// Reads a stream written by [`PortableBinaryOutputArchive`], in its byte order.
pub struct PortableBinaryInputArchive<R: Read>(BinaryInputArchive<R>);

impl<R: Read> PortableBinaryInputArchive<R> {
    /// Reads the byte order tag.
    pub fn new(mut reader: R) -> Result<Self, SerialError> {
        let endian = Endian::from_tag(reader.read_u8()?)?;
        Ok(Self(BinaryInputArchive::with_endian(reader, endian)))
    }

    /// The byte order announced by the stream.
    pub fn endian(&self) -> Endian {
        self.0.endian
    }
}

impl<R: Read> InputArchive for PortableBinaryInputArchive<R> {
    #[inline]
    fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>, SerialError> {
        self.0.read_scalar(kind)
    }

    #[inline]
    fn begin_object(&mut self) -> Result<(), SerialError> {
        self.0.begin_object()
    }

    #[inline]
    fn end_object(&mut self) -> Result<(), SerialError> {
        self.0.end_object()
    }

    #[inline]
    fn begin_sequence(&mut self) -> Result<usize, SerialError> {
        self.0.begin_sequence()
    }

    #[inline]
    fn end_sequence(&mut self) -> Result<(), SerialError> {
        self.0.end_sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_length_prefixed() {
        let mut bytes = Vec::new();
        {
            let mut archive = BinaryOutputArchive::with_endian(&mut bytes, Endian::Little);
            archive.set_next_name("ignored");
            archive.begin_object().unwrap();
            archive.write_scalar(Scalar::Bool(true)).unwrap();
            archive.write_scalar(Scalar::Str("hi".into())).unwrap();
            archive.end_object().unwrap();
            archive.finish().unwrap();
        }
        assert_eq!(bytes, [1, 2, 0, 0, 0, 0, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn portable_tag_selects_order() {
        let mut bytes = Vec::new();
        {
            let options = PortableBinaryOptions { endian: Endian::Big };
            let mut archive = PortableBinaryOutputArchive::with_options(&mut bytes, options).unwrap();
            archive.write_scalar(Scalar::U16(0x0102)).unwrap();
        }
        assert_eq!(bytes, [0, 0x01, 0x02]);

        let mut archive = PortableBinaryInputArchive::new(bytes.as_slice()).unwrap();
        assert_eq!(archive.endian(), Endian::Big);
        assert_eq!(archive.read_scalar(ScalarKind::U16).unwrap(), Scalar::U16(0x0102));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let bytes: &[u8] = &[7, 0, 0];
        assert!(matches!(
            PortableBinaryInputArchive::new(bytes),
            Err(SerialError::Endianness(7))
        ));
    }

    #[test]
    fn truncated_input_fails() {
        let bytes: &[u8] = &[5, 0, 0, 0, 0, 0, 0, 0, b'a', b'b'];
        let mut archive = BinaryInputArchive::with_endian(bytes, Endian::Little);
        assert!(matches!(
            archive.read_scalar(ScalarKind::Str),
            Err(SerialError::UnexpectedEnd(_))
        ));

        let mut archive = BinaryInputArchive::new(&[1_u8, 2][..]);
        assert!(matches!(archive.read_scalar(ScalarKind::U32), Err(SerialError::Io(_))));
    }

    #[test]
    fn invalid_bool_byte_fails() {
        let mut archive = BinaryInputArchive::new(&[2_u8][..]);
        assert!(matches!(
            archive.read_scalar(ScalarKind::Bool),
            Err(SerialError::Mismatch { .. })
        ));
    }
}
