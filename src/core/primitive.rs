//! # Primitive Codec Library
//!
//! Wire-format primitives read and written through [`PacketCursor`]:
//! variable-length integers, fixed-width numerics, length-prefixed strings
//! and byte arrays, optional values, and homogeneous lists.
//!
//! Var-ints use a continuation-bit encoding: 7 data bits plus 1 continuation
//! bit per byte, least-significant group first. A 32-bit value terminates
//! within 5 bytes and a 64-bit value within 10; anything longer is a
//! malformed-input error, not a silent truncation.
//!
//! List counts are deliberately NOT validated against the remaining buffer
//! up front: per-element decodes fail naturally past the buffer end, which
//! avoids double-scanning every list on the hot path.

use crate::core::cursor::PacketCursor;
use crate::error::{ProtocolError, Result};

/// Maximum encoded size of a 32-bit var-int.
pub const MAX_VAR_INT_BYTES: usize = 5;

/// Maximum encoded size of a 64-bit var-long.
pub const MAX_VAR_LONG_BYTES: usize = 10;

impl PacketCursor {
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_slice(&value.to_be_bytes());
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_slice(&value.to_be_bytes());
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_slice(&value.to_be_bytes());
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_slice(&value.to_be_bytes());
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_slice(&value.to_be_bytes());
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_slice(&value.to_be_bytes());
    }

    /// 128-bit identifier, most significant half first.
    pub fn read_uuid(&mut self) -> Result<u128> {
        Ok(u128::from_be_bytes(self.read_array()?))
    }

    pub fn write_uuid(&mut self, value: u128) {
        self.write_slice(&value.to_be_bytes());
    }

    pub fn read_var_int(&mut self) -> Result<i32> {
        let mut value: i32 = 0;
        for i in 0..MAX_VAR_INT_BYTES {
            let byte = self.read_u8()?;
            value |= i32::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ProtocolError::MalformedVarInt {
            max_bytes: MAX_VAR_INT_BYTES,
        })
    }

    pub fn write_var_int(&mut self, value: i32) {
        let mut remaining = value as u32;
        loop {
            let byte = (remaining & 0x7f) as u8;
            remaining >>= 7;
            if remaining == 0 {
                self.write_u8(byte);
                return;
            }
            self.write_u8(byte | 0x80);
        }
    }

    pub fn read_var_long(&mut self) -> Result<i64> {
        let mut value: i64 = 0;
        for i in 0..MAX_VAR_LONG_BYTES {
            let byte = self.read_u8()?;
            value |= i64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(ProtocolError::MalformedVarInt {
            max_bytes: MAX_VAR_LONG_BYTES,
        })
    }

    pub fn write_var_long(&mut self, value: i64) {
        let mut remaining = value as u64;
        loop {
            let byte = (remaining & 0x7f) as u8;
            remaining >>= 7;
            if remaining == 0 {
                self.write_u8(byte);
                return;
            }
            self.write_u8(byte | 0x80);
        }
    }

    /// UTF-8 string with a var-int byte-count prefix. `max_bytes` bounds
    /// memory use against malicious length claims; every call site picks a
    /// ceiling appropriate to the field.
    pub fn read_string(&mut self, max_bytes: usize) -> Result<String> {
        let length = self.read_var_int()?;
        if length < 0 {
            return Err(ProtocolError::NegativeLength(length));
        }
        let length = length as usize;
        if length > max_bytes {
            return Err(ProtocolError::StringTooLong {
                length,
                max: max_bytes,
            });
        }
        let bytes = self.read_slice(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_var_int(value.len() as i32);
        self.write_slice(value.as_bytes());
    }

    /// Byte array with a var-int length prefix.
    pub fn read_byte_array(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let length = self.read_var_int()?;
        if length < 0 {
            return Err(ProtocolError::NegativeLength(length));
        }
        let length = length as usize;
        if length > max_bytes {
            return Err(ProtocolError::StringTooLong {
                length,
                max: max_bytes,
            });
        }
        Ok(self.read_slice(length)?.to_vec())
    }

    pub fn write_byte_array(&mut self, value: &[u8]) {
        self.write_var_int(value.len() as i32);
        self.write_slice(value);
    }

    /// Boolean presence flag followed by the payload iff present.
    pub fn read_optional<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.read_bool()? {
            Ok(Some(read(self)?))
        } else {
            Ok(None)
        }
    }

    pub fn write_optional<T>(
        &mut self,
        value: Option<&T>,
        write: impl FnOnce(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        match value {
            Some(inner) => {
                self.write_bool(true);
                write(self, inner)
            }
            None => {
                self.write_bool(false);
                Ok(())
            }
        }
    }

    /// Var-int count followed by that many elements. The count is trusted
    /// until a per-element read runs out of buffer (fail-fast); only the
    /// initial allocation is clamped to the bytes actually remaining.
    pub fn read_list<T>(&mut self, read: impl Fn(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_var_int()?;
        if count < 0 {
            return Err(ProtocolError::NegativeLength(count));
        }
        let count = count as usize;
        let mut out = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            out.push(read(self)?);
        }
        Ok(out)
    }

    pub fn write_list<T>(
        &mut self,
        values: &[T],
        write: impl Fn(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        self.write_var_int(values.len() as i32);
        for value in values {
            write(self, value)?;
        }
        Ok(())
    }
}

/// Encoded size of a var-int without writing it anywhere.
pub fn var_int_len(value: i32) -> usize {
    let mut remaining = value as u32;
    let mut len = 1;
    while remaining >= 0x80 {
        remaining >>= 7;
        len += 1;
    }
    len
}
