//! # Tagged Tree Structure
//!
//! Generic named-tag binary tree used for structured item and entity
//! metadata on versions that predate the component-based item layout.
//!
//! Wire format per node: a one-byte type id, then the payload. Compounds
//! are sequences of (type id, u16-length-prefixed name, payload) terminated
//! by an end marker; lists are a single element type id plus a big-endian
//! i32 count. From protocol 764 onward the root tag is written nameless;
//! before that it carries an (always empty here) root name. Both forms are
//! decided by the cursor's bound version, identically on encode and decode.
//!
//! Decoding is depth-limited so a crafted buffer cannot recurse the stack
//! away.

use crate::core::cursor::PacketCursor;
use crate::core::version;
use crate::error::{ProtocolError, Result};

/// Maximum nesting depth accepted when decoding a tag tree.
pub const MAX_TAG_DEPTH: usize = 128;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

/// One node of the tagged tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(Vec<Tag>),
    Compound(Vec<(String, Tag)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    fn type_id(&self) -> u8 {
        match self {
            Tag::Byte(_) => TAG_BYTE,
            Tag::Short(_) => TAG_SHORT,
            Tag::Int(_) => TAG_INT,
            Tag::Long(_) => TAG_LONG,
            Tag::Float(_) => TAG_FLOAT,
            Tag::Double(_) => TAG_DOUBLE,
            Tag::ByteArray(_) => TAG_BYTE_ARRAY,
            Tag::String(_) => TAG_STRING,
            Tag::List(_) => TAG_LIST,
            Tag::Compound(_) => TAG_COMPOUND,
            Tag::IntArray(_) => TAG_INT_ARRAY,
            Tag::LongArray(_) => TAG_LONG_ARRAY,
        }
    }

    /// Reads a root tag. An end marker in root position means "no tag"
    /// (the absent-metadata encoding used by item stacks).
    pub fn read_root(cursor: &mut PacketCursor) -> Result<Option<Tag>> {
        let id = cursor.read_u8()?;
        if id == TAG_END {
            return Ok(None);
        }
        if cursor.version().is_older_than(version::V1_20_2) {
            // named root; the name itself is ignored
            let _ = read_tag_string(cursor)?;
        }
        Ok(Some(Self::read_payload(cursor, id, 0)?))
    }

    /// Writes a root tag, or the end marker for `None`.
    pub fn write_root(cursor: &mut PacketCursor, tag: Option<&Tag>) -> Result<()> {
        let Some(tag) = tag else {
            cursor.write_u8(TAG_END);
            return Ok(());
        };
        cursor.write_u8(tag.type_id());
        if cursor.version().is_older_than(version::V1_20_2) {
            write_tag_string(cursor, "")?;
        }
        tag.write_payload(cursor)
    }

    fn read_payload(cursor: &mut PacketCursor, id: u8, depth: usize) -> Result<Tag> {
        if depth > MAX_TAG_DEPTH {
            return Err(ProtocolError::TagDepthExceeded(MAX_TAG_DEPTH));
        }
        match id {
            TAG_BYTE => Ok(Tag::Byte(cursor.read_i8()?)),
            TAG_SHORT => Ok(Tag::Short(cursor.read_i16()?)),
            TAG_INT => Ok(Tag::Int(cursor.read_i32()?)),
            TAG_LONG => Ok(Tag::Long(cursor.read_i64()?)),
            TAG_FLOAT => Ok(Tag::Float(cursor.read_f32()?)),
            TAG_DOUBLE => Ok(Tag::Double(cursor.read_f64()?)),
            TAG_BYTE_ARRAY => {
                let len = read_array_len(cursor)?;
                Ok(Tag::ByteArray(cursor.read_slice(len)?.to_vec()))
            }
            TAG_STRING => Ok(Tag::String(read_tag_string(cursor)?)),
            TAG_LIST => {
                let element_id = cursor.read_u8()?;
                let len = read_array_len(cursor)?;
                if element_id == TAG_END && len > 0 {
                    return Err(ProtocolError::UnknownTagType(TAG_END));
                }
                let mut out = Vec::with_capacity(len.min(cursor.remaining()));
                for _ in 0..len {
                    out.push(Self::read_payload(cursor, element_id, depth + 1)?);
                }
                Ok(Tag::List(out))
            }
            TAG_COMPOUND => {
                let mut entries = Vec::new();
                loop {
                    let entry_id = cursor.read_u8()?;
                    if entry_id == TAG_END {
                        return Ok(Tag::Compound(entries));
                    }
                    let name = read_tag_string(cursor)?;
                    entries.push((name, Self::read_payload(cursor, entry_id, depth + 1)?));
                }
            }
            TAG_INT_ARRAY => {
                let len = read_array_len(cursor)?;
                let mut out = Vec::with_capacity(len.min(cursor.remaining() / 4));
                for _ in 0..len {
                    out.push(cursor.read_i32()?);
                }
                Ok(Tag::IntArray(out))
            }
            TAG_LONG_ARRAY => {
                let len = read_array_len(cursor)?;
                let mut out = Vec::with_capacity(len.min(cursor.remaining() / 8));
                for _ in 0..len {
                    out.push(cursor.read_i64()?);
                }
                Ok(Tag::LongArray(out))
            }
            other => Err(ProtocolError::UnknownTagType(other)),
        }
    }

    fn write_payload(&self, cursor: &mut PacketCursor) -> Result<()> {
        match self {
            Tag::Byte(v) => cursor.write_i8(*v),
            Tag::Short(v) => cursor.write_i16(*v),
            Tag::Int(v) => cursor.write_i32(*v),
            Tag::Long(v) => cursor.write_i64(*v),
            Tag::Float(v) => cursor.write_f32(*v),
            Tag::Double(v) => cursor.write_f64(*v),
            Tag::ByteArray(v) => {
                cursor.write_i32(v.len() as i32);
                cursor.write_slice(v);
            }
            Tag::String(v) => write_tag_string(cursor, v)?,
            Tag::List(elements) => {
                let element_id = elements.first().map_or(TAG_END, Tag::type_id);
                if elements.iter().any(|e| e.type_id() != element_id) {
                    return Err(ProtocolError::HeterogeneousTagList);
                }
                cursor.write_u8(element_id);
                cursor.write_i32(elements.len() as i32);
                for element in elements {
                    element.write_payload(cursor)?;
                }
            }
            Tag::Compound(entries) => {
                for (name, tag) in entries {
                    cursor.write_u8(tag.type_id());
                    write_tag_string(cursor, name)?;
                    tag.write_payload(cursor)?;
                }
                cursor.write_u8(TAG_END);
            }
            Tag::IntArray(v) => {
                cursor.write_i32(v.len() as i32);
                for value in v {
                    cursor.write_i32(*value);
                }
            }
            Tag::LongArray(v) => {
                cursor.write_i32(v.len() as i32);
                for value in v {
                    cursor.write_i64(*value);
                }
            }
        }
        Ok(())
    }
}

/// u16-length-prefixed string as used inside tag trees (distinct from the
/// var-int-prefixed packet strings).
fn read_tag_string(cursor: &mut PacketCursor) -> Result<String> {
    let len = cursor.read_u16()? as usize;
    let bytes = cursor.read_slice(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
}

fn write_tag_string(cursor: &mut PacketCursor, value: &str) -> Result<()> {
    if value.len() > u16::MAX as usize {
        return Err(ProtocolError::StringTooLong {
            length: value.len(),
            max: u16::MAX as usize,
        });
    }
    cursor.write_u16(value.len() as u16);
    cursor.write_slice(value.as_bytes());
    Ok(())
}

fn read_array_len(cursor: &mut PacketCursor) -> Result<usize> {
    let len = cursor.read_i32()?;
    if len < 0 {
        return Err(ProtocolError::NegativeLength(len));
    }
    Ok(len as usize)
}
