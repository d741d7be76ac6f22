//! Item stack codec.
//!
//! The wire shape changed fundamentally at 1.20.5: the tag-based layout
//! (presence flag, type, count, optional metadata tree) was replaced by a
//! component patch (count-first, then added/removed component lists).
//! Component payloads are carried opaquely with a length prefix; fully
//! decoding every component type is a per-packet concern this crate does
//! not own.

use crate::core::composite::Composite;
use crate::core::cursor::PacketCursor;
use crate::core::tag::Tag;
use crate::core::version;
use crate::error::{ProtocolError, Result};

const MAX_COMPONENT_BYTES: usize = 1 << 20;

/// One opaque component entry in a component patch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemComponent {
    pub component_id: i32,
    pub data: Vec<u8>,
}

/// Components added to and removed from an item's defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemComponentPatch {
    pub added: Vec<ItemComponent>,
    pub removed: Vec<i32>,
}

impl ItemComponentPatch {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// An item stack. All logical fields participate in equality whether or not
/// the bound version serializes them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemStack {
    pub type_id: i32,
    pub count: i32,
    /// Metadata tree, tag-based layout only.
    pub tag: Option<Tag>,
    /// Component patch, component layout only.
    pub components: ItemComponentPatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemLayout {
    /// 1.20.5+: count-first component patch.
    Components,
    /// Presence flag, type, count, metadata tree.
    Tagged,
}

fn layout(version: version::ProtocolVersion) -> ItemLayout {
    if version.is_newer_or_equal(version::V1_20_5) {
        ItemLayout::Components
    } else {
        ItemLayout::Tagged
    }
}

impl ItemStack {
    pub const EMPTY: ItemStack = ItemStack {
        type_id: 0,
        count: 0,
        tag: None,
        components: ItemComponentPatch {
            added: Vec::new(),
            removed: Vec::new(),
        },
    };

    pub fn new(type_id: i32, count: i32) -> Self {
        Self {
            type_id,
            count,
            ..Self::EMPTY
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count <= 0
    }
}

impl Composite for ItemStack {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        match layout(cursor.version()) {
            ItemLayout::Tagged => {
                if !cursor.read_bool()? {
                    return Ok(Self::EMPTY);
                }
                let type_id = cursor.read_var_int()?;
                let count = i32::from(cursor.read_i8()?);
                let tag = Tag::read_root(cursor)?;
                Ok(Self {
                    type_id,
                    count,
                    tag,
                    components: ItemComponentPatch::default(),
                })
            }
            ItemLayout::Components => {
                let count = cursor.read_var_int()?;
                if count <= 0 {
                    return Ok(Self::EMPTY);
                }
                let type_id = cursor.read_var_int()?;
                let added_count = cursor.read_var_int()?;
                let removed_count = cursor.read_var_int()?;
                if added_count < 0 {
                    return Err(ProtocolError::NegativeLength(added_count));
                }
                if removed_count < 0 {
                    return Err(ProtocolError::NegativeLength(removed_count));
                }
                let mut added = Vec::with_capacity((added_count as usize).min(64));
                for _ in 0..added_count {
                    let component_id = cursor.read_var_int()?;
                    let data = cursor.read_byte_array(MAX_COMPONENT_BYTES)?;
                    added.push(ItemComponent { component_id, data });
                }
                let mut removed = Vec::with_capacity((removed_count as usize).min(64));
                for _ in 0..removed_count {
                    removed.push(cursor.read_var_int()?);
                }
                Ok(Self {
                    type_id,
                    count,
                    tag: None,
                    components: ItemComponentPatch { added, removed },
                })
            }
        }
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        match layout(cursor.version()) {
            ItemLayout::Tagged => {
                if self.is_empty() {
                    cursor.write_bool(false);
                    return Ok(());
                }
                cursor.write_bool(true);
                cursor.write_var_int(self.type_id);
                cursor.write_i8(self.count as i8);
                Tag::write_root(cursor, self.tag.as_ref())
            }
            ItemLayout::Components => {
                if self.is_empty() {
                    cursor.write_var_int(0);
                    return Ok(());
                }
                cursor.write_var_int(self.count);
                cursor.write_var_int(self.type_id);
                cursor.write_var_int(self.components.added.len() as i32);
                cursor.write_var_int(self.components.removed.len() as i32);
                for component in &self.components.added {
                    cursor.write_var_int(component.component_id);
                    cursor.write_byte_array(&component.data);
                }
                for component_id in &self.components.removed {
                    cursor.write_var_int(*component_id);
                }
                Ok(())
            }
        }
    }
}
