//! Particle effect codec.
//!
//! The type id moved from the head of the structure to behind the display
//! fields at 1.20.5, so this composite branches on encoding ORDER rather
//! than field presence. Type-specific payloads are carried opaquely.

use crate::core::composite::Composite;
use crate::core::cursor::PacketCursor;
use crate::core::version;
use crate::error::Result;

const MAX_PARTICLE_DATA_BYTES: usize = 1 << 16;

/// A particle effect emission: type, placement, spread, and opaque
/// type-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub type_id: i32,
    pub long_distance: bool,
    pub position: (f64, f64, f64),
    pub offset: (f32, f32, f32),
    pub max_speed: f32,
    pub count: i32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParticleLayout {
    /// Type id leads the structure.
    TypePrefixed,
    /// 1.20.5+: type id trails the display fields, next to its payload.
    TypeInline,
}

fn layout(version: version::ProtocolVersion) -> ParticleLayout {
    if version.is_newer_or_equal(version::V1_20_5) {
        ParticleLayout::TypeInline
    } else {
        ParticleLayout::TypePrefixed
    }
}

impl Particle {
    pub fn new(type_id: i32, position: (f64, f64, f64), count: i32) -> Self {
        Self {
            type_id,
            long_distance: false,
            position,
            offset: (0.0, 0.0, 0.0),
            max_speed: 0.0,
            count,
            data: Vec::new(),
        }
    }
}

impl Composite for Particle {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        let lay = layout(cursor.version());
        let mut type_id = 0;
        if lay == ParticleLayout::TypePrefixed {
            type_id = cursor.read_var_int()?;
        }
        let long_distance = cursor.read_bool()?;
        let position = (cursor.read_f64()?, cursor.read_f64()?, cursor.read_f64()?);
        let offset = (cursor.read_f32()?, cursor.read_f32()?, cursor.read_f32()?);
        let max_speed = cursor.read_f32()?;
        let count = cursor.read_i32()?;
        if lay == ParticleLayout::TypeInline {
            type_id = cursor.read_var_int()?;
        }
        let data = cursor.read_byte_array(MAX_PARTICLE_DATA_BYTES)?;
        Ok(Self {
            type_id,
            long_distance,
            position,
            offset,
            max_speed,
            count,
            data,
        })
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        let lay = layout(cursor.version());
        if lay == ParticleLayout::TypePrefixed {
            cursor.write_var_int(self.type_id);
        }
        cursor.write_bool(self.long_distance);
        cursor.write_f64(self.position.0);
        cursor.write_f64(self.position.1);
        cursor.write_f64(self.position.2);
        cursor.write_f32(self.offset.0);
        cursor.write_f32(self.offset.1);
        cursor.write_f32(self.offset.2);
        cursor.write_f32(self.max_speed);
        cursor.write_i32(self.count);
        if lay == ParticleLayout::TypeInline {
            cursor.write_var_int(self.type_id);
        }
        cursor.write_byte_array(&self.data);
        Ok(())
    }
}
