//! Game profile codec.
//!
//! Stable across the whole version table; one of the composites whose
//! layout never branched. Field-level string ceilings follow the upstream
//! limits (16-byte names, signed property values).

use crate::core::composite::Composite;
use crate::core::cursor::PacketCursor;
use crate::error::Result;

const MAX_NAME_BYTES: usize = 16;
const MAX_PROPERTY_NAME_BYTES: usize = 64;
const MAX_PROPERTY_VALUE_BYTES: usize = 32_767;
const MAX_SIGNATURE_BYTES: usize = 1024;

/// A signed profile property, e.g. a texture reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureProperty {
    pub name: String,
    pub value: String,
    pub signature: Option<String>,
}

impl Composite for TextureProperty {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        let name = cursor.read_string(MAX_PROPERTY_NAME_BYTES)?;
        let value = cursor.read_string(MAX_PROPERTY_VALUE_BYTES)?;
        let signature = cursor.read_optional(|c| c.read_string(MAX_SIGNATURE_BYTES))?;
        Ok(Self {
            name,
            value,
            signature,
        })
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        cursor.write_string(&self.name);
        cursor.write_string(&self.value);
        cursor.write_optional(self.signature.as_ref(), |c, s| {
            c.write_string(s);
            Ok(())
        })
    }
}

/// Identity of a player: id, name, and signed properties.
#[derive(Debug, Clone, PartialEq)]
pub struct GameProfile {
    pub id: u128,
    pub name: String,
    pub properties: Vec<TextureProperty>,
}

impl GameProfile {
    pub fn new(id: u128, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            properties: Vec::new(),
        }
    }
}

impl Composite for GameProfile {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        let id = cursor.read_uuid()?;
        let name = cursor.read_string(MAX_NAME_BYTES)?;
        let properties = cursor.read_list(TextureProperty::read)?;
        Ok(Self {
            id,
            name,
            properties,
        })
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        cursor.write_uuid(self.id);
        cursor.write_string(&self.name);
        cursor.write_list(&self.properties, |c, p| p.write(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version;

    #[test]
    fn roundtrip_with_signed_texture() {
        let profile = GameProfile {
            id: 0xdead_beef_0000_0000_0000_0000_cafe_f00d,
            name: "Herobrine".into(),
            properties: vec![TextureProperty {
                name: "textures".into(),
                value: "eyJ0aW1lc3RhbXAiOjB9".into(),
                signature: Some("c2lnbmF0dXJl".into()),
            }],
        };
        let mut c = PacketCursor::new(version::V1_20_2);
        profile.write(&mut c).unwrap();
        c.rewind();
        assert_eq!(GameProfile::read(&mut c).unwrap(), profile);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn name_ceiling_enforced() {
        let profile = GameProfile::new(1, "this_name_is_way_past_sixteen_bytes");
        let mut c = PacketCursor::new(version::V1_20_2);
        profile.write(&mut c).unwrap();
        c.rewind();
        assert!(GameProfile::read(&mut c).is_err());
    }
}
