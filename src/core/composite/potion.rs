//! Potion effect reference with its display properties.

use crate::core::composite::Composite;
use crate::core::cursor::PacketCursor;
use crate::core::version;
use crate::error::Result;

/// A status-effect instance attached to items, entities, or consumption
/// side-effect lists.
#[derive(Debug, Clone, PartialEq)]
pub struct PotionEffect {
    pub effect_id: i32,
    pub amplifier: i32,
    pub duration: i32,
    pub ambient: bool,
    pub show_particles: bool,
    /// Not on the wire before 1.19; defaults to visible there.
    pub show_icon: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PotionLayout {
    /// 1.19+: icon visibility flag follows the particle flag.
    WithIcon,
    Legacy,
}

fn layout(version: version::ProtocolVersion) -> PotionLayout {
    if version.is_newer_or_equal(version::V1_19) {
        PotionLayout::WithIcon
    } else {
        PotionLayout::Legacy
    }
}

impl PotionEffect {
    pub fn new(effect_id: i32, amplifier: i32, duration: i32) -> Self {
        Self {
            effect_id,
            amplifier,
            duration,
            ambient: false,
            show_particles: true,
            show_icon: true,
        }
    }
}

impl Composite for PotionEffect {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        let effect_id = cursor.read_var_int()?;
        let amplifier = cursor.read_var_int()?;
        let duration = cursor.read_var_int()?;
        let ambient = cursor.read_bool()?;
        let show_particles = cursor.read_bool()?;
        let show_icon = match layout(cursor.version()) {
            PotionLayout::WithIcon => cursor.read_bool()?,
            PotionLayout::Legacy => true,
        };
        Ok(Self {
            effect_id,
            amplifier,
            duration,
            ambient,
            show_particles,
            show_icon,
        })
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        cursor.write_var_int(self.effect_id);
        cursor.write_var_int(self.amplifier);
        cursor.write_var_int(self.duration);
        cursor.write_bool(self.ambient);
        cursor.write_bool(self.show_particles);
        if layout(cursor.version()) == PotionLayout::WithIcon {
            cursor.write_bool(self.show_icon);
        }
        Ok(())
    }
}
