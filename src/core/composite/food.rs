//! Food properties codec.
//!
//! The canonical example of a relocation boundary: at 1.21.2 the
//! consumption fields (eat time, conversion item, side-effect list) left
//! this entity for [`ItemConsumable`](crate::core::composite::ItemConsumable)
//! and are simply not on this wire shape at all from that version on. The
//! conversion item itself only existed from 1.21.

use crate::core::composite::{Composite, ItemStack, PotionEffect};
use crate::core::cursor::PacketCursor;
use crate::core::version;
use crate::error::Result;

/// Eat-time used when a caller doesn't care to override it.
pub const DEFAULT_EAT_SECONDS: f32 = 1.6;

/// A potion effect applied with some probability when the item is consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct PossibleEffect {
    pub effect: PotionEffect,
    pub probability: f32,
}

impl Composite for PossibleEffect {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        let effect = PotionEffect::read(cursor)?;
        let probability = cursor.read_f32()?;
        Ok(Self {
            effect,
            probability,
        })
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        self.effect.write(cursor)?;
        cursor.write_f32(self.probability);
        Ok(())
    }
}

/// Nutrition data attached to edible items.
///
/// Equality spans every logical field, including the ones a post-relocation
/// version never serializes.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodProperties {
    pub nutrition: i32,
    pub saturation: f32,
    pub can_always_eat: bool,
    /// Relocated to the consumable entity at 1.21.2.
    pub eat_seconds: f32,
    /// Relocated to the consumable entity at 1.21.2.
    pub effects: Vec<PossibleEffect>,
    /// Only ever on the wire in [1.21, 1.21.2).
    pub using_converts_to: Option<ItemStack>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FoodLayout {
    /// 1.21.2+: consumption fields live elsewhere.
    Split,
    /// [1.21, 1.21.2): legacy fields plus the optional conversion item.
    LegacyConversion,
    /// Before 1.21.
    Legacy,
}

fn layout(version: version::ProtocolVersion) -> FoodLayout {
    if version.is_newer_or_equal(version::V1_21_2) {
        FoodLayout::Split
    } else if version.is_newer_or_equal(version::V1_21) {
        FoodLayout::LegacyConversion
    } else {
        FoodLayout::Legacy
    }
}

impl FoodProperties {
    pub fn new(nutrition: i32, saturation: f32, can_always_eat: bool) -> Self {
        Self {
            nutrition,
            saturation,
            can_always_eat,
            eat_seconds: DEFAULT_EAT_SECONDS,
            effects: Vec::new(),
            using_converts_to: None,
        }
    }
}

impl Composite for FoodProperties {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        let nutrition = cursor.read_var_int()?;
        let saturation = cursor.read_f32()?;
        let can_always_eat = cursor.read_bool()?;

        let mut props = Self::new(nutrition, saturation, can_always_eat);
        match layout(cursor.version()) {
            FoodLayout::Split => {}
            FoodLayout::LegacyConversion => {
                props.eat_seconds = cursor.read_f32()?;
                props.using_converts_to = cursor.read_optional(ItemStack::read)?;
                props.effects = cursor.read_list(PossibleEffect::read)?;
            }
            FoodLayout::Legacy => {
                props.eat_seconds = cursor.read_f32()?;
                props.effects = cursor.read_list(PossibleEffect::read)?;
            }
        }
        Ok(props)
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        cursor.write_var_int(self.nutrition);
        cursor.write_f32(self.saturation);
        cursor.write_bool(self.can_always_eat);

        match layout(cursor.version()) {
            FoodLayout::Split => {}
            FoodLayout::LegacyConversion => {
                cursor.write_f32(self.eat_seconds);
                cursor.write_optional(self.using_converts_to.as_ref(), |c, item| item.write(c))?;
                cursor.write_list(&self.effects, |c, e| e.write(c))?;
            }
            FoodLayout::Legacy => {
                cursor.write_f32(self.eat_seconds);
                cursor.write_list(&self.effects, |c, e| e.write(c))?;
            }
        }
        Ok(())
    }
}
