//! Consumable entity codec.
//!
//! Introduced at 1.21.2 as the new home for the consumption fields that
//! previously lived in [`FoodProperties`](crate::core::composite::FoodProperties).
//! Hosts only encounter it on versions at or past that boundary; the layout
//! itself has been stable since introduction.

use crate::core::composite::{Composite, FoodProperties, PossibleEffect, DEFAULT_EAT_SECONDS};
use crate::core::cursor::PacketCursor;
use crate::error::Result;

/// Eating animation, as a wire ordinal.
pub const ANIMATION_NONE: i32 = 0;
pub const ANIMATION_EAT: i32 = 1;
pub const ANIMATION_DRINK: i32 = 2;

/// How an item is consumed: duration, presentation, and side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemConsumable {
    pub consume_seconds: f32,
    pub animation: i32,
    pub sound_id: i32,
    pub has_particles: bool,
    pub effects: Vec<PossibleEffect>,
}

impl Default for ItemConsumable {
    fn default() -> Self {
        Self {
            consume_seconds: DEFAULT_EAT_SECONDS,
            animation: ANIMATION_EAT,
            sound_id: 0,
            has_particles: true,
            effects: Vec::new(),
        }
    }
}

impl ItemConsumable {
    /// Carries the relocated consumption fields over from a pre-1.21.2
    /// food-properties value.
    pub fn from_legacy_food(food: &FoodProperties) -> Self {
        Self {
            consume_seconds: food.eat_seconds,
            effects: food.effects.clone(),
            ..Self::default()
        }
    }
}

impl Composite for ItemConsumable {
    fn read(cursor: &mut PacketCursor) -> Result<Self> {
        let consume_seconds = cursor.read_f32()?;
        let animation = cursor.read_var_int()?;
        let sound_id = cursor.read_var_int()?;
        let has_particles = cursor.read_bool()?;
        let effects = cursor.read_list(PossibleEffect::read)?;
        Ok(Self {
            consume_seconds,
            animation,
            sound_id,
            has_particles,
            effects,
        })
    }

    fn write(&self, cursor: &mut PacketCursor) -> Result<()> {
        cursor.write_f32(self.consume_seconds);
        cursor.write_var_int(self.animation);
        cursor.write_var_int(self.sound_id);
        cursor.write_bool(self.has_particles);
        cursor.write_list(&self.effects, |c, e| e.write(c))
    }
}
