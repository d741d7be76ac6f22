//! # Composite Type Registry
//!
//! Per-semantic-entity codecs whose wire layout branches on version ranges.
//!
//! Every composite follows the same discipline: the set of fields present on
//! the wire, and their order, is a pure function of the cursor's bound
//! version, expressed as a small `layout(version)` table that encode and
//! decode both consult. The two sides can therefore never drift apart
//! byte-wise for the same version.
//!
//! Equality covers every logical field regardless of whether the currently
//! bound version serializes it, so value comparisons are version-independent
//! even though wire shape is not.

mod consumable;
mod food;
mod item;
mod particle;
mod potion;
mod profile;

pub use consumable::{ItemConsumable, ANIMATION_DRINK, ANIMATION_EAT, ANIMATION_NONE};
pub use food::{FoodProperties, PossibleEffect, DEFAULT_EAT_SECONDS};
pub use item::{ItemComponent, ItemComponentPatch, ItemStack};
pub use particle::Particle;
pub use potion::PotionEffect;
pub use profile::{GameProfile, TextureProperty};

use crate::core::cursor::PacketCursor;
use crate::error::Result;

/// A structured value serialized via a version-dependent field layout.
///
/// `read` and `write` are a pure function pair parameterized by the
/// cursor's bound version; composing them for the same version is the
/// identity on the value.
pub trait Composite: Sized {
    fn read(cursor: &mut PacketCursor) -> Result<Self>;

    fn write(&self, cursor: &mut PacketCursor) -> Result<()>;
}
