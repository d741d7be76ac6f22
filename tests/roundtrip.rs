//! Property-based round-trip tests using proptest
//!
//! For every registered version v and composite type T, decoding an
//! encoding must reproduce the value — projected onto the fields that v
//! actually carries on the wire. Presence boundaries are crossed
//! deliberately: the generators run the whole version table, so every
//! layout branch gets exercised.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use packet_intercept::composite::{
    Composite, FoodProperties, GameProfile, ItemStack, PossibleEffect, PotionEffect,
    TextureProperty, DEFAULT_EAT_SECONDS,
};
use packet_intercept::version::{self, ProtocolVersion};
use packet_intercept::PacketCursor;
use proptest::prelude::*;

fn any_version() -> impl Strategy<Value = ProtocolVersion> {
    (0..version::ALL.len()).prop_map(|i| version::ALL[i])
}

fn any_effect() -> impl Strategy<Value = PossibleEffect> {
    (0..64i32, 0..4i32, 0..3600i32, any::<bool>(), 0.0f32..=1.0).prop_map(
        |(id, amplifier, duration, ambient, probability)| PossibleEffect {
            effect: PotionEffect {
                effect_id: id,
                amplifier,
                duration,
                ambient,
                show_particles: true,
                show_icon: true,
            },
            probability,
        },
    )
}

fn roundtrip<T: Composite>(v: ProtocolVersion, value: &T) -> T {
    let mut cursor = PacketCursor::new(v);
    value.write(&mut cursor).expect("encode");
    cursor.rewind();
    let decoded = T::read(&mut cursor).expect("decode");
    assert_eq!(cursor.remaining(), 0, "trailing bytes at {v}");
    decoded
}

/// What a food-properties value looks like after passing through version
/// `v`'s wire shape: relocated fields revert to defaults past the
/// boundary, the conversion item exists only inside its window.
fn food_projected(v: ProtocolVersion, mut props: FoodProperties) -> FoodProperties {
    if v.is_newer_or_equal(version::V1_21_2) {
        props.eat_seconds = DEFAULT_EAT_SECONDS;
        props.effects = Vec::new();
        props.using_converts_to = None;
    } else if v.is_older_than(version::V1_21) {
        props.using_converts_to = None;
    }
    props
}

proptest! {
    #[test]
    fn prop_food_roundtrip(
        v in any_version(),
        nutrition in 0..100i32,
        saturation in 0.0f32..=20.0,
        can_always_eat in any::<bool>(),
        eat_seconds in 0.1f32..=10.0,
        effects in prop::collection::vec(any_effect(), 0..4),
        converts in any::<bool>(),
    ) {
        let props = FoodProperties {
            nutrition,
            saturation,
            can_always_eat,
            eat_seconds,
            effects,
            using_converts_to: converts.then(|| ItemStack::new(733, 1)),
        };

        let decoded = roundtrip(v, &props);
        prop_assert_eq!(decoded, food_projected(v, props));
    }
}

proptest! {
    #[test]
    fn prop_potion_roundtrip(
        v in any_version(),
        id in 0..256i32,
        amplifier in -1..8i32,
        duration in 0..100_000i32,
        ambient in any::<bool>(),
        show_particles in any::<bool>(),
        show_icon in any::<bool>(),
    ) {
        let effect = PotionEffect {
            effect_id: id,
            amplifier,
            duration,
            ambient,
            show_particles,
            show_icon,
        };
        let mut expected = effect.clone();
        if v.is_older_than(version::V1_19) {
            // the icon flag is not on this wire; decoders default it on
            expected.show_icon = true;
        }
        prop_assert_eq!(roundtrip(v, &effect), expected);
    }
}

proptest! {
    #[test]
    fn prop_profile_roundtrip(
        v in any_version(),
        id in any::<u128>(),
        name in "[a-zA-Z0-9_]{1,16}",
        values in prop::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9+/=]{0,64}", any::<bool>()), 0..3),
    ) {
        let profile = GameProfile {
            id,
            name,
            properties: values
                .into_iter()
                .map(|(name, value, signed)| TextureProperty {
                    name,
                    value: value.clone(),
                    signature: signed.then_some(value),
                })
                .collect(),
        };
        // no presence boundary anywhere in this composite
        prop_assert_eq!(roundtrip(v, &profile), profile);
    }
}

proptest! {
    #[test]
    fn prop_var_int_roundtrip(value in any::<i32>()) {
        let mut cursor = PacketCursor::new(version::V1_20);
        cursor.write_var_int(value);
        prop_assert!(cursor.len() <= 5);
        cursor.rewind();
        prop_assert_eq!(cursor.read_var_int().unwrap(), value);
    }
}

proptest! {
    #[test]
    fn prop_string_roundtrip(value in "\\PC{0,128}") {
        let mut cursor = PacketCursor::new(version::V1_20);
        cursor.write_string(&value);
        cursor.rewind();
        prop_assert_eq!(cursor.read_string(4 * 128).unwrap(), value);
    }
}

proptest! {
    #[test]
    fn prop_encoding_is_deterministic(
        v in any_version(),
        nutrition in 0..100i32,
        effects in prop::collection::vec(any_effect(), 0..3),
    ) {
        let mut props = FoodProperties::new(nutrition, 0.5, false);
        props.effects = effects;

        let mut first = PacketCursor::new(v);
        let mut second = PacketCursor::new(v);
        props.write(&mut first).unwrap();
        props.write(&mut second).unwrap();
        prop_assert_eq!(first.as_slice(), second.as_slice());
    }
}

/// Pinned byte lengths across the presence boundaries: a relocated field
/// is absent from the stream at the boundary version and present
/// immediately before it — verified by exact byte length, not just
/// structural equality.
#[test]
fn boundary_byte_lengths_step_where_layouts_change() {
    let mut props = FoodProperties::new(4, 0.3, false);
    props.eat_seconds = 1.6;

    let mut lengths = Vec::new();
    for &v in version::ALL {
        let mut cursor = PacketCursor::new(v);
        props.write(&mut cursor).unwrap();
        lengths.push((v, cursor.len()));
    }

    for &(v, len) in &lengths {
        let expected = if v.is_newer_or_equal(version::V1_21_2) {
            6 // var-int nutrition + f32 + bool
        } else if v.is_newer_or_equal(version::V1_21) {
            12 // + f32 eat_seconds + conversion flag + empty effects count
        } else {
            11 // + f32 eat_seconds + empty effects count
        };
        assert_eq!(len, expected, "at {v}");
    }
}
