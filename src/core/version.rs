//! # Protocol Version Table
//!
//! Totally-ordered enumeration of the protocol revisions this crate can
//! abstract over.
//!
//! Versions are compared by release ordinal, never by parsing the release
//! label. Any two registered versions are comparable; comparisons are pure
//! and have no error conditions. The table is created once into statics and
//! is immutable for the life of the process.
//!
//! Two ordinals matter to the composite codecs more than the rest:
//! - `766` — item stacks switch from the tag-based layout to the
//!   component-based layout.
//! - `768` — consumption fields relocate from food properties into the
//!   consumable entity.

use std::fmt;

/// A protocol revision: release ordinal plus human-readable release label.
///
/// `PartialOrd`/`Ord` delegate to the ordinal, so versions sort in release
/// order regardless of how the labels would sort lexically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion {
    ordinal: i32,
    label: &'static str,
}

impl ProtocolVersion {
    pub const fn new(ordinal: i32, label: &'static str) -> Self {
        Self { ordinal, label }
    }

    /// The raw release ordinal as negotiated on the wire.
    pub const fn ordinal(self) -> i32 {
        self.ordinal
    }

    /// The release label, e.g. `"1.21.2"`.
    pub const fn label(self) -> &'static str {
        self.label
    }

    /// True for the sentinel used before a connection's handshake has
    /// revealed the negotiated version.
    pub const fn is_unknown(self) -> bool {
        self.ordinal < 0
    }

    pub const fn is_older_than(self, other: ProtocolVersion) -> bool {
        self.ordinal < other.ordinal
    }

    pub const fn is_newer_or_equal(self, other: ProtocolVersion) -> bool {
        self.ordinal >= other.ordinal
    }

    /// Resolves a wire ordinal to a registered version, if the table knows it.
    pub fn from_ordinal(ordinal: i32) -> Option<ProtocolVersion> {
        ALL.iter().copied().find(|v| v.ordinal == ordinal)
    }
}

impl PartialOrd for ProtocolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProtocolVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal.cmp(&other.ordinal)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.ordinal)
    }
}

/// Sentinel bound to a connection before version negotiation completes.
pub const UNKNOWN: ProtocolVersion = ProtocolVersion::new(-1, "unknown");

pub const V1_18: ProtocolVersion = ProtocolVersion::new(757, "1.18");
pub const V1_18_2: ProtocolVersion = ProtocolVersion::new(758, "1.18.2");
pub const V1_19: ProtocolVersion = ProtocolVersion::new(759, "1.19");
pub const V1_19_2: ProtocolVersion = ProtocolVersion::new(760, "1.19.2");
pub const V1_19_3: ProtocolVersion = ProtocolVersion::new(761, "1.19.3");
pub const V1_19_4: ProtocolVersion = ProtocolVersion::new(762, "1.19.4");
pub const V1_20: ProtocolVersion = ProtocolVersion::new(763, "1.20");
pub const V1_20_2: ProtocolVersion = ProtocolVersion::new(764, "1.20.2");
pub const V1_20_3: ProtocolVersion = ProtocolVersion::new(765, "1.20.3");
pub const V1_20_5: ProtocolVersion = ProtocolVersion::new(766, "1.20.5");
pub const V1_21: ProtocolVersion = ProtocolVersion::new(767, "1.21");
pub const V1_21_2: ProtocolVersion = ProtocolVersion::new(768, "1.21.2");
pub const V1_21_4: ProtocolVersion = ProtocolVersion::new(769, "1.21.4");

/// Every supported revision in release order.
pub const ALL: &[ProtocolVersion] = &[
    V1_18, V1_18_2, V1_19, V1_19_2, V1_19_3, V1_19_4, V1_20, V1_20_2, V1_20_3, V1_20_5, V1_21,
    V1_21_2, V1_21_4,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order_by_ordinal() {
        assert!(V1_18.is_older_than(V1_21_2));
        assert!(V1_21_2.is_newer_or_equal(V1_21_2));
        assert!(V1_21_2.is_newer_or_equal(V1_21));
        assert!(!V1_21.is_newer_or_equal(V1_21_2));
        assert!(V1_20_5 < V1_21 && V1_21 < V1_21_2);
    }

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn ordinal_resolution() {
        assert_eq!(ProtocolVersion::from_ordinal(768), Some(V1_21_2));
        assert_eq!(ProtocolVersion::from_ordinal(1), None);
        assert!(UNKNOWN.is_unknown());
        assert!(!V1_18.is_unknown());
    }
}
