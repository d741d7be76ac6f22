//! # Packet Type Registry
//!
//! Bidirectional mapping between version-dependent numeric opcodes and
//! version-independent semantic packet identifiers, partitioned by
//! connection phase and direction.
//!
//! Opcode assignment is not stable across protocol history: packets are
//! inserted, removed, and renumbered upstream. The registry is therefore
//! built from declarative *timelines* — per semantic type, a list of
//! half-open version ranges each carrying the opcode valid in that range —
//! and materialized at build time into per-(phase, direction, version)
//! hash maps so every per-frame lookup is O(1) amortized.
//!
//! Two different types claiming the same opcode for the same
//! (phase, direction, version) cell is a build-time
//! [`RegistryConflict`](crate::error::ProtocolError::RegistryConflict),
//! never a runtime guess. The same type may claim several opcodes in one
//! cell (upstream merged packet types); the reverse map then carries both,
//! and the forward map answers with the first-declared, primary opcode.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::version::ProtocolVersion;
use crate::error::{ProtocolError, Result};
use crate::protocol::packet_type::{types, PacketTypeId};
use crate::protocol::phase::{ConnectionPhase, Direction};

/// Half-open range of protocol versions: `[from, until)`.
#[derive(Debug, Clone, Copy)]
pub struct VersionRange {
    pub from: ProtocolVersion,
    pub until: Option<ProtocolVersion>,
}

impl VersionRange {
    /// All versions at or after `from`.
    pub const fn since(from: ProtocolVersion) -> Self {
        Self { from, until: None }
    }

    /// Versions in `[from, until)`.
    pub const fn between(from: ProtocolVersion, until: ProtocolVersion) -> Self {
        Self {
            from,
            until: Some(until),
        }
    }

    pub fn contains(&self, v: ProtocolVersion) -> bool {
        v.is_newer_or_equal(self.from) && self.until.is_none_or(|until| v.is_older_than(until))
    }
}

/// The opcode history of one semantic type.
#[derive(Debug, Clone)]
pub struct OpcodeTimeline {
    pub ty: &'static PacketTypeId,
    pub entries: Vec<(VersionRange, i32)>,
}

type Cell = (ConnectionPhase, Direction, i32);

/// Immutable-after-build opcode registry, shared across all connections
/// without locking.
#[derive(Debug)]
pub struct PacketRegistry {
    by_opcode: HashMap<Cell, HashMap<i32, &'static PacketTypeId>>,
    by_type: HashMap<(Cell, &'static str), i32>,
}

/// Declarative registry builder; see [`PacketRegistry::builder`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    timelines: Vec<OpcodeTimeline>,
}

impl RegistryBuilder {
    pub fn timeline(
        mut self,
        ty: &'static PacketTypeId,
        entries: &[(VersionRange, i32)],
    ) -> Self {
        self.timelines.push(OpcodeTimeline {
            ty,
            entries: entries.to_vec(),
        });
        self
    }

    /// Materializes per-version lookup tables over `versions`, verifying
    /// that no two types claim the same opcode in any cell.
    pub fn build(self, versions: &[ProtocolVersion]) -> Result<PacketRegistry> {
        let mut by_opcode: HashMap<Cell, HashMap<i32, &'static PacketTypeId>> = HashMap::new();
        let mut by_type: HashMap<(Cell, &'static str), i32> = HashMap::new();

        for timeline in &self.timelines {
            let ty = timeline.ty;
            for &v in versions {
                for (range, opcode) in &timeline.entries {
                    if !range.contains(v) {
                        continue;
                    }
                    let cell: Cell = (ty.phase, ty.direction, v.ordinal());
                    if let Some(existing) =
                        by_opcode.entry(cell).or_default().insert(*opcode, ty)
                    {
                        if existing.name != ty.name {
                            return Err(ProtocolError::RegistryConflict {
                                opcode: *opcode,
                                first: existing.name,
                                second: ty.name,
                                version: v.label(),
                            });
                        }
                    }
                    // first-declared entry is the primary opcode
                    by_type.entry((cell, ty.name)).or_insert(*opcode);
                }
            }
        }

        Ok(PacketRegistry { by_opcode, by_type })
    }
}

impl PacketRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Resolves a wire opcode to its semantic type, if one is registered
    /// for this cell.
    pub fn type_for(
        &self,
        phase: ConnectionPhase,
        direction: Direction,
        version: ProtocolVersion,
        opcode: i32,
    ) -> Option<&'static PacketTypeId> {
        self.by_opcode
            .get(&(phase, direction, version.ordinal()))
            .and_then(|cell| cell.get(&opcode))
            .copied()
    }

    /// Like [`type_for`](Self::type_for), but absence is an error:
    /// `VersionNotBound` for the pre-handshake sentinel, `UnknownOpcode`
    /// for an opcode with no registered type at this cell.
    pub fn resolve(
        &self,
        phase: ConnectionPhase,
        direction: Direction,
        version: ProtocolVersion,
        opcode: i32,
    ) -> Result<&'static PacketTypeId> {
        if version.is_unknown() {
            return Err(ProtocolError::VersionNotBound);
        }
        self.type_for(phase, direction, version, opcode)
            .ok_or(ProtocolError::UnknownOpcode { opcode })
    }

    /// Resolves a semantic type to its (primary) opcode at `version`.
    /// Absence is a condition, never a substitute value.
    pub fn opcode_for(&self, ty: &PacketTypeId, version: ProtocolVersion) -> Result<i32> {
        if version.is_unknown() {
            return Err(ProtocolError::VersionNotBound);
        }
        self.by_type
            .get(&((ty.phase, ty.direction, version.ordinal()), ty.name))
            .copied()
            .ok_or(ProtocolError::OpcodeNotPresent {
                packet: ty.name,
                version: version.label(),
            })
    }

    /// The registry for the builtin packet-type timelines, covering the
    /// whole version table, wrapped for cross-connection sharing.
    pub fn standard() -> Result<Arc<PacketRegistry>> {
        use crate::core::version::*;

        let registry = Self::builder()
            // handshake: the one packet whose shape never moves
            .timeline(
                &types::handshake::client::INTENTION,
                &[(VersionRange::since(V1_18), 0x00)],
            )
            // status
            .timeline(
                &types::status::client::STATUS_REQUEST,
                &[(VersionRange::since(V1_18), 0x00)],
            )
            .timeline(
                &types::status::client::PING_REQUEST,
                &[(VersionRange::since(V1_18), 0x01)],
            )
            .timeline(
                &types::status::server::STATUS_RESPONSE,
                &[(VersionRange::since(V1_18), 0x00)],
            )
            .timeline(
                &types::status::server::PONG_RESPONSE,
                &[(VersionRange::since(V1_18), 0x01)],
            )
            // login
            .timeline(
                &types::login::client::HELLO,
                &[(VersionRange::since(V1_18), 0x00)],
            )
            .timeline(
                &types::login::client::ENCRYPTION_RESPONSE,
                &[(VersionRange::since(V1_18), 0x01)],
            )
            .timeline(
                &types::login::client::LOGIN_ACKNOWLEDGED,
                &[(VersionRange::since(V1_20_2), 0x03)],
            )
            .timeline(
                &types::login::server::LOGIN_DISCONNECT,
                &[(VersionRange::since(V1_18), 0x00)],
            )
            .timeline(
                &types::login::server::ENCRYPTION_REQUEST,
                &[(VersionRange::since(V1_18), 0x01)],
            )
            .timeline(
                &types::login::server::LOGIN_FINISHED,
                &[(VersionRange::since(V1_18), 0x02)],
            )
            .timeline(
                &types::login::server::SET_COMPRESSION,
                &[(VersionRange::since(V1_18), 0x03)],
            )
            // configuration: phase itself only exists from 764
            .timeline(
                &types::configuration::client::CLIENT_INFORMATION,
                &[(VersionRange::since(V1_20_2), 0x00)],
            )
            .timeline(
                &types::configuration::client::FINISH_CONFIGURATION,
                &[
                    (VersionRange::between(V1_20_2, V1_20_5), 0x02),
                    (VersionRange::since(V1_20_5), 0x03),
                ],
            )
            .timeline(
                &types::configuration::client::KEEP_ALIVE,
                &[
                    (VersionRange::between(V1_20_2, V1_20_5), 0x03),
                    (VersionRange::since(V1_20_5), 0x04),
                ],
            )
            .timeline(
                &types::configuration::server::DISCONNECT,
                &[
                    (VersionRange::between(V1_20_2, V1_20_5), 0x01),
                    (VersionRange::since(V1_20_5), 0x02),
                ],
            )
            .timeline(
                &types::configuration::server::FINISH_CONFIGURATION,
                &[
                    (VersionRange::between(V1_20_2, V1_20_5), 0x02),
                    (VersionRange::since(V1_20_5), 0x03),
                ],
            )
            .timeline(
                &types::configuration::server::KEEP_ALIVE,
                &[
                    (VersionRange::between(V1_20_2, V1_20_5), 0x03),
                    (VersionRange::since(V1_20_5), 0x04),
                ],
            )
            // play, serverbound
            .timeline(
                &types::play::client::CHAT_MESSAGE,
                &[
                    (VersionRange::between(V1_18, V1_19), 0x03),
                    (VersionRange::between(V1_19, V1_19_3), 0x04),
                    (VersionRange::since(V1_19_3), 0x05),
                ],
            )
            .timeline(
                &types::play::client::KEEP_ALIVE,
                &[
                    (VersionRange::between(V1_18, V1_19), 0x0f),
                    (VersionRange::between(V1_19, V1_19_2), 0x11),
                    (VersionRange::between(V1_19_2, V1_19_3), 0x12),
                    (VersionRange::between(V1_19_3, V1_19_4), 0x11),
                    (VersionRange::between(V1_19_4, V1_20_2), 0x12),
                    (VersionRange::between(V1_20_2, V1_20_3), 0x14),
                    (VersionRange::between(V1_20_3, V1_20_5), 0x15),
                    (VersionRange::since(V1_20_5), 0x18),
                ],
            )
            .timeline(
                &types::play::client::PLAYER_POSITION,
                &[
                    (VersionRange::between(V1_18, V1_19), 0x11),
                    (VersionRange::between(V1_19, V1_19_3), 0x13),
                    (VersionRange::between(V1_19_3, V1_20_2), 0x14),
                    (VersionRange::between(V1_20_2, V1_20_5), 0x16),
                    (VersionRange::since(V1_20_5), 0x1a),
                ],
            )
            // merged semantic id: both historical opcodes resolve to it
            .timeline(
                &types::play::client::PLAYER_FLYING,
                &[
                    (VersionRange::since(V1_18), 0x2b),
                    (VersionRange::since(V1_18), 0x2c),
                ],
            )
            // play, clientbound
            .timeline(
                &types::play::server::KEEP_ALIVE,
                &[
                    (VersionRange::between(V1_18, V1_19), 0x21),
                    (VersionRange::between(V1_19, V1_19_2), 0x1e),
                    (VersionRange::between(V1_19_2, V1_19_3), 0x20),
                    (VersionRange::between(V1_19_3, V1_19_4), 0x1f),
                    (VersionRange::between(V1_19_4, V1_20_2), 0x23),
                    (VersionRange::between(V1_20_2, V1_20_5), 0x24),
                    (VersionRange::since(V1_20_5), 0x26),
                ],
            )
            .timeline(
                &types::play::server::SET_SLOT,
                &[
                    (VersionRange::between(V1_18, V1_19), 0x16),
                    (VersionRange::between(V1_19, V1_19_3), 0x13),
                    (VersionRange::between(V1_19_3, V1_20_2), 0x14),
                    (VersionRange::since(V1_20_2), 0x15),
                ],
            )
            .timeline(
                &types::play::server::PARTICLE,
                &[
                    (VersionRange::between(V1_18, V1_19), 0x24),
                    (VersionRange::between(V1_19, V1_19_3), 0x22),
                    (VersionRange::between(V1_19_3, V1_20_2), 0x27),
                    (VersionRange::since(V1_20_2), 0x28),
                ],
            )
            // introduced at 1.19: absent for every earlier version
            .timeline(
                &types::play::server::SYSTEM_CHAT,
                &[
                    (VersionRange::between(V1_19, V1_19_3), 0x5f),
                    (VersionRange::between(V1_19_3, V1_20_2), 0x60),
                    (VersionRange::since(V1_20_2), 0x67),
                ],
            )
            .timeline(
                &types::play::server::DISCONNECT,
                &[
                    (VersionRange::between(V1_18, V1_19), 0x1a),
                    (VersionRange::between(V1_19, V1_19_3), 0x17),
                    (VersionRange::between(V1_19_3, V1_20_2), 0x1a),
                    (VersionRange::since(V1_20_2), 0x1b),
                ],
            )
            .build(ALL)?;

        Ok(Arc::new(registry))
    }
}
