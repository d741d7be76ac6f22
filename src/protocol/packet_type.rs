//! Semantic packet identifiers.
//!
//! A [`PacketTypeId`] names a packet independently of any version's opcode
//! assignment. Application code holds these; the registry resolves them
//! to and from per-version opcodes. Each id is registered once per
//! (phase, direction) pair as a static.

use std::fmt;

use crate::protocol::phase::{ConnectionPhase, Direction};

/// Version-independent identity of a semantic packet.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PacketTypeId {
    pub phase: ConnectionPhase,
    pub direction: Direction,
    pub name: &'static str,
}

impl PacketTypeId {
    pub const fn new(phase: ConnectionPhase, direction: Direction, name: &'static str) -> Self {
        Self {
            phase,
            direction,
            name,
        }
    }

    const fn serverbound(phase: ConnectionPhase, name: &'static str) -> Self {
        Self::new(phase, Direction::Serverbound, name)
    }

    const fn clientbound(phase: ConnectionPhase, name: &'static str) -> Self {
        Self::new(phase, Direction::Clientbound, name)
    }
}

impl fmt::Display for PacketTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.phase, self.direction, self.name)
    }
}

/// The semantic packet identifiers registered out of the box, grouped by
/// phase; `client` = serverbound, `server` = clientbound.
pub mod types {
    pub mod handshake {
        pub mod client {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Handshake;

            pub static INTENTION: PacketTypeId = PacketTypeId::serverbound(Handshake, "intention");
        }
    }

    pub mod status {
        pub mod client {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Status;

            pub static STATUS_REQUEST: PacketTypeId =
                PacketTypeId::serverbound(Status, "status_request");
            pub static PING_REQUEST: PacketTypeId =
                PacketTypeId::serverbound(Status, "ping_request");
        }

        pub mod server {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Status;

            pub static STATUS_RESPONSE: PacketTypeId =
                PacketTypeId::clientbound(Status, "status_response");
            pub static PONG_RESPONSE: PacketTypeId =
                PacketTypeId::clientbound(Status, "pong_response");
        }
    }

    pub mod login {
        pub mod client {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Login;

            pub static HELLO: PacketTypeId = PacketTypeId::serverbound(Login, "hello");
            pub static ENCRYPTION_RESPONSE: PacketTypeId =
                PacketTypeId::serverbound(Login, "encryption_response");
            pub static LOGIN_ACKNOWLEDGED: PacketTypeId =
                PacketTypeId::serverbound(Login, "login_acknowledged");
        }

        pub mod server {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Login;

            pub static LOGIN_DISCONNECT: PacketTypeId =
                PacketTypeId::clientbound(Login, "login_disconnect");
            pub static ENCRYPTION_REQUEST: PacketTypeId =
                PacketTypeId::clientbound(Login, "encryption_request");
            pub static LOGIN_FINISHED: PacketTypeId =
                PacketTypeId::clientbound(Login, "login_finished");
            pub static SET_COMPRESSION: PacketTypeId =
                PacketTypeId::clientbound(Login, "set_compression");
        }
    }

    pub mod configuration {
        pub mod client {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Configuration;

            pub static CLIENT_INFORMATION: PacketTypeId =
                PacketTypeId::serverbound(Configuration, "client_information");
            pub static FINISH_CONFIGURATION: PacketTypeId =
                PacketTypeId::serverbound(Configuration, "finish_configuration");
            pub static KEEP_ALIVE: PacketTypeId =
                PacketTypeId::serverbound(Configuration, "keep_alive");
        }

        pub mod server {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Configuration;

            pub static DISCONNECT: PacketTypeId =
                PacketTypeId::clientbound(Configuration, "disconnect");
            pub static FINISH_CONFIGURATION: PacketTypeId =
                PacketTypeId::clientbound(Configuration, "finish_configuration");
            pub static KEEP_ALIVE: PacketTypeId =
                PacketTypeId::clientbound(Configuration, "keep_alive");
        }
    }

    pub mod play {
        pub mod client {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Play;

            pub static CHAT_MESSAGE: PacketTypeId =
                PacketTypeId::serverbound(Play, "chat_message");
            pub static KEEP_ALIVE: PacketTypeId = PacketTypeId::serverbound(Play, "keep_alive");
            pub static PLAYER_POSITION: PacketTypeId =
                PacketTypeId::serverbound(Play, "player_position");
            /// Merged from the historical position/rotation opcode pair;
            /// two wire opcodes resolve to this one semantic id.
            pub static PLAYER_FLYING: PacketTypeId =
                PacketTypeId::serverbound(Play, "player_flying");
        }

        pub mod server {
            use crate::protocol::packet_type::PacketTypeId;
            use crate::protocol::phase::ConnectionPhase::Play;

            pub static KEEP_ALIVE: PacketTypeId = PacketTypeId::clientbound(Play, "keep_alive");
            pub static SET_SLOT: PacketTypeId = PacketTypeId::clientbound(Play, "set_slot");
            pub static PARTICLE: PacketTypeId = PacketTypeId::clientbound(Play, "particle");
            /// Did not exist before 1.19.
            pub static SYSTEM_CHAT: PacketTypeId =
                PacketTypeId::clientbound(Play, "system_chat");
            pub static DISCONNECT: PacketTypeId = PacketTypeId::clientbound(Play, "disconnect");
        }
    }
}
