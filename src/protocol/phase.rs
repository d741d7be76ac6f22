//! Connection phases and packet directions.
//!
//! Packet numbering is partitioned by both: the same opcode means different
//! things in different phases and directions, so every registry key and
//! every lookup carries the pair.

use std::fmt;

/// The protocol state a connection is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionPhase {
    Handshake,
    Status,
    Login,
    /// Only exists from protocol 764 onward.
    Configuration,
    Play,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionPhase::Handshake => "handshake",
            ConnectionPhase::Status => "status",
            ConnectionPhase::Login => "login",
            ConnectionPhase::Configuration => "configuration",
            ConnectionPhase::Play => "play",
        };
        f.write_str(name)
    }
}

/// Which endpoint emitted a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server.
    Serverbound,
    /// Server to client.
    Clientbound,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Serverbound => Direction::Clientbound,
            Direction::Clientbound => Direction::Serverbound,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Serverbound => f.write_str("serverbound"),
            Direction::Clientbound => f.write_str("clientbound"),
        }
    }
}
