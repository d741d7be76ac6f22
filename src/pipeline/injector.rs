//! # Injection/Ejection Manager
//!
//! Attaches and detaches the interception transform on live connections,
//! at the correct position in each connection's processing chain: inbound
//! frames reach the transform after de-framing and decompression, outbound
//! frames before the host's compression and encryption stages re-wrap
//! them.
//!
//! Attach and eject are idempotent and race-free against concurrent
//! disconnect: the connection table is guarded, and every interceptor sits
//! behind its own per-connection lock so double-attach and use-after-eject
//! cannot happen. Ejecting flushes any buffered partial frame back to the
//! host's normal path so no data is lost.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tracing::{debug, info};

use crate::config::InterceptConfig;
use crate::core::version::ProtocolVersion;
use crate::error::{ProtocolError, Result};
use crate::pipeline::dispatcher::ListenerChain;
use crate::pipeline::interceptor::Interceptor;
use crate::protocol::registry::PacketRegistry;
use crate::transport::chain::ProcessingChain;

/// Opaque identity of a host connection.
pub type ConnectionId = u64;

/// Explicit context for every component: registry, listeners, and config
/// are handed in at construction, shared immutably across connections.
pub struct InjectionManager {
    registry: Arc<PacketRegistry>,
    listeners: Arc<ListenerChain>,
    config: Arc<InterceptConfig>,
    connections: Mutex<HashMap<ConnectionId, Arc<Mutex<Interceptor>>>>,
}

impl InjectionManager {
    pub fn new(
        registry: Arc<PacketRegistry>,
        listeners: Arc<ListenerChain>,
        config: Arc<InterceptConfig>,
    ) -> Self {
        Self {
            registry,
            listeners,
            config,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Convenience constructor over the builtin packet-type timelines.
    pub fn with_standard_registry(config: InterceptConfig) -> Result<Self> {
        Ok(Self::new(
            PacketRegistry::standard()?,
            Arc::new(ListenerChain::new()),
            Arc::new(config),
        ))
    }

    pub fn listeners(&self) -> &Arc<ListenerChain> {
        &self.listeners
    }

    pub fn is_attached(&self, id: ConnectionId) -> bool {
        self.connections
            .lock()
            .map(|map| map.contains_key(&id))
            .unwrap_or(false)
    }

    /// Splices a new interceptor into `chain`. Attaching an
    /// already-attached connection is a no-op.
    pub fn attach(&self, id: ConnectionId, chain: &mut ProcessingChain) -> Result<()> {
        let mut connections = self
            .connections
            .lock()
            .map_err(|_| ProtocolError::LockPoisoned)?;

        if connections.contains_key(&id) {
            debug!(connection = id, "attach skipped, already attached");
            return Ok(());
        }

        let interceptor = Arc::new(Mutex::new(Interceptor::new(
            id,
            self.registry.clone(),
            self.listeners.clone(),
            self.config.clone(),
        )));
        chain.splice(interceptor.clone());
        connections.insert(id, interceptor);
        info!(connection = id, "interceptor attached");
        Ok(())
    }

    /// Removes the transform from `chain`. Returns any buffered partial
    /// frame so the host can replay it down its normal path. Detaching a
    /// connection that is not attached is a no-op.
    pub fn detach(&self, id: ConnectionId, chain: &mut ProcessingChain) -> Result<Option<Bytes>> {
        let removed = {
            let mut connections = self
                .connections
                .lock()
                .map_err(|_| ProtocolError::LockPoisoned)?;
            connections.remove(&id)
        };

        let Some(interceptor) = removed else {
            debug!(connection = id, "detach skipped, not attached");
            return Ok(None);
        };

        interceptor
            .lock()
            .map_err(|_| ProtocolError::LockPoisoned)?
            .detach();
        let flushed = chain.unsplice();
        info!(
            connection = id,
            flushed = flushed.as_ref().map_or(0, Bytes::len),
            "interceptor ejected"
        );
        Ok(flushed)
    }

    /// Binds the negotiated protocol version for an attached connection.
    pub fn bind_version(&self, id: ConnectionId, version: ProtocolVersion) -> Result<()> {
        let interceptor = {
            let connections = self
                .connections
                .lock()
                .map_err(|_| ProtocolError::LockPoisoned)?;
            connections
                .get(&id)
                .cloned()
                .ok_or(ProtocolError::NotAttached(id))?
        };
        interceptor
            .lock()
            .map_err(|_| ProtocolError::LockPoisoned)?
            .bind_version(version);
        Ok(())
    }
}
