//! The session registry: at most one live game at a time.
//!
//! A client plays one game per process. Rather than a global singleton,
//! the application owns a [`SessionRegistry`] and hands clones of it to
//! whoever creates sessions. The registry is a single slot:
//!
//! ```text
//! claim() ──→ [slot = S-1] ──→ lease dropped / released ──→ [empty]
//!    │
//!    └── while occupied: AlreadyActive
//! ```
//!
//! A successful claim returns a [`SessionLease`]. The lease is not
//! `Clone`, and releasing it consumes it, so however many teardown paths
//! race (explicit disconnect, transport error, game over) the slot is
//! cleared exactly once.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Identity, SessionError};

/// Identifier of one game session within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Single-slot registry of the live game session.
///
/// Cloning is cheap and every clone shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    slot: Arc<Mutex<Option<SessionId>>>,
    next_id: Arc<AtomicU64>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for a new session.
    ///
    /// # Errors
    /// - [`SessionError::Unauthenticated`] if `identity` has no logged-in
    ///   user. Nothing is registered.
    /// - [`SessionError::AlreadyActive`] if another session holds the slot.
    pub fn claim(
        &self,
        identity: &dyn Identity,
    ) -> Result<SessionLease, SessionError> {
        if !identity.is_authenticated() {
            return Err(SessionError::Unauthenticated);
        }

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = *slot {
            return Err(SessionError::AlreadyActive(active));
        }

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        *slot = Some(id);
        tracing::debug!(session = %id, "session slot claimed");

        Ok(SessionLease {
            id,
            registry: self.clone(),
            released: false,
        })
    }

    /// The session currently holding the slot, if any.
    pub fn active(&self) -> Option<SessionId> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if a session holds the slot.
    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    fn vacate(&self, id: SessionId) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // A stale lease must never clear a newer session's claim.
        if *slot == Some(id) {
            *slot = None;
            tracing::debug!(session = %id, "session slot released");
        }
    }
}

/// Proof of holding the registry slot.
///
/// Dropping the lease releases the slot, so it is released even if the
/// owning session is dropped without an explicit teardown.
#[derive(Debug)]
pub struct SessionLease {
    id: SessionId,
    registry: SessionRegistry,
    released: bool,
}

impl SessionLease {
    /// The id assigned to this session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Releases the slot now.
    pub fn release(mut self) {
        self.release_slot();
    }

    fn release_slot(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.vacate(self.id);
        }
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.release_slot();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticIdentity;

    fn alice() -> StaticIdentity {
        StaticIdentity::new("alice", "token")
    }

    #[test]
    fn test_claim_authenticated_registers_session() {
        let registry = SessionRegistry::new();
        let lease = registry.claim(&alice()).expect("should claim");

        assert_eq!(registry.active(), Some(lease.id()));
        assert_eq!(lease.id().to_string(), "S-1");
    }

    #[test]
    fn test_claim_unauthenticated_registers_nothing() {
        let registry = SessionRegistry::new();
        let result = registry.claim(&StaticIdentity::anonymous());

        assert!(matches!(result, Err(SessionError::Unauthenticated)));
        assert!(!registry.is_active());
    }

    #[test]
    fn test_claim_while_active_returns_already_active() {
        let registry = SessionRegistry::new();
        let first = registry.claim(&alice()).unwrap();

        let second = registry.clone().claim(&alice());
        assert!(
            matches!(second, Err(SessionError::AlreadyActive(id)) if id == first.id())
        );
    }

    #[test]
    fn test_release_frees_slot_for_next_claim() {
        let registry = SessionRegistry::new();
        let first = registry.claim(&alice()).unwrap();
        first.release();
        assert!(!registry.is_active());

        let second = registry.claim(&alice()).expect("slot should be free");
        assert_eq!(second.id().into_inner(), 2);
    }

    #[test]
    fn test_drop_releases_slot() {
        let registry = SessionRegistry::new();
        {
            let _lease = registry.claim(&alice()).unwrap();
            assert!(registry.is_active());
        }
        assert!(!registry.is_active());
    }

    #[test]
    fn test_stale_vacate_does_not_clear_newer_claim() {
        let registry = SessionRegistry::new();
        let first = registry.claim(&alice()).unwrap();
        let first_id = first.id();
        first.release();
        let second = registry.claim(&alice()).unwrap();

        registry.vacate(first_id);
        assert_eq!(registry.active(), Some(second.id()));
    }
}
