//! Client registry: a fixed-capacity slot table for connected clients.
//!
//! Slots are positional (used for `/who` enumeration) while all
//! addressing during I/O goes by [`ClientId`], a logical identifier that
//! is never recycled. An OS-level handle being reused by the kernel can
//! therefore never be mistaken for a stale client.

use thiserror::Error;

/// Maximum stored nickname length in bytes.
pub const MAX_NICKNAME_LEN: usize = 64;

/// Stable logical identifier for a connected client.
///
/// Assigned monotonically at accept time and unique for the lifetime of
/// the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when the registry has no free slot.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("client registry full")]
pub struct RegistryFull;

/// One live client's registry state.
#[derive(Debug, Clone)]
pub struct ClientEntry {
    /// The client's logical identifier.
    pub id: ClientId,
    /// Nickname override; empty means unset.
    pub nickname: String,
}

/// Fixed-capacity table of live clients.
#[derive(Debug)]
pub struct ClientRegistry {
    slots: Vec<Option<ClientEntry>>,
}

impl ClientRegistry {
    /// Create a registry with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// The fixed slot capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live clients.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no clients are registered.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Insert a client into the first free slot.
    ///
    /// Returns the slot index, or [`RegistryFull`] when capacity is
    /// exhausted; the caller must close the connection immediately, there
    /// is no queuing.
    pub fn register(&mut self, id: ClientId) -> Result<usize, RegistryFull> {
        let free = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(RegistryFull)?;

        self.slots[free] = Some(ClientEntry {
            id,
            nickname: String::new(),
        });
        Ok(free)
    }

    /// Free the slot holding `id`. Idempotent for absent ids.
    pub fn unregister(&mut self, id: ClientId) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|e| e.id == id) {
                *slot = None;
            }
        }
    }

    /// True if `id` currently occupies a slot.
    pub fn contains(&self, id: ClientId) -> bool {
        self.live().any(|e| e.id == id)
    }

    /// Overwrite the nickname for the slot holding `id`.
    ///
    /// The name is truncated to [`MAX_NICKNAME_LEN`] bytes on a character
    /// boundary. An empty name clears the override. Duplicate nicknames
    /// across clients are permitted. Returns false if `id` is not
    /// registered.
    pub fn set_nickname(&mut self, id: ClientId, name: &str) -> bool {
        let Some(entry) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|e| e.id == id)
        else {
            return false;
        };

        let mut cut = name.len().min(MAX_NICKNAME_LEN);
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        entry.nickname = name[..cut].to_string();
        true
    }

    /// The name shown for `id` in chat output.
    ///
    /// The nickname if set and non-empty, else a synthetic name derived
    /// from the id.
    pub fn display_name(&self, id: ClientId) -> String {
        match self.live().find(|e| e.id == id) {
            Some(entry) if !entry.nickname.is_empty() => entry.nickname.clone(),
            _ => format!("Client {id}"),
        }
    }

    /// Iterate live entries in slot order.
    pub fn live(&self) -> impl Iterator<Item = &ClientEntry> {
        self.slots.iter().flatten()
    }
}
