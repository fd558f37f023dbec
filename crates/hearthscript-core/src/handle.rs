//! Opaque handles for transient host-side state.
//!
//! Scripts receive a short hex token instead of a reference to host
//! data (a parsed command, a group of entities). The token is only
//! valid while its entry is present in the owning [`HandleCache`];
//! dereferencing a stale token is a typed lookup failure.

use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("handle `{id}` not found")]
    NotFound { id: HexId },
    #[error("`{token}` is not a valid handle")]
    Malformed { token: String },
}

/// Short opaque identifier over a fixed key space.
///
/// Minted by random probing against the owning cache's current keys, so
/// ids are neither monotonic nor reusable after removal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexId(u32);

impl HexId {
    /// Produce an id guaranteed absent from `existing` at call time.
    pub fn mint_unique<T>(existing: &HashMap<HexId, T>) -> Self {
        let mut rng = rand::rng();
        loop {
            let candidate = Self(rng.random());
            if !existing.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

impl fmt::Display for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::Debug for HexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexId({self})")
    }
}

impl FromStr for HexId {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // exactly eight hex digits; from_str_radix alone would also
        // accept a sign, which breaks exact round-tripping
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HandleError::Malformed {
                token: s.to_string(),
            });
        }
        u32::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| HandleError::Malformed {
                token: s.to_string(),
            })
    }
}

/// Keyed store of transient host objects addressed by [`HexId`].
pub struct HandleCache<T> {
    entries: HashMap<HexId, T>,
}

impl<T> Default for HandleCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Mint a fresh id and store `value` under it.
    pub fn insert(&mut self, value: T) -> HexId {
        let id = HexId::mint_unique(&self.entries);
        self.entries.insert(id, value);
        id
    }

    pub fn get(&self, id: HexId) -> Result<&T, HandleError> {
        self.entries.get(&id).ok_or(HandleError::NotFound { id })
    }

    pub fn get_mut(&mut self, id: HexId) -> Result<&mut T, HandleError> {
        self.entries
            .get_mut(&id)
            .ok_or(HandleError::NotFound { id })
    }

    /// Idempotent removal; removing an absent id is not an error so
    /// callers may free defensively.
    pub fn remove(&mut self, id: HexId) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: HexId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
