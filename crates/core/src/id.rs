//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Opaque, comparable identity of an entity.
///
/// Two identifiers are equal iff their underlying scalar values are equal.
pub trait EntityId:
    Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static
{
}

impl<T> EntityId for T where
    T: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display + Send + Sync + 'static
{
}

/// UUID-backed identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueEntityId(Uuid);

impl UniqueEntityId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UniqueEntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for UniqueEntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for UniqueEntityId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<UniqueEntityId> for Uuid {
    fn from(value: UniqueEntityId) -> Self {
        value.0
    }
}

impl FromStr for UniqueEntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s.trim())
            .map_err(|e| DomainError::invalid_id(format!("UniqueEntityId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Sequence-backed identifier (e.g. database serial keys).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncrementalEntityId(u64);

impl IncrementalEntityId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for IncrementalEntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IncrementalEntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("IncrementalEntityId: {e}")))?;
        Ok(Self(value))
    }
}

/// Issues monotonically increasing [`IncrementalEntityId`]s.
///
/// One sequence per owner (process, repository, test); there is no hidden
/// global counter.
#[derive(Debug, Default)]
pub struct IdSequence {
    last: AtomicU64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the sequence after an already-issued value.
    pub fn starting_after(last: u64) -> Self {
        Self {
            last: AtomicU64::new(last),
        }
    }

    pub fn next_id(&self) -> IncrementalEntityId {
        IncrementalEntityId(self.last.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Declare a typed identifier wrapping [`UniqueEntityId`].
#[macro_export]
macro_rules! unique_id_newtype {
    ($(#[$meta:meta])* $t:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(pub $crate::UniqueEntityId);

        impl $t {
            pub fn new() -> Self {
                Self($crate::UniqueEntityId::new())
            }

            pub fn from_unique(id: $crate::UniqueEntityId) -> Self {
                Self(id)
            }

            pub fn as_unique(&self) -> &$crate::UniqueEntityId {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$crate::UniqueEntityId>()
                    .map(Self)
                    .map_err(|e| $crate::DomainError::invalid_id(format!(
                        "{}: {}",
                        stringify!($t),
                        e.message()
                    )))
            }
        }
    };
}
