use std::fmt;
use std::panic::Location;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec;

/// An opaque, reversible trace identifier.
///
/// The string is standard base64 over a colon-delimited record of where
/// and when an error was created. [`codec::decode`] turns it back into a
/// [`DebugRecord`](crate::DebugRecord).
///
/// Equality is plain string equality: two ids are the same only if they
/// name the same origination event.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct TraceId(String);

impl TraceId {
    /// Wrap an id received from elsewhere. No validation is done; foreign
    /// ids are carried verbatim.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a new id located at the caller.
    #[track_caller]
    pub fn generate() -> Self {
        codec::generate_at(Location::caller())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self.0)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TraceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for TraceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TraceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Write-once holder for a status's trace id.
///
/// Constructors fill it eagerly. Values built without an id (deserialized
/// bodies, `with_id("")`) fill it on first read through [`get_or_generate`],
/// and `OnceLock` guarantees every concurrent reader sees the same id.
///
/// [`get_or_generate`]: IdSlot::get_or_generate
#[derive(Clone, Default)]
pub struct IdSlot(OnceLock<TraceId>);

impl IdSlot {
    /// An empty slot.
    pub fn empty() -> Self {
        Self(OnceLock::new())
    }

    /// A slot holding `id`. An empty id leaves the slot empty.
    pub fn with(id: TraceId) -> Self {
        let slot = Self::empty();
        if !id.is_empty() {
            let _ = slot.0.set(id);
        }
        slot
    }

    /// The id, if one has been materialized.
    #[inline]
    pub fn get(&self) -> Option<&TraceId> {
        self.0.get()
    }

    /// The id, minting one located at `loc` if the slot is empty.
    pub fn get_or_generate(&self, loc: &'static Location<'static>) -> &TraceId {
        self.0.get_or_init(|| codec::generate_at(loc))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.get().is_none()
    }

    /// The id as a string, empty if not materialized.
    pub fn as_str(&self) -> &str {
        self.get().map(TraceId::as_str).unwrap_or("")
    }
}

impl PartialEq for IdSlot {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for IdSlot {}

impl fmt::Debug for IdSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(id) => write!(f, "{}", id),
            None => f.write_str("<unset>"),
        }
    }
}

impl Serialize for IdSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IdSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(Self::with(TraceId::from(id)))
    }
}
