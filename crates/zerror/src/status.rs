use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{IdSlot, TraceId};

/// Key/value metadata attached to a status.
pub type Metadata = HashMap<String, String>;

/// Machine-readable description of an error.
///
/// `code` is an HTTP status for errors built in-process; `reason` is the
/// stable symbolic name matched by programs; `message` is for humans.
///
/// `id` names the origination event. It is copied verbatim by every
/// derivation, never regenerated by one.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "IdSlot::is_empty")]
    pub(crate) id: IdSlot,
}

impl Status {
    /// A status with no id yet.
    pub fn new(code: i32, reason: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            message: message.into(),
            metadata: Metadata::new(),
            id: IdSlot::empty(),
        }
    }

    /// Set the id, replacing any previous one.
    pub fn with_id(mut self, id: impl Into<TraceId>) -> Self {
        self.id = IdSlot::with(id.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The id, if one has been materialized.
    pub fn id(&self) -> Option<&TraceId> {
        self.id.get()
    }

    /// Metadata in key order, for stable rendering.
    pub fn sorted_metadata(&self) -> BTreeMap<&str, &str> {
        self.metadata
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Status");
        d.field("code", &self.code);
        d.field("reason", &self.reason);

        if !self.message.is_empty() {
            d.field("message", &self.message);
        }
        if !self.metadata.is_empty() {
            d.field("metadata", &self.sorted_metadata());
        }
        if !self.id.is_empty() {
            d.field("id", &self.id);
        }

        d.finish()
    }
}
