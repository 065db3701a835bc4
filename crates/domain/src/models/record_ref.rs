//! Foreign-key references between records.

use serde::{Deserialize, Serialize};
use shared::validation::AsRecordId;

/// A foreign key as the record API returns it.
///
/// The same field arrives either as a bare id or as a lookup object carrying
/// the referenced record's `Id` and display `Name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordRef {
    Lookup {
        #[serde(rename = "Id")]
        id: i64,
        #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Id(i64),
}

impl RecordRef {
    /// The referenced record id, whichever shape was received.
    pub fn id(&self) -> i64 {
        match self {
            RecordRef::Lookup { id, .. } | RecordRef::Id(id) => *id,
        }
    }

    /// The display name, present only on lookup objects.
    pub fn name(&self) -> Option<&str> {
        match self {
            RecordRef::Lookup { name, .. } => name.as_deref(),
            RecordRef::Id(_) => None,
        }
    }
}

impl AsRecordId for RecordRef {
    fn as_record_id(&self) -> Option<i64> {
        self.id().as_record_id()
    }
}

/// Records identified by a server-assigned integer `Id`.
pub trait Identified {
    fn record_id(&self) -> i64;
}

/// Display data for a foreign key that is resolved by a second lookup.
///
/// Until the lookup has produced the referenced record the reference is
/// reported as `loading`, never as an empty value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Resolution<T> {
    Loading,
    Resolved(T),
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn as_resolved(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            Resolution::Loading => None,
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Resolution::Loading, Resolution::Resolved)
    }
}
