use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the table store when a row is inserted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Entity-specific fields carried by an [`OrderedItem`].
///
/// Reordering never looks inside the payload. The only thing the manager
/// needs to know is whether a binary object has to be removed together
/// with the row.
pub trait Payload: Clone + Send + Sync + 'static {
    /// Key of the object-store entry owned by this payload, if any.
    fn object_key(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem<P> {
    pub id: ItemId,
    pub display_order: i64,
    #[serde(flatten)]
    pub payload: P,
    pub created_at: String,
}

impl<P> OrderedItem<P> {
    pub fn new(id: ItemId, display_order: i64, payload: P) -> Self {
        Self {
            id,
            display_order,
            payload,
            created_at: String::new(),
        }
    }
}
