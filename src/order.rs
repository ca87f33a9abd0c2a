// Order record as seen by the storage layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted order record.
///
/// The storage layer only cares about the identity and the creation
/// timestamp; everything the shop front attaches to an order (customer,
/// items, shipping) travels in the opaque payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl OrderRecord {
    /// Create a new record stamped with a fresh id and the current time
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            payload,
        }
    }
}
