// Order write and read paths on top of the backend selector

use crate::order::OrderRecord;
use crate::selector::BackendSelector;
use crate::storage::StoreResult;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Thin consumer of the selector: writes go through the active backend,
/// reads fan out over every backend until found.
pub struct OrderService {
    selector: Arc<BackendSelector>,
}

impl OrderService {
    pub fn new(selector: Arc<BackendSelector>) -> Self {
        Self { selector }
    }

    /// Persist an order through the currently active backend.
    ///
    /// The rotation check runs first, so a backend that just crossed its
    /// size threshold stops receiving new orders before this write lands.
    pub async fn place_order(&self, order: &OrderRecord) -> StoreResult<()> {
        self.selector.check_and_rotate_if_needed().await;

        let backend = self.selector.active_backend();
        backend.store.insert_order(order).await?;

        info!("Stored order {} in backend '{}'", order.id, backend.name);
        Ok(())
    }

    /// Look up an order across every configured backend, in configuration
    /// order. An unavailable backend is skipped, not fatal.
    pub async fn find_order(&self, id: Uuid) -> Option<OrderRecord> {
        for backend in self.selector.all_backends() {
            match backend.store.find_order_by_id(id).await {
                Ok(Some(order)) => {
                    debug!("Found order {} in backend '{}'", id, backend.name);
                    return Some(order);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        "Backend '{}' unavailable during lookup, skipping: {}",
                        backend.name, e
                    );
                }
            }
        }

        None
    }
}
