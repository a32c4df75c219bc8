//! Background dashboard refresh.
//!
//! The GUI thread never waits on the store: each refresh loads a
//! `DashboardSnapshot` on a spawned tokio task and hands the result to a
//! completion callback. Refreshes are numbered; a result whose number is no
//! longer the newest issued is dropped, so the display only ever moves
//! forward (last write wins). There is no cancellation or timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use stockroom_inventory::{InventoryResult, InventoryService, ItemStore};
use tokio::task::JoinHandle;

use crate::types::DashboardSnapshot;

pub struct DashboardRefresher<S> {
    service: Arc<InventoryService<S>>,
    low_stock_threshold: i64,
    issued: Arc<AtomicU64>,
    // Held while checking freshness and running the callback, so deliveries
    // are serialized in issue order.
    delivery: Arc<Mutex<()>>,
}

impl<S> Clone for DashboardRefresher<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            low_stock_threshold: self.low_stock_threshold,
            issued: self.issued.clone(),
            delivery: self.delivery.clone(),
        }
    }
}

impl<S> DashboardRefresher<S>
where
    S: ItemStore + 'static,
{
    pub fn new(service: Arc<InventoryService<S>>, low_stock_threshold: i64) -> Self {
        Self {
            service,
            low_stock_threshold,
            issued: Arc::new(AtomicU64::new(0)),
            delivery: Arc::new(Mutex::new(())),
        }
    }

    /// Load a snapshot in the background and pass it to `on_done`.
    ///
    /// Must be called from within a tokio runtime. The returned handle
    /// resolves to `true` if the callback ran, `false` if the result was
    /// superseded by a newer refresh.
    pub fn refresh<F>(&self, on_done: F) -> JoinHandle<bool>
    where
        F: FnOnce(InventoryResult<DashboardSnapshot>) + Send + 'static,
    {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let issued = self.issued.clone();
        let delivery = self.delivery.clone();
        let service = self.service.clone();
        let threshold = self.low_stock_threshold;

        tokio::spawn(async move {
            let result = DashboardSnapshot::load(&service, threshold).await;
            if let Err(err) = &result {
                tracing::error!(generation, error = %err, "dashboard refresh failed");
            }

            let _guard = delivery.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let latest = issued.load(Ordering::SeqCst);
            if latest != generation {
                tracing::debug!(generation, latest, "dropping superseded dashboard refresh");
                return false;
            }
            on_done(result);
            true
        })
    }
}
