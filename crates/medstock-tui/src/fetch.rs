//! Background fetches: one task per request, results back as actions.
//!
//! Every request gets a per-resource generation number. The app only
//! accepts a completion carrying the newest number it issued for that
//! resource, so a slow early response never overwrites a later one.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use medstock_core::{Inventory, Resource};

use crate::action::{Action, Notification};

/// Newest generation issued per resource.
#[derive(Debug, Default)]
pub struct Generations(HashMap<Resource, u64>);

impl Generations {
    /// Bump and return the generation for a new request.
    pub fn issue(&mut self, resource: Resource) -> u64 {
        let generation = self.0.entry(resource).or_insert(0);
        *generation += 1;
        *generation
    }

    pub fn is_current(&self, resource: Resource, generation: u64) -> bool {
        self.0.get(&resource) == Some(&generation)
    }
}

/// List `resource` and report back as `RecordsLoaded` / `FetchFailed`.
pub fn spawn_list(
    inventory: Inventory,
    resource: Resource,
    generation: u64,
    tx: UnboundedSender<Action>,
) {
    tokio::spawn(async move {
        let action = match inventory.list(resource).await {
            Ok(records) => {
                debug!(%resource, generation, count = records.len(), "fetch complete");
                Action::RecordsLoaded {
                    resource,
                    generation,
                    rows: Arc::new(records.into_iter().map(Arc::new).collect()),
                }
            }
            Err(e) => {
                warn!(%resource, generation, error = %e, "fetch failed");
                Action::FetchFailed {
                    resource,
                    generation,
                    message: e.to_string(),
                }
            }
        };
        let _ = tx.send(action);
    });
}

/// Delete one record, then ask for a fresh listing on success.
pub fn spawn_delete(
    inventory: Inventory,
    resource: Resource,
    id: String,
    name: String,
    tx: UnboundedSender<Action>,
) {
    tokio::spawn(async move {
        match inventory.delete(resource, &id).await {
            Ok(()) => {
                let _ = tx.send(Action::Notify(Notification::success(format!("Deleted {name}"))));
                let _ = tx.send(Action::Refresh(resource));
            }
            Err(e) => {
                warn!(%resource, id, error = %e, "delete failed");
                let _ = tx.send(Action::Notify(Notification::error(e.to_string())));
            }
        }
    });
}
