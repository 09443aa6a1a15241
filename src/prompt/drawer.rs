use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::closable::ClosableRegistry;
use super::zorder::{Band, ZOrder};

/// An open side panel that back-navigation can close.
///
/// Drawers draw from the raw z-order band and stay registered as closable
/// until they are closed, dismissed or dropped.
pub struct Drawer {
    id: String,
    z_index: i64,
    closables: ClosableRegistry,
}

impl Drawer {
    pub fn open(
        closables: &ClosableRegistry,
        zorder: &ZOrder,
        on_dismiss: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let id = format!("drawer-{}", Uuid::new_v4());
        let z_index = zorder.next_in(Band::Drawer);
        closables.register(id.clone(), Some(z_index), Arc::new(on_dismiss));
        debug!("drawer '{}' opened (z={})", id, z_index);
        Self {
            id,
            z_index,
            closables: closables.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn z_index(&self) -> i64 {
        self.z_index
    }

    pub fn is_open(&self) -> bool {
        self.closables.contains(&self.id)
    }

    pub fn close(&self) {
        if self.closables.deregister(&self.id) {
            debug!("drawer '{}' closed", self.id);
        }
    }
}

impl Drop for Drawer {
    fn drop(&mut self) {
        self.close();
    }
}
