use std::sync::Arc;

use customgroups_core::domain::Principal;
use customgroups_core::repositories::GroupStore;
use customgroups_core::{ResourceTree, TreeContext};
use customgroups_shared::config::AuthSettings;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GroupStore>,
    pub auth: AuthSettings,
}

impl AppState {
    pub fn new(store: Arc<dyn GroupStore>, auth: AuthSettings) -> Self {
        Self { store, auth }
    }

    /// Fresh tree for one request
    pub fn tree(&self, principal: Principal) -> ResourceTree {
        ResourceTree::new(TreeContext::new(self.store.clone(), Arc::new(principal)))
    }
}
