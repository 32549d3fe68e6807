//! HTTP surface: nested resource controllers over the office hierarchy.
//!
//! `router::build_router` is the entry point; each controller module owns
//! the handlers for one entity and declares the permission names it needs.
pub mod beneficiaries;
pub mod context;
pub mod error;
pub mod offices;
pub mod plans;
pub mod programs;
pub mod records;
pub mod router;
pub mod users;

use crate::permissions::AccessPolicy;
use crate::store::Store;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(store: Store, policy: AccessPolicy) -> Self {
        AppState {
            store: Arc::new(store),
            policy: Arc::new(policy),
        }
    }
}
