//! Per-origin permission grants.

use parking_lot::RwLock;
use shared_types::{DAppSession, PermissionRequest};
use std::collections::HashMap;

/// Grants keyed by origin. One grant per origin; a new grant replaces the
/// old one.
#[derive(Debug, Default)]
pub struct PermissionTable {
    grants: RwLock<HashMap<String, DAppSession>>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant held by `origin`, if any.
    pub fn get(&self, origin: &str) -> Option<DAppSession> {
        self.grants.read().get(origin).cloned()
    }

    /// Grant held by `origin` for the same network and application.
    pub fn matching(&self, origin: &str, request: &PermissionRequest) -> Option<DAppSession> {
        self.grants
            .read()
            .get(origin)
            .filter(|g| g.network == request.network && g.app_meta.name == request.app_meta.name)
            .cloned()
    }

    pub fn insert(&self, grant: DAppSession) {
        self.grants.write().insert(grant.origin.clone(), grant);
    }

    /// Remove the grant of `origin`. Returns whether one existed.
    pub fn remove(&self, origin: &str) -> bool {
        self.grants.write().remove(origin).is_some()
    }

    /// All grants, ordered by origin.
    pub fn list(&self) -> Vec<DAppSession> {
        let mut grants: Vec<_> = self.grants.read().values().cloned().collect();
        grants.sort_by(|a, b| a.origin.cmp(&b.origin));
        grants
    }

    pub fn len(&self) -> usize {
        self.grants.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.read().is_empty()
    }
}
