use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{Clock, SystemClock};
use crate::errors::Result;
use crate::event::WorkspaceEvents;
use crate::model::{Project, ProjectId};
use crate::storage::WorkspaceStorage;
use crate::store::WorkspaceStore;

/// Cloneable handle to one store shared by several windows.
///
/// Every call locks the store for the duration of a single operation, so
/// operations from different handles are applied one at a time.
pub struct SharedWorkspaceStore<S, C = SystemClock> {
    inner: Arc<Mutex<WorkspaceStore<S, C>>>,
}

impl<S, C> Clone for SharedWorkspaceStore<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: WorkspaceStorage, C: Clock> SharedWorkspaceStore<S, C> {
    pub fn new(store: WorkspaceStore<S, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `read` against the store.
    pub fn read<R>(&self, read: impl FnOnce(&WorkspaceStore<S, C>) -> R) -> R {
        read(&self.lock())
    }

    /// Run `update` against the store as one operation.
    pub fn update<R>(
        &self,
        update: impl FnOnce(&mut WorkspaceStore<S, C>) -> R,
    ) -> R {
        update(&mut self.lock())
    }

    pub fn add(&self, path: impl AsRef<Path>) -> Result<ProjectId> {
        self.lock().add(path)
    }

    pub fn remove(&self, id: ProjectId) -> bool {
        self.lock().remove(id)
    }

    pub fn toggle_pin(&self, id: ProjectId) -> Option<bool> {
        self.lock().toggle_pin(id)
    }

    pub fn select(&self, id: ProjectId) -> bool {
        self.lock().select(id)
    }

    pub fn touch(&self, id: ProjectId) -> bool {
        self.lock().touch(id)
    }

    pub fn sorted_view(&self) -> Vec<Project> {
        self.lock().sorted_view()
    }

    pub fn selected_id(&self) -> Option<ProjectId> {
        self.lock().selected_id()
    }

    pub fn subscribe(&self) -> WorkspaceEvents {
        self.lock().subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, WorkspaceStore<S, C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
