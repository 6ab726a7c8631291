use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use crate::clock::{Clock, SystemClock};
use crate::config::{DEFAULT_MAX_RECENTS, WorkspaceConfig};
use crate::errors::{Result, WorkspaceError};
use crate::event::{Subscribers, WorkspaceEvent, WorkspaceEvents};
use crate::model::{Project, ProjectId, WorkspaceFile};
use crate::path::normalize_path;
use crate::storage::{JsonFileStorage, WorkspaceStorage};

/// Owner of the canonical project list.
///
/// State is loaded once when the store is built and written back through
/// the storage gateway after every mutation. Mutations take `&mut self`, so
/// readers always observe a fully applied previous operation.
pub struct WorkspaceStore<S, C = SystemClock> {
    projects: Vec<Project>,
    selected: Option<ProjectId>,
    max_recents: usize,
    storage: S,
    clock: C,
    subscribers: Subscribers,
}

/// Builder for [`WorkspaceStore`].
pub struct WorkspaceStoreBuilder<S, C = SystemClock> {
    storage: S,
    clock: C,
    max_recents: usize,
}

impl<S: WorkspaceStorage> WorkspaceStoreBuilder<S, SystemClock> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: SystemClock,
            max_recents: DEFAULT_MAX_RECENTS,
        }
    }
}

impl<S: WorkspaceStorage, C: Clock> WorkspaceStoreBuilder<S, C> {
    /// Cap on unpinned projects kept after an add.
    #[must_use]
    pub fn max_recents(mut self, max_recents: usize) -> Self {
        self.max_recents = max_recents;
        self
    }

    /// Replace the time source used for recency.
    #[must_use]
    pub fn clock<N: Clock>(self, clock: N) -> WorkspaceStoreBuilder<S, N> {
        WorkspaceStoreBuilder {
            storage: self.storage,
            clock,
            max_recents: self.max_recents,
        }
    }

    /// Load persisted state and build the store.
    pub fn build(self) -> WorkspaceStore<S, C> {
        let projects = self.storage.load().sanitized().projects;
        let selected = projects.first().map(Project::id);
        log::debug!("workspace store loaded {} projects", projects.len());

        WorkspaceStore {
            projects,
            selected,
            max_recents: self.max_recents,
            storage: self.storage,
            clock: self.clock,
            subscribers: Subscribers::default(),
        }
    }
}

impl WorkspaceStore<JsonFileStorage> {
    /// Open the store backed by the JSON file named in `config`.
    pub fn open(config: &WorkspaceConfig) -> Self {
        WorkspaceStoreBuilder::new(JsonFileStorage::new(&config.storage_path))
            .max_recents(config.max_recents)
            .build()
    }
}

impl<S: WorkspaceStorage> WorkspaceStore<S> {
    /// Build a store over `storage` with default settings.
    pub fn new(storage: S) -> Self {
        WorkspaceStoreBuilder::new(storage).build()
    }

    pub fn builder(storage: S) -> WorkspaceStoreBuilder<S> {
        WorkspaceStoreBuilder::new(storage)
    }
}

impl<S: WorkspaceStorage, C: Clock> WorkspaceStore<S, C> {
    /// Add the project rooted at `path` and return its id.
    ///
    /// Adding a path that is already known pins and touches the existing
    /// record instead of creating a second one. The added project becomes
    /// the selection. Either way the recents cap is enforced afterwards.
    ///
    /// Paths that are not valid UTF-8 cannot be written to the workspace
    /// file and are rejected without touching the store.
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<ProjectId> {
        let root_path = normalize_path(path.as_ref());
        if root_path.to_str().is_none() {
            return Err(WorkspaceError::NonUtf8Path(root_path));
        }
        let now = self.clock.now();

        if let Some(project) = self
            .projects
            .iter_mut()
            .find(|project| project.root_path() == root_path.as_path())
        {
            project.set_pinned(true);
            project.touch(now);
            let id = project.id();
            self.selected = Some(id);
            self.subscribers.publish(WorkspaceEvent::Reopened { id });
            self.trim_recents();
            self.persist();
            return Ok(id);
        }

        let id = self.fresh_id();
        log::debug!("adding workspace project {}", root_path.display());
        self.projects.push(Project::new(id, root_path, true, now));
        self.selected = Some(id);
        self.subscribers.publish(WorkspaceEvent::Added { id });
        self.trim_recents();
        self.persist();
        Ok(id)
    }

    /// Remove the project with `id`. Unknown ids are ignored.
    ///
    /// Returns whether a project was removed.
    pub fn remove(&mut self, id: ProjectId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.projects.remove(index);
        if self.selected == Some(id) {
            self.selected = self.projects.first().map(Project::id);
        }
        self.subscribers.publish(WorkspaceEvent::Removed { id });
        self.persist();
        true
    }

    /// Flip the pinned flag of `id` and return the new value.
    pub fn toggle_pin(&mut self, id: ProjectId) -> Option<bool> {
        let index = self.position(id)?;
        let project = &mut self.projects[index];
        let pinned = !project.is_pinned();
        project.set_pinned(pinned);

        self.subscribers
            .publish(WorkspaceEvent::PinToggled { id, pinned });
        self.persist();
        Some(pinned)
    }

    /// Make `id` the selected project and mark it as just opened.
    pub fn select(&mut self, id: ProjectId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let now = self.clock.now();
        self.projects[index].touch(now);
        self.selected = Some(id);
        self.subscribers.publish(WorkspaceEvent::Selected { id });
        self.persist();
        true
    }

    /// Mark `id` as just opened without changing the selection.
    pub fn touch(&mut self, id: ProjectId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let now = self.clock.now();
        self.projects[index].touch(now);
        self.subscribers.publish(WorkspaceEvent::Touched { id });
        self.persist();
        true
    }

    /// Pinned projects by name, then unpinned projects most recent first.
    pub fn sorted_view(&self) -> Vec<Project> {
        let mut view = self.projects.clone();
        view.sort_by(display_order);
        view
    }

    /// Projects in insertion order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| project.id() == id)
    }

    pub fn selected_id(&self) -> Option<ProjectId> {
        self.selected
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn max_recents(&self) -> usize {
        self.max_recents
    }

    /// Current state in its persisted shape.
    pub fn snapshot(&self) -> WorkspaceFile {
        WorkspaceFile::new(self.projects.clone())
    }

    /// Receive a [`WorkspaceEvent`] for every subsequent mutation.
    pub fn subscribe(&mut self) -> WorkspaceEvents {
        self.subscribers.subscribe(None)
    }

    /// Like [`Self::subscribe`], but events are dropped once `capacity`
    /// are waiting.
    pub fn subscribe_bounded(&mut self, capacity: usize) -> WorkspaceEvents {
        self.subscribers.subscribe(Some(capacity))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Drop the oldest unpinned projects beyond the recents cap.
    fn trim_recents(&mut self) {
        let mut recents: Vec<&Project> = self
            .projects
            .iter()
            .filter(|project| !project.is_pinned())
            .collect();
        if recents.len() <= self.max_recents {
            return;
        }

        recents.sort_by(|left, right| display_order(left, right));
        let evicted: Vec<ProjectId> = recents
            .into_iter()
            .skip(self.max_recents)
            .map(Project::id)
            .collect();
        let evicted_set: HashSet<ProjectId> =
            evicted.iter().copied().collect();

        self.projects
            .retain(|project| !evicted_set.contains(&project.id()));
        if self.selected.is_some_and(|id| evicted_set.contains(&id)) {
            self.selected = self.projects.first().map(Project::id);
        }

        log::debug!("evicted {} recent workspace projects", evicted.len());
        self.subscribers
            .publish(WorkspaceEvent::Evicted { ids: evicted });
    }

    fn persist(&self) {
        self.storage.save(&self.snapshot());
    }

    fn position(&self, id: ProjectId) -> Option<usize> {
        self.projects.iter().position(|project| project.id() == id)
    }

    fn fresh_id(&self) -> ProjectId {
        loop {
            let id = ProjectId::new();
            if self.position(id).is_none() {
                return id;
            }
        }
    }
}

/// Total order used by the rail: pinned before unpinned, pinned by
/// case-insensitive name, unpinned by `last_opened_at` descending. Remaining
/// ties fall back to name and id so the order is deterministic.
fn display_order(left: &Project, right: &Project) -> Ordering {
    right
        .is_pinned()
        .cmp(&left.is_pinned())
        .then_with(|| {
            if left.is_pinned() {
                Ordering::Equal
            } else {
                right.last_opened_at().cmp(&left.last_opened_at())
            }
        })
        .then_with(|| compare_names(left.name(), right.name()))
        .then_with(|| left.id().cmp(&right.id()))
}

fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}
