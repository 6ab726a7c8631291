use std::path::PathBuf;

use crate::clock::Clock;
use crate::model::{Project, ProjectId};
use crate::storage::WorkspaceStorage;
use crate::store::WorkspaceStore;

/// Width of the collapsed icon rail.
pub const COLLAPSED_RAIL_WIDTH: f32 = 52.0;

/// Width of the rail expanded to show labels.
pub const EXPANDED_RAIL_WIDTH: f32 = 220.0;

/// One row of the project rail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RailItem {
    pub id: ProjectId,
    pub name: String,
    pub root_path: PathBuf,
    pub initial: String,
    pub is_pinned: bool,
    pub is_selected: bool,
}

impl RailItem {
    fn from_project(project: &Project, selected: Option<ProjectId>) -> Self {
        Self {
            id: project.id(),
            name: project.name().to_string(),
            root_path: project.root_path().to_path_buf(),
            initial: project.initial(),
            is_pinned: project.is_pinned(),
            is_selected: selected == Some(project.id()),
        }
    }
}

impl<S: WorkspaceStorage, C: Clock> WorkspaceStore<S, C> {
    /// Rows for the rail in display order.
    pub fn rail_items(&self) -> Vec<RailItem> {
        let selected = self.selected_id();
        self.sorted_view()
            .iter()
            .map(|project| RailItem::from_project(project, selected))
            .collect()
    }
}
