//! Project store behind the OTTY workspace rail.
//!
//! The rail lists the directories a user works in: pinned projects first,
//! then recently opened ones. This crate owns that list and its persistence;
//! rendering is left to the front-end.
//!
//! The main entry points are:
//! - [`WorkspaceStore`], which owns the project list, applies `add`,
//!   `remove`, `toggle_pin` and `select`, derives the display order with
//!   [`WorkspaceStore::sorted_view`] and writes every change through a
//!   [`WorkspaceStorage`] gateway.
//! - [`JsonFileStorage`], the on-disk gateway for `workspace.json`, and
//!   [`BackgroundStorage`], which moves its writes to a worker thread.
//! - [`SharedWorkspaceStore`], a cloneable handle when several windows
//!   drive the same store.
//!
//! Front-ends usually:
//! 1. Build a [`WorkspaceConfig`] (or use [`WorkspaceConfig::from_env`]).
//! 2. Open the store with [`WorkspaceStore::open`] once at startup.
//! 3. Render [`WorkspaceStore::rail_items`] and react to
//!    [`WorkspaceEvent`]s from [`WorkspaceStore::subscribe`].

mod background;
mod clock;
mod config;
mod errors;
mod event;
mod model;
mod path;
mod rail;
mod shared;
mod storage;
mod store;

pub use background::BackgroundStorage;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    DEFAULT_MAX_RECENTS, WORKSPACE_FILE_ENV, WorkspaceConfig,
    default_workspace_path,
};
pub use errors::{Result, WorkspaceError};
pub use event::{
    EventRecvError, EventTryRecvError, WorkspaceEvent, WorkspaceEvents,
};
pub use model::{Project, ProjectId, WorkspaceFile};
pub use path::{normalize_path, project_name_for};
pub use rail::{COLLAPSED_RAIL_WIDTH, EXPANDED_RAIL_WIDTH, RailItem};
pub use shared::SharedWorkspaceStore;
pub use storage::{
    JsonFileStorage, MemoryStorage, WorkspaceLoad, WorkspaceLoadStatus,
    WorkspaceStorage, load_from_path, save_to_path,
};
pub use store::{WorkspaceStore, WorkspaceStoreBuilder};
