use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::Result;
use crate::model::WorkspaceFile;

/// Gateway between the store and wherever its state lives.
///
/// Both calls are best-effort: failures are handled inside the gateway and
/// never reach the store, whose in-memory list stays authoritative.
pub trait WorkspaceStorage {
    /// Read the persisted state, or an empty one when nothing usable exists.
    fn load(&self) -> WorkspaceFile;

    /// Persist the full state.
    fn save(&self, file: &WorkspaceFile);
}

impl<T: WorkspaceStorage + ?Sized> WorkspaceStorage for Box<T> {
    fn load(&self) -> WorkspaceFile {
        (**self).load()
    }

    fn save(&self, file: &WorkspaceFile) {
        (**self).save(file)
    }
}

/// Status describing how the workspace file was loaded from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceLoadStatus {
    Loaded,
    Missing,
    Invalid(String),
}

/// Result of loading the workspace file from disk.
#[derive(Debug, Clone)]
pub struct WorkspaceLoad {
    file: WorkspaceFile,
    status: WorkspaceLoadStatus,
}

impl WorkspaceLoad {
    pub fn new(file: WorkspaceFile, status: WorkspaceLoadStatus) -> Self {
        Self { file, status }
    }

    pub fn status(&self) -> &WorkspaceLoadStatus {
        &self.status
    }

    /// Consume the value and return both payload and status.
    pub fn into_parts(self) -> (WorkspaceFile, WorkspaceLoadStatus) {
        (self.file, self.status)
    }
}

/// Read the workspace file at `path`.
///
/// A missing file and a file that does not decode are both reported through
/// [`WorkspaceLoadStatus`] with an empty payload; only IO failures other than
/// "not found" surface as errors.
pub fn load_from_path(path: &Path) -> Result<WorkspaceLoad> {
    let data = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(WorkspaceLoad::new(
                WorkspaceFile::empty(),
                WorkspaceLoadStatus::Missing,
            ));
        },
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_str::<WorkspaceFile>(&data) {
        Ok(file) => Ok(WorkspaceLoad::new(file, WorkspaceLoadStatus::Loaded)),
        Err(err) => Ok(WorkspaceLoad::new(
            WorkspaceFile::empty(),
            WorkspaceLoadStatus::Invalid(format!("{err}")),
        )),
    }
}

/// Write `file` to `path` as pretty-printed JSON with sorted keys.
///
/// Parent directories are created owner-only and the payload replaces the
/// previous file atomically.
pub fn save_to_path(path: &Path, file: &WorkspaceFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_private_dir(dir)?;
    }

    // `serde_json::Map` keeps keys ordered, so routing through `Value`
    // yields sorted output.
    let value = serde_json::to_value(file)?;
    let mut payload = serde_json::to_string_pretty(&value)?;
    payload.push('\n');
    write_atomic(path, payload.as_bytes())?;

    Ok(())
}

fn create_private_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

fn write_atomic(path: &Path, payload: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let result = write_private_file(&tmp_path, payload)
        .and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_private_file(path: &Path, payload: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(payload)?;
    file.sync_all()
}

/// Workspace state kept in a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkspaceStorage for JsonFileStorage {
    fn load(&self) -> WorkspaceFile {
        match load_from_path(&self.path) {
            Ok(load) => {
                let (file, status) = load.into_parts();
                match status {
                    WorkspaceLoadStatus::Loaded => {},
                    WorkspaceLoadStatus::Missing => log::debug!(
                        "workspace file {} not found, starting empty",
                        self.path.display()
                    ),
                    WorkspaceLoadStatus::Invalid(message) => log::error!(
                        "failed to parse workspace file {}: {message}",
                        self.path.display()
                    ),
                }
                file
            },
            Err(err) => {
                log::error!(
                    "failed to load workspace file {}: {err}",
                    self.path.display()
                );
                WorkspaceFile::empty()
            },
        }
    }

    fn save(&self, file: &WorkspaceFile) {
        if let Err(err) = save_to_path(&self.path, file) {
            log::error!(
                "failed to save workspace file {}: {err}",
                self.path.display()
            );
        }
    }
}

/// In-memory gateway. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemorySlot>>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    file: Option<WorkspaceFile>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `file` already "on disk".
    pub fn with_file(file: WorkspaceFile) -> Self {
        let storage = Self::default();
        storage.slot().file = Some(file);
        storage
    }

    /// Last saved (or seeded) state.
    pub fn stored(&self) -> Option<WorkspaceFile> {
        self.slot().file.clone()
    }

    /// Number of `save` calls observed so far.
    pub fn save_count(&self) -> usize {
        self.slot().saves
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WorkspaceStorage for MemoryStorage {
    fn load(&self) -> WorkspaceFile {
        self.slot().file.clone().unwrap_or_default()
    }

    fn save(&self, file: &WorkspaceFile) {
        let mut slot = self.slot();
        slot.file = Some(file.clone());
        slot.saves += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{
        JsonFileStorage, WorkspaceLoadStatus, WorkspaceStorage,
        load_from_path, save_to_path,
    };
    use crate::model::WorkspaceFile;

    const SAMPLE: &str = r#"{
  "projects": [
    {
      "id": "E621E1F8-C36C-495A-93FC-0C247A3E6E5F",
      "isPinned": true,
      "lastOpenedAt": "2024-03-01T09:30:00Z",
      "name": "proj1",
      "rootPath": "/Users/a/proj1"
    }
  ]
}"#;

    #[test]
    fn given_missing_file_when_load_then_returns_empty_with_missing_status() {
        let root = test_temp_dir("missing");
        let path = root.join("workspace.json");

        let loaded = load_from_path(&path)
            .expect("missing file should not be an error");
        let (file, status) = loaded.into_parts();

        assert_eq!(status, WorkspaceLoadStatus::Missing);
        assert!(file.projects.is_empty());

        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_invalid_json_when_load_then_returns_empty_with_invalid_status() {
        let root = test_temp_dir("invalid_json");
        let path = root.join("workspace.json");
        fs::write(&path, "{ this is not valid json")
            .expect("invalid test payload should be written");

        let loaded = load_from_path(&path)
            .expect("loading invalid file should not fail with io error");
        let (file, status) = loaded.into_parts();

        assert!(file.projects.is_empty());
        match status {
            WorkspaceLoadStatus::Invalid(message) => {
                assert!(!message.is_empty());
            },
            other => panic!("expected invalid status, got {other:?}"),
        }

        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_schema_mismatch_when_gateway_loads_then_state_is_empty() {
        let root = test_temp_dir("schema_mismatch");
        let path = root.join("workspace.json");
        fs::write(&path, r#"{ "projects": "not a list" }"#)
            .expect("test payload should be written");

        let file = JsonFileStorage::new(&path).load();

        assert!(file.projects.is_empty());

        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_saved_file_when_loaded_then_round_trip_matches() {
        let root = test_temp_dir("round_trip");
        let path = root.join("nested").join("workspace.json");
        let file: WorkspaceFile =
            serde_json::from_str(SAMPLE).expect("sample should decode");

        save_to_path(&path, &file).expect("file should save successfully");
        let loaded =
            load_from_path(&path).expect("file should load successfully");
        let (loaded_file, status) = loaded.into_parts();

        assert_eq!(status, WorkspaceLoadStatus::Loaded);
        assert_eq!(loaded_file, file);
        assert!(!path.with_extension("json.tmp").exists());

        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_saved_file_when_read_back_then_keys_are_sorted_and_pretty() {
        let root = test_temp_dir("sorted_keys");
        let path = root.join("workspace.json");
        let file: WorkspaceFile =
            serde_json::from_str(SAMPLE).expect("sample should decode");

        save_to_path(&path, &file).expect("file should save successfully");
        let written =
            fs::read_to_string(&path).expect("saved file should be readable");

        let keys = ["\"id\"", "\"isPinned\"", "\"lastOpenedAt\"", "\"name\""];
        let offsets: Vec<usize> = keys
            .iter()
            .map(|key| written.find(key).expect("key should be present"))
            .collect();
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(written.contains("\n  \"projects\": ["));
        assert!(written.contains("\"2024-03-01T09:30:00Z\""));

        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[cfg(unix)]
    #[test]
    fn given_missing_parent_when_saved_then_directory_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let root = test_temp_dir("permissions");
        let dir = root.join("otty");
        let path = dir.join("workspace.json");

        save_to_path(&path, &WorkspaceFile::empty())
            .expect("file should save successfully");

        let dir_mode = fs::metadata(&dir)
            .expect("directory should exist")
            .permissions()
            .mode();
        let file_mode = fs::metadata(&path)
            .expect("file should exist")
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);

        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    #[test]
    fn given_unwritable_target_when_gateway_saves_then_error_is_swallowed() {
        let root = test_temp_dir("unwritable");
        let blocker = root.join("blocker");
        fs::write(&blocker, "file in the way")
            .expect("blocker file should be written");
        let storage = JsonFileStorage::new(blocker.join("workspace.json"));

        storage.save(&WorkspaceFile::empty());

        assert!(storage.load().projects.is_empty());

        fs::remove_dir_all(&root)
            .expect("temporary directory should be removed");
    }

    fn test_temp_dir(test_name: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be monotonic")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "otty-workspace-{test_name}-{stamp}-{}",
            std::process::id()
        ));

        fs::create_dir_all(&dir)
            .expect("temporary directory should be created");
        dir
    }
}
