use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::path::{normalize_path, project_name_for};

/// Stable identifier of a project, the only cross-reference key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

impl From<Uuid> for ProjectId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// A directory the user pinned or recently opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    id: ProjectId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    root_path: PathBuf,
    #[serde(default)]
    is_pinned: bool,
    #[serde(default = "unix_epoch", with = "iso8601")]
    last_opened_at: DateTime<Utc>,
}

impl Project {
    pub(crate) fn new(
        id: ProjectId,
        root_path: PathBuf,
        is_pinned: bool,
        last_opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: project_name_for(&root_path),
            root_path,
            is_pinned,
            last_opened_at,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    pub fn last_opened_at(&self) -> DateTime<Utc> {
        self.last_opened_at
    }

    /// Uppercased first letter of the name, used as the rail fallback icon.
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_default()
    }

    pub(crate) fn set_pinned(&mut self, pinned: bool) {
        self.is_pinned = pinned;
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_opened_at = now;
    }
}

/// Everything persisted in `workspace.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFile {
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl WorkspaceFile {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Repair a freshly decoded file so the store invariants hold: records
    /// without a path are dropped, paths are normalized, missing names are
    /// derived from the path. Duplicate ids and duplicate normalized roots
    /// keep only the first record.
    pub(crate) fn sanitized(self) -> Self {
        let mut seen = HashSet::new();
        let mut roots = HashSet::new();
        let mut projects = Vec::with_capacity(self.projects.len());

        for mut project in self.projects {
            if project.root_path.as_os_str().is_empty() {
                log::warn!(
                    "dropping workspace project {} without a path",
                    project.id
                );
                continue;
            }
            if !seen.insert(project.id) {
                log::warn!(
                    "dropping workspace project with duplicate id {}",
                    project.id
                );
                continue;
            }

            project.root_path = normalize_path(&project.root_path);
            if !roots.insert(project.root_path.clone()) {
                log::warn!(
                    "dropping workspace project {} with duplicate root {}",
                    project.id,
                    project.root_path.display()
                );
                continue;
            }
            if project.name.trim().is_empty() {
                project.name = project_name_for(&project.root_path);
            }
            projects.push(project);
        }

        Self { projects }
    }
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// ISO-8601 timestamps with a `Z` suffix. Fractional seconds are written
/// only when present, so whole-second values keep the short form.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub(super) fn serialize<S>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let raw = value.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        serializer.serialize_str(&raw)
    }

    pub(super) fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{Duration, TimeZone, Utc};

    use super::{Project, ProjectId, WorkspaceFile};

    #[test]
    fn given_project_when_serialized_then_fields_use_camel_case_and_iso_dates()
    {
        let opened = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let project = Project::new(
            ProjectId::new(),
            PathBuf::from("/Users/a/proj1"),
            true,
            opened,
        );

        let value = serde_json::to_value(&project).expect("should serialize");

        assert_eq!(value["name"], "proj1");
        assert_eq!(value["rootPath"], "/Users/a/proj1");
        assert_eq!(value["isPinned"], true);
        assert_eq!(value["lastOpenedAt"], "2024-03-01T09:30:00Z");
        assert_eq!(value["id"], project.id().to_string());
    }

    #[test]
    fn given_record_with_missing_fields_when_deserialized_then_defaults_apply()
    {
        let json = serde_json::json!({
            "projects": [
                { "rootPath": "/Users/a/proj1", "color": "red" }
            ]
        });

        let file: WorkspaceFile =
            serde_json::from_value(json).expect("should deserialize");
        let file = file.sanitized();

        let project = &file.projects[0];
        assert_eq!(project.name(), "proj1");
        assert!(!project.is_pinned());
        assert_eq!(project.last_opened_at().timestamp(), 0);
    }

    #[test]
    fn given_duplicate_ids_when_sanitized_then_first_record_wins() {
        let id = ProjectId::new().to_string();
        let json = serde_json::json!({
            "projects": [
                { "id": id, "name": "first", "rootPath": "/a/first" },
                { "id": id, "name": "second", "rootPath": "/a/second" },
                { "name": "orphan" }
            ]
        });

        let file: WorkspaceFile =
            serde_json::from_value(json).expect("should deserialize");
        let file = file.sanitized();

        assert_eq!(file.projects.len(), 1);
        assert_eq!(file.projects[0].name(), "first");
    }

    #[test]
    fn given_subsecond_timestamp_when_round_tripped_then_instant_is_kept() {
        let opened = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
            + Duration::nanoseconds(242_942_099);
        let project = Project::new(
            ProjectId::new(),
            PathBuf::from("/Users/a/proj1"),
            false,
            opened,
        );

        let value = serde_json::to_value(&project).expect("should serialize");
        let decoded: Project =
            serde_json::from_value(value.clone()).expect("should decode");

        assert_eq!(value["lastOpenedAt"], "2024-03-01T09:30:00.242942099Z");
        assert_eq!(decoded, project);
    }

    #[test]
    fn given_roots_equal_after_normalizing_when_sanitized_then_first_wins() {
        let json = serde_json::json!({
            "projects": [
                { "name": "first", "rootPath": "/x/proj" },
                { "name": "second", "rootPath": "/x/proj/" },
                { "name": "third", "rootPath": "/x/./other/../proj" },
                { "name": "other", "rootPath": "/x/other" }
            ]
        });

        let file: WorkspaceFile =
            serde_json::from_value(json).expect("should deserialize");
        let file = file.sanitized();

        let names: Vec<&str> =
            file.projects.iter().map(Project::name).collect();
        assert_eq!(names, vec!["first", "other"]);
    }

    #[test]
    fn given_uppercase_id_when_parsed_then_id_is_accepted() {
        let parsed: ProjectId = "E621E1F8-C36C-495A-93FC-0C247A3E6E5F"
            .parse()
            .expect("uppercase uuid should parse");

        assert_eq!(
            parsed.to_string(),
            "e621e1f8-c36c-495a-93fc-0c247a3e6e5f"
        );
    }

    #[test]
    fn given_name_when_initial_requested_then_first_letter_is_uppercased() {
        let project = Project::new(
            ProjectId::new(),
            PathBuf::from("/Users/a/ghostties"),
            false,
            Utc::now(),
        );

        assert_eq!(project.initial(), "G");
    }
}
