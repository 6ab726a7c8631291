use std::env;
use std::path::{Component, Path, PathBuf};

/// Return the absolute, lexically cleaned form of `path` used as the
/// duplicate-detection key.
///
/// Relative paths are resolved against the current directory. `.` segments
/// are dropped, `..` pops the previous segment and never climbs above the
/// root. Symlinks are left alone.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(err) => {
                log::warn!(
                    "current directory unavailable, keeping relative path {}: {err}",
                    path.display()
                );
                path.to_path_buf()
            },
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {},
            Component::ParentDir => {
                if normalized.file_name().is_some() {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            },
            Component::Normal(segment) => normalized.push(segment),
        }
    }

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }

    normalized
}

/// Display name for a project rooted at `path`: its last segment, or the
/// whole path when it has none (`/`).
pub fn project_name_for(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}
