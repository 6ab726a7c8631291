use std::io::{self, Write};

use otty_workspace::{Clock, Project, WorkspaceStorage, WorkspaceStore};

/// Print one line per rail row: selection marker, pin marker, initial,
/// name, path and id.
pub(crate) fn write_rail<S, C>(
    out: &mut impl Write,
    store: &WorkspaceStore<S, C>,
) -> anyhow::Result<()>
where
    S: WorkspaceStorage,
    C: Clock,
{
    if store.is_empty() {
        writeln!(out, "no projects yet, add one with `otty-rail add <PATH>`")?;
        return Ok(());
    }

    for item in store.rail_items() {
        let selected = if item.is_selected { '*' } else { ' ' };
        let pinned = if item.is_pinned { "pin" } else { "   " };
        writeln!(
            out,
            "{selected} {pinned} [{}] {:<24} {}  {}",
            item.initial,
            item.name,
            item.root_path.display(),
            item.id
        )?;
    }
    Ok(())
}

pub(crate) fn write_detail(
    out: &mut impl Write,
    project: Option<&Project>,
) -> anyhow::Result<()> {
    let Some(project) = project else {
        writeln!(out, "no project selected")?;
        return Ok(());
    };

    write_field(out, "name", project.name())?;
    write_field(out, "path", &project.root_path().display().to_string())?;
    let pinned = if project.is_pinned() { "yes" } else { "no" };
    write_field(out, "pinned", pinned)?;
    write_field(out, "opened", &project.last_opened_at().to_rfc3339())?;
    write_field(out, "id", &project.id().to_string())?;
    Ok(())
}

fn write_field(
    out: &mut impl Write,
    label: &str,
    value: &str,
) -> io::Result<()> {
    writeln!(out, "{label:>8}: {value}")
}

#[cfg(test)]
mod tests {
    use otty_workspace::{MemoryStorage, WorkspaceStore};

    use super::{write_detail, write_rail};

    #[test]
    fn given_store_when_rail_written_then_selected_row_is_marked() {
        let mut store = WorkspaceStore::new(MemoryStorage::new());
        store.add("/Users/a/proj1").unwrap();
        store.add("/Users/a/proj2").unwrap();
        let mut out = Vec::new();

        write_rail(&mut out, &store).expect("rail should render");

        let rendered = String::from_utf8(out).expect("output is utf-8");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  pin [P] proj1"));
        assert!(lines[1].starts_with("* pin [P] proj2"));
    }

    #[test]
    fn given_no_selection_when_detail_written_then_placeholder_is_printed() {
        let mut out = Vec::new();

        write_detail(&mut out, None).expect("detail should render");

        assert_eq!(
            String::from_utf8(out).expect("output is utf-8"),
            "no project selected\n"
        );
    }
}
