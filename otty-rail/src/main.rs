mod cli;
mod render;

use std::io::{self, Write};

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;
use otty_workspace::{
    JsonFileStorage, ProjectId, WorkspaceConfig, WorkspaceStore,
    normalize_path,
};

use crate::cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    log::debug!("workspace file: {}", config.storage_path.display());

    let mut store = WorkspaceStore::open(&config);
    let mut out = io::stdout().lock();
    run(&mut store, cli.command.unwrap_or_default(), &mut out)?;
    out.flush()?;
    Ok(())
}

fn run(
    store: &mut WorkspaceStore<JsonFileStorage>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::List => {},
        Command::Add { path } => {
            let path = normalize_path(&path);
            if !path.is_dir() {
                bail!("{} is not a directory", path.display());
            }
            store.add(&path)?;
        },
        Command::Remove { id } => {
            let id = parse_id(&id)?;
            if !store.remove(id) {
                log::warn!("no project with id {id}");
            }
        },
        Command::Pin { id } => {
            let id = parse_id(&id)?;
            if store.toggle_pin(id).is_none() {
                log::warn!("no project with id {id}");
            }
        },
        Command::Select { id } => {
            let id = parse_id(&id)?;
            if !store.select(id) {
                log::warn!("no project with id {id}");
            }
        },
        Command::Show => {
            return render::write_detail(out, store.selected_project());
        },
    }

    render::write_rail(out, store)
}

fn parse_id(raw: &str) -> anyhow::Result<ProjectId> {
    raw.parse()
        .with_context(|| format!("invalid project id {raw:?}"))
}

impl Cli {
    fn config(&self) -> WorkspaceConfig {
        let mut config = WorkspaceConfig::from_env();
        if let Some(path) = &self.file {
            config = config.with_storage_path(path);
        }
        if let Some(max_recents) = self.max_recents {
            config = config.with_max_recents(max_recents);
        }
        config
    }
}
