pub mod check;
pub mod create;
pub mod delete;
pub mod done;
pub mod init;
pub mod list;
pub mod renumber;
pub mod reorder;
pub mod show;
pub mod update;

use crate::output::{CliError, OutputMode, render_error};
use anyhow::Context as _;
use ordo_core::api::{Envelope, Handler};
use ordo_core::config::resolve_store_config;
use ordo_core::{Item, ItemStore};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Per-invocation settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub project_root: PathBuf,
    pub db: Option<PathBuf>,
}

impl Context {
    /// Resolve the store config and open the store, reporting failures in
    /// the active output mode.
    pub fn open_store(&self) -> anyhow::Result<ItemStore> {
        let config = resolve_store_config(&self.project_root, self.db.as_deref())?;
        match ItemStore::open(&config) {
            Ok(store) => Ok(store),
            Err(err) => {
                render_error(self.output, &CliError::from(&err))?;
                Err(err).with_context(|| format!("failed to open {}", config.path.display()))
            }
        }
    }

    pub fn handler(&self) -> anyhow::Result<Handler> {
        Ok(Handler::new(self.open_store()?))
    }
}

/// Print a successful response, or render the failure and return it as an
/// error so the process exits non-zero.
///
/// JSON mode prints the whole envelope.
pub fn finish(
    output: OutputMode,
    envelope: &Envelope,
    human_fn: impl FnOnce(&Envelope, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    if envelope.is_success() {
        return crate::output::render(output, envelope, human_fn);
    }
    render_error(output, &CliError::from_envelope(envelope))?;
    anyhow::bail!("{} (status {})", envelope.message, envelope.status)
}

/// One list row: rank, completion box, title, id.
pub fn write_item_row(w: &mut dyn Write, item: &Item) -> io::Result<()> {
    let mark = if item.completed { 'x' } else { ' ' };
    writeln!(
        w,
        "{:>4}  [{mark}] {:<40}  {}",
        item.position, item.title, item.id
    )
}

pub fn write_items(w: &mut dyn Write, items: &[Item]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(w, "no items");
    }
    for item in items {
        write_item_row(w, item)?;
    }
    Ok(())
}

/// Display path relative to the project root when possible.
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
