//! `ordo init`: create the project config and an empty store.

use super::{Context, display_path};
use crate::output::{kv, render};
use clap::Args;
use ordo_core::config::init_project_config;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub struct InitArgs {}

#[derive(Debug, Serialize)]
struct InitReport {
    config_created: bool,
    db: String,
    items: usize,
}

pub fn run_init(_args: &InitArgs, ctx: &Context) -> anyhow::Result<()> {
    let config_created = init_project_config(&ctx.project_root)?;
    let store = ctx.open_store()?;
    let report = InitReport {
        config_created,
        db: display_path(&ctx.project_root, store.path()),
        items: store.len()?,
    };
    tracing::info!(db = %report.db, config_created, "initialized project");

    render(ctx.output, &report, |r, w| {
        if r.config_created {
            writeln!(w, "Initialized ordo project")?;
        } else {
            writeln!(w, "ordo project already initialized")?;
        }
        kv(w, "database", &r.db)?;
        kv(w, "items", r.items.to_string())
    })
}
