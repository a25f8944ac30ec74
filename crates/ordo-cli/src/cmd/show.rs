//! `ordo show`: full details for one item.

use super::{Context, finish};
use crate::output::{kv, rule};
use clap::Args;
use ordo_core::Item;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Item ID (36-character UUID).
    pub id: String,
}

pub fn write_item_detail(w: &mut dyn Write, item: &Item) -> io::Result<()> {
    writeln!(w, "{}", item.title)?;
    rule(w)?;
    kv(w, "id", item.id.as_str())?;
    kv(w, "position", item.position.to_string())?;
    kv(w, "completed", if item.completed { "yes" } else { "no" })?;
    if let Some(description) = &item.description {
        kv(w, "description", description)?;
    }
    Ok(())
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let handler = ctx.handler()?;
    let response = handler.fetch(&args.id);
    finish(ctx.output, &response, |r, w| match r.item() {
        Some(item) => write_item_detail(w, item),
        None => Ok(()),
    })
}
