//! `ordo done` and `ordo undone`: toggle completion.

use super::show::write_item_detail;
use super::{Context, finish};
use clap::Args;
use ordo_core::ItemPatch;

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Item ID (36-character UUID).
    pub id: String,
}

/// Shared by `done` and `undone`. Only the completion flag is written.
pub fn run_set_completed(args: &DoneArgs, completed: bool, ctx: &Context) -> anyhow::Result<()> {
    let handler = ctx.handler()?;
    let response = handler.patch(&args.id, ItemPatch::completed(completed));
    finish(ctx.output, &response, |r, w| match r.item() {
        Some(item) => write_item_detail(w, item),
        None => Ok(()),
    })
}

pub fn run_done(args: &DoneArgs, ctx: &Context) -> anyhow::Result<()> {
    run_set_completed(args, true, ctx)
}

pub fn run_undone(args: &DoneArgs, ctx: &Context) -> anyhow::Result<()> {
    run_set_completed(args, false, ctx)
}
