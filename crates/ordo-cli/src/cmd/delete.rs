//! `ordo delete`: remove an item and close the gap it leaves.

use super::{Context, finish};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Item ID (36-character UUID).
    pub id: String,
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let handler = ctx.handler()?;
    let response = handler.delete(&args.id);
    finish(ctx.output, &response, |_, w| writeln!(w, "Deleted {}", args.id))
}
