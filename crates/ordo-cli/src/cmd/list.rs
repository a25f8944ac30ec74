//! `ordo list`: all items in rank order.

use super::{Context, finish, write_items};
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct ListArgs {}

pub fn run_list(_args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let handler = ctx.handler()?;
    let response = handler.list();
    finish(ctx.output, &response, |r, w| write_items(w, r.items().unwrap_or_default()))
}
