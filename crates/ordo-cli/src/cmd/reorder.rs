//! `ordo reorder`: move an item to a zero-based rank.

use super::{Context, finish, write_items};
use clap::Args;
use ordo_core::api::validate::ReorderItem;

#[derive(Args, Debug)]
pub struct ReorderArgs {
    /// Item ID (36-character UUID).
    pub id: String,

    /// Target rank, `0` for the front.
    #[arg(allow_negative_numbers = true)]
    pub position: i64,
}

pub fn run_reorder(args: &ReorderArgs, ctx: &Context) -> anyhow::Result<()> {
    let handler = ctx.handler()?;
    let body = ReorderItem {
        position: Some(args.position),
    };
    let response = handler.reorder(&args.id, &body);
    finish(ctx.output, &response, |r, w| write_items(w, r.items().unwrap_or_default()))
}
