//! `ordo create`: append a new item at the end of the list.

use super::show::write_item_detail;
use super::{Context, finish};
use clap::Args;
use ordo_core::api::validate::CreateItem;
use std::io::Write;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Item title (required, at most 255 characters).
    #[arg(short, long)]
    pub title: String,

    /// Optional longer description.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Create the item already completed.
    #[arg(long)]
    pub completed: bool,
}

impl CreateArgs {
    fn to_body(&self) -> CreateItem {
        CreateItem {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            completed: Some(self.completed),
        }
    }
}

pub fn run_create(args: &CreateArgs, ctx: &Context) -> anyhow::Result<()> {
    let handler = ctx.handler()?;
    let response = handler.create(args.to_body());
    finish(ctx.output, &response, |r, w| match r.item() {
        Some(item) => {
            writeln!(w, "Created {} at position {}", item.id, item.position)?;
            write_item_detail(w, item)
        }
        None => Ok(()),
    })
}
