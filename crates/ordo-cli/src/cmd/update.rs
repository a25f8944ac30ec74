//! `ordo update`: edit an item's content. Rank is left alone.

use super::show::write_item_detail;
use super::{Context, finish};
use clap::Args;
use ordo_core::ItemPatch;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Item ID (36-character UUID).
    pub id: String,

    /// New title.
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description.
    #[arg(short, long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description.
    #[arg(long)]
    pub clear_description: bool,

    /// Set completion explicitly (`true` or `false`).
    #[arg(long)]
    pub completed: Option<bool>,
}

impl UpdateArgs {
    /// Only the flags that were given; the store keeps everything else.
    fn to_patch(&self) -> ItemPatch {
        let description = if self.clear_description {
            Some(None)
        } else {
            self.description.clone().map(Some)
        };
        ItemPatch {
            title: self.title.clone(),
            description,
            completed: self.completed,
        }
    }
}

pub fn run_update(args: &UpdateArgs, ctx: &Context) -> anyhow::Result<()> {
    let handler = ctx.handler()?;
    let response = handler.patch(&args.id, args.to_patch());
    finish(ctx.output, &response, |r, w| match r.item() {
        Some(item) => write_item_detail(w, item),
        None => Ok(()),
    })
}
