//! `ordo renumber`: rewrite positions to `0..N`, keeping the current order.

use super::Context;
use crate::output::{CliError, render, render_error};
use clap::Args;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub struct RenumberArgs {}

#[derive(Debug, Serialize)]
struct RenumberReport {
    changed: usize,
    items: usize,
}

pub fn run_renumber(_args: &RenumberArgs, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let outcome = store
        .renumber()
        .and_then(|changed| Ok(RenumberReport { changed, items: store.len()? }));
    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            render_error(ctx.output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    render(ctx.output, &report, |r, w| {
        if r.changed == 0 {
            writeln!(w, "positions already dense ({} items)", r.items)
        } else {
            writeln!(w, "renumbered {} of {} items", r.changed, r.items)
        }
    })
}
