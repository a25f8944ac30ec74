//! `ordo check`: verify positions are exactly `0..N`.

use super::Context;
use crate::output::{CliError, kv, render, render_error};
use clap::Args;
use std::io::Write;

#[derive(Args, Debug, Default)]
pub struct CheckArgs {}

fn join(ranks: &[u32]) -> String {
    ranks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn run_check(_args: &CheckArgs, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let report = match store.check_density() {
        Ok(report) => report,
        Err(err) => {
            render_error(ctx.output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    render(ctx.output, &report, |r, w| {
        if r.is_dense() {
            return writeln!(w, "ok: {} items, positions dense", r.len);
        }
        writeln!(w, "positions are not dense ({} items)", r.len)?;
        if !r.duplicates.is_empty() {
            kv(w, "duplicates", join(&r.duplicates))?;
        }
        if !r.gaps.is_empty() {
            kv(w, "gaps", join(&r.gaps))?;
        }
        writeln!(w, "run `ordo renumber` to repair")
    })?;

    if !report.is_dense() {
        tracing::warn!(
            duplicates = report.duplicates.len(),
            gaps = report.gaps.len(),
            "density check failed"
        );
        anyhow::bail!("positions are not dense");
    }
    Ok(())
}
