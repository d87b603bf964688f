//! `db2ctl apply`: converge every instance of the desired-state file.

use anyhow::{Context as _, Result};
use colored::Colorize;

use crate::Context;
use crate::cli::ApplyArgs;
use crate::commands;
use crate::config::{self, DesiredState};
use crate::progress;
use crate::sudo::SudoContext;
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let (path, desired) = DesiredState::load_from(args.file.as_deref())?;
    let specs = desired.select(args.only.as_deref())?;
    log::info!("{} instance(s) declared in {}", specs.len(), path.display());

    if specs.is_empty() {
        if args.json {
            println!("[]");
        } else {
            ui::warn(&format!("No instances declared in {}", path.display()));
        }
        return Ok(());
    }

    let client = commands::client(config::inventory_config(
        ctx.db2ls.as_deref(),
        Some(&desired.settings),
    ));
    let _sudo = SudoContext::for_lifecycle(&client, specs.iter().map(|s| s.name.as_str()))?;

    let pb = progress::spinner(
        &format!("Converging {} instance(s)...", specs.len()),
        ctx.quiet || args.json,
    );
    let results = client.reconcile_all(&specs);
    let results = match results {
        Ok(results) => {
            let changed = results.iter().filter(|r| r.changed).count();
            progress::finish_success(
                &pb,
                &format!("{} instance(s) converged, {} changed", results.len(), changed),
            );
            results
        }
        Err(e) => {
            progress::finish_clear(&pb);
            return Err(e).with_context(|| format!("Failed to apply {}", path.display()));
        }
    };

    if args.json {
        let out =
            serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
        println!("{out}");
        return Ok(());
    }

    ui::header(&format!("Applied {}", path.display().to_string().bold()));
    for result in &results {
        println!();
        ui::reconcile_result(result);
    }
    Ok(())
}
