//! `db2ctl facts`: show what is installed on this host.

use anyhow::{Context as _, Result};
use colored::Colorize;
use db2kit::{FactFilter, Facts};

use crate::Context;
use crate::cli::FactsArgs;
use crate::commands;
use crate::config;
use crate::progress;
use crate::sudo::SudoContext;
use crate::ui;

pub fn run(ctx: &Context, args: FactsArgs) -> Result<()> {
    let filter: Vec<FactFilter> = args.filter.into_iter().map(Into::into).collect();
    let client = commands::client(config::inventory_config(ctx.db2ls.as_deref(), None));

    let wants_databases = filter.is_empty() || filter.contains(&FactFilter::Databases);
    let _sudo = if wants_databases && !client.host().is_root() {
        let instances = client.list_instances()?;
        SudoContext::for_owners(&client, instances.keys().map(String::as_str))?
    } else {
        None
    };

    let pb = progress::spinner("Gathering Db2 facts...", ctx.quiet || args.json);
    let facts = client.facts(&filter);
    progress::finish_clear(&pb);
    let facts = facts?;

    if args.json {
        let json = serde_json::to_string_pretty(&facts).context("Failed to serialize facts")?;
        println!("{json}");
        return Ok(());
    }

    print_facts(&facts);
    Ok(())
}

fn print_facts(facts: &Facts) {
    ui::header("Db2 Facts");

    if let Some(software) = &facts.software {
        ui::section(&format!("Software ({})", software.len()));
        if software.is_empty() {
            ui::dim("no installations found");
        }
        for (path, info) in software {
            println!("  {} {}", path.bold(), info.vrmf.green());
            ui::kv("fix pack", info.fixpack.trim());
            ui::kv("special", info.special.trim());
        }
    }

    if let Some(instances) = &facts.instances {
        ui::section(&format!("Instances ({})", instances.len()));
        if instances.is_empty() {
            ui::dim("no instances found");
        }
        for (name, info) in instances {
            ui::kv(name, &info.path);
        }
    }

    if let Some(databases) = &facts.databases {
        ui::section(&format!("Databases ({})", databases.len()));
        if databases.is_empty() {
            ui::dim("no local databases found");
        }
        for db in databases.values() {
            println!(
                "  {} {} {}",
                db.database_name.bold(),
                format!("(alias {})", db.database_alias).dimmed(),
                format!("on {}", db.instance_name).cyan()
            );
        }
    }
}
