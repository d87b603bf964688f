//! `db2ctl instance`: converge one instance from command-line arguments.

use anyhow::{Context as _, Result};
use db2kit::{ConfigParameter, InstanceSpec};

use crate::Context;
use crate::cli::InstanceArgs;
use crate::commands;
use crate::config;
use crate::progress;
use crate::sudo::SudoContext;
use crate::ui;

pub fn run(ctx: &Context, args: InstanceArgs) -> Result<()> {
    let json = args.json;
    let spec = spec_from_args(args);
    let client = commands::client(config::inventory_config(ctx.db2ls.as_deref(), None));

    let _sudo = SudoContext::for_lifecycle(&client, [spec.name.as_str()])?;

    let pb = progress::spinner(
        &format!("Converging instance {} ({})...", spec.name, spec.state),
        ctx.quiet || json,
    );
    let result = client.reconcile(&spec);
    progress::finish_clear(&pb);
    let result = result?;

    if json {
        let out = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{out}");
    } else {
        ui::reconcile_result(&result);
    }
    Ok(())
}

/// Build the desired state from command-line arguments.
///
/// Fixed-value parameters come first, automatic ones after, each in the
/// order given.
pub(crate) fn spec_from_args(args: InstanceArgs) -> InstanceSpec {
    let mut spec = InstanceSpec::new(args.name).with_state(args.state.into());
    spec.path = args.path;
    spec.port = args.port;
    spec.instance_type = args.instance_type;
    spec.auth_type = args.auth_type;

    spec.configurations.extend(
        args.set
            .into_iter()
            .map(|(name, value)| ConfigParameter::new(name, value)),
    );
    spec.configurations.extend(
        args.set_auto
            .into_iter()
            .map(|(name, value)| ConfigParameter::automatic(name, value)),
    );
    spec
}
