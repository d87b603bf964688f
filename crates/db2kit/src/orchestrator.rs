//! Converge instances to their desired state.
//!
//! One run per instance: resolve the inventory, observe, execute the
//! lifecycle plan, then converge the DBM configuration.

use crate::backend::Host;
use crate::error::{Error, Result};
use crate::inventory::{Inventory, InventoryConfig};
use crate::lifecycle::{self, LifecycleAction};
use crate::reconcile;
use crate::types::{InstanceSpec, ReconcileResult, TargetState};

/// Converge one instance. Any hard failure aborts the run.
///
/// Without `db2ls` the registry cannot be read, so the run refuses to act
/// rather than treat every instance as absent.
pub fn reconcile_instance(
    host: &dyn Host,
    config: &InventoryConfig,
    spec: &InstanceSpec,
) -> Result<ReconcileResult> {
    let mut result = ReconcileResult {
        instance: spec.name.clone(),
        ..Default::default()
    };

    if !host.exists(&config.db2ls_path) {
        return Err(Error::ToolMissing {
            path: config.db2ls_path.clone(),
        });
    }

    let instances = Inventory::new(host, config).list_instances()?;
    let observed = lifecycle::observe(host, &instances, &spec.name)?;
    let actions = lifecycle::plan(spec.state, observed);
    log::debug!(
        "{}: observed {observed}, target {}, {} action(s)",
        spec.name,
        spec.state,
        actions.len()
    );

    for action in actions {
        if let Some(command) = lifecycle::execute_action(host, spec, &instances, action)? {
            result.lifecycle_command = Some(command);
        }
        result.changed = true;
        match action {
            LifecycleAction::Create => result.created = true,
            LifecycleAction::Start => result.started = true,
            LifecycleAction::Drop => result.dropped = true,
        }
    }

    if spec.state == TargetState::Present && !spec.configurations.is_empty() {
        let snapshot = reconcile::read_snapshot(host, &spec.name)?;
        let updates = reconcile::plan_updates(&spec.name, &snapshot, &spec.configurations)?;
        result.config_updates = reconcile::apply_updates(host, &spec.name, &updates)?;
        if !result.config_updates.is_empty() {
            result.changed = true;
        }
    }

    Ok(result)
}

/// Converge several instances in order, stopping at the first failure.
pub fn reconcile_all(
    host: &dyn Host,
    config: &InventoryConfig,
    specs: &[InstanceSpec],
) -> Result<Vec<ReconcileResult>> {
    specs
        .iter()
        .map(|spec| reconcile_instance(host, config, spec))
        .collect()
}
