//! Deinstallation: marks a vehicle as removed and takes it out of circulation.
//!
//! Per vehicle, in order:
//! 1. prefix the description with [`REMOVED_PREFIX`] unless it already carries it;
//! 2. optionally drop every group membership (one read, one remove-all call);
//! 3. optionally add it to the designated "removed" group.
//!
//! The first failing step ends that vehicle's sequence and becomes its error. The other
//! vehicles are unaffected.

use super::{into_result, resolve_vehicle, BatchContext};
use crate::mzone::VehiclePatch;
use common::model::operation::OperationResult;

pub const REMOVED_PREFIX: &str = "REMOVIDO - ";

#[derive(Debug, Clone, Default)]
pub struct RemovalOptions {
    pub strip_groups: bool,
    pub removed_group_id: Option<String>,
}

/// Idempotent: an already-marked description comes back unchanged.
pub fn mark_removed(description: &str) -> String {
    if description.starts_with(REMOVED_PREFIX) {
        description.to_string()
    } else {
        format!("{}{}", REMOVED_PREFIX, description)
    }
}

pub async fn remove_vehicles(
    ctx: &BatchContext<'_>,
    options: &RemovalOptions,
    identifiers: &[String],
) -> Vec<OperationResult> {
    ctx.runner
        .run(
            "removal",
            identifiers.to_vec(),
            |_, identifier| async move {
                let outcome = remove_one(ctx, options, &identifier).await;
                into_result(identifier, outcome)
            },
            ctx.progress,
        )
        .await
}

async fn remove_one(
    ctx: &BatchContext<'_>,
    options: &RemovalOptions,
    identifier: &str,
) -> Result<Option<String>, String> {
    let vehicle = resolve_vehicle(ctx.vendor, ctx.token, identifier).await?;

    let current = vehicle.description.clone().unwrap_or_default();
    let marked = mark_removed(&current);
    if marked != current {
        let patch = VehiclePatch {
            description: Some(marked.clone()),
            ..VehiclePatch::default()
        };
        ctx.vendor
            .patch_vehicle(ctx.token, &vehicle.id, &patch)
            .await
            .map_err(|e| format!("Falha ao renomear veículo: {}", e))?;
    }

    if options.strip_groups {
        let groups = ctx
            .vendor
            .vehicle_group_ids(ctx.token, &vehicle.id)
            .await
            .map_err(|e| format!("Falha ao consultar grupos: {}", e))?;
        if !groups.is_empty() {
            ctx.vendor
                .remove_vehicle_groups(ctx.token, &vehicle.id, &groups)
                .await
                .map_err(|e| format!("Falha ao remover dos grupos: {}", e))?;
        }
    }

    if let Some(group_id) = options.removed_group_id.as_deref() {
        ctx.vendor
            .add_vehicles_to_group(ctx.token, group_id, &[vehicle.id.clone()])
            .await
            .map_err(|e| format!("Falha ao adicionar ao grupo de removidos: {}", e))?;
    }

    Ok(Some(marked))
}
