//! Vehicle setup: rewrites the description of freshly installed vehicles and files them
//! under a vehicle group looked up by name.

use super::{into_result, resolve_vehicle, BatchContext};
use crate::mzone::{VehicleGroup, VehiclePatch};
use common::model::operation::OperationResult;
use common::requests::SetupItem;
use log::warn;

/// `[PLATE - ]MODEL - VIN[ II]`
pub fn build_description(item: &SetupItem) -> String {
    let mut description = format!("{} - {}", item.model.trim(), item.vin.trim());
    if let Some(plate) = item
        .plate
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        description = format!("{} - {}", plate.to_uppercase(), description);
    }
    if item.secondary {
        description.push_str(" II");
    }
    description
}

/// Exact name, then a group whose name contains the target, then a group whose name is
/// contained in the target. Comparisons ignore case and surrounding whitespace.
pub fn resolve_group<'g>(groups: &'g [VehicleGroup], name: &str) -> Option<&'g VehicleGroup> {
    let target = name.trim().to_lowercase();
    if target.is_empty() {
        return None;
    }
    let named: Vec<(String, &VehicleGroup)> = groups
        .iter()
        .map(|g| (g.description.trim().to_lowercase(), g))
        .filter(|(n, _)| !n.is_empty())
        .collect();

    named
        .iter()
        .find(|(n, _)| *n == target)
        .or_else(|| named.iter().find(|(n, _)| n.contains(&target)))
        .or_else(|| named.iter().find(|(n, _)| target.contains(n.as_str())))
        .map(|(_, g)| *g)
}

pub async fn setup_vehicles(ctx: &BatchContext<'_>, items: &[SetupItem]) -> Vec<OperationResult> {
    let groups = if items.iter().any(|i| i.vehicle_group.is_some()) {
        match ctx.vendor.list_vehicle_groups(ctx.token).await {
            Ok(groups) => groups,
            Err(e) => {
                warn!("setup: could not list vehicle groups, continuing without: {}", e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };
    let groups = &groups;

    ctx.runner
        .run(
            "setup",
            items.to_vec(),
            |_, item| async move {
                let identifier = item.vin.trim().to_string();
                let outcome = setup_one(ctx, groups, &item).await;
                into_result(identifier, outcome)
            },
            ctx.progress,
        )
        .await
}

async fn setup_one(
    ctx: &BatchContext<'_>,
    groups: &[VehicleGroup],
    item: &SetupItem,
) -> Result<Option<String>, String> {
    let vehicle = resolve_vehicle(ctx.vendor, ctx.token, item.vin.trim()).await?;
    let description = build_description(item);
    let group = item
        .vehicle_group
        .as_deref()
        .and_then(|name| resolve_group(groups, name));

    let patch = VehiclePatch {
        description: Some(description.clone()),
        vehicle_group_ids: group.map(|g| vec![g.id.clone()]),
    };
    ctx.vendor
        .patch_vehicle(ctx.token, &vehicle.id, &patch)
        .await
        .map_err(|e| e.to_string())?;

    Ok(Some(description))
}
