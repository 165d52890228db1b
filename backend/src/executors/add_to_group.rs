use super::{into_result, resolve_vehicle, BatchContext};
use common::model::operation::OperationResult;

/// Adds each vehicle (VIN or description) to `group_id`, one vendor call per vehicle.
pub async fn add_vehicles_to_group(
    ctx: &BatchContext<'_>,
    group_id: &str,
    identifiers: &[String],
) -> Vec<OperationResult> {
    ctx.runner
        .run(
            "add-to-group",
            identifiers.to_vec(),
            |_, identifier| async move {
                let outcome = async {
                    let vehicle = resolve_vehicle(ctx.vendor, ctx.token, &identifier).await?;
                    ctx.vendor
                        .add_vehicles_to_group(ctx.token, group_id, &[vehicle.id.clone()])
                        .await
                        .map_err(|e| e.to_string())?;
                    Ok::<_, String>(Some(vehicle.id))
                }
                .await;
                into_result(identifier, outcome)
            },
            ctx.progress,
        )
        .await
}
