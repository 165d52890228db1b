use super::{into_result, resolve_vehicle, BatchContext};
use common::model::operation::OperationResult;

/// Shares each vehicle with the user group `share_group_id`.
pub async fn share_vehicles(
    ctx: &BatchContext<'_>,
    share_group_id: &str,
    identifiers: &[String],
) -> Vec<OperationResult> {
    ctx.runner
        .run(
            "share",
            identifiers.to_vec(),
            |_, identifier| async move {
                let outcome = async {
                    let vehicle = resolve_vehicle(ctx.vendor, ctx.token, &identifier).await?;
                    ctx.vendor
                        .share_vehicle(ctx.token, &vehicle.id, share_group_id)
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
