use super::{into_result, BatchContext};
use crate::mzone::NewDriver;
use common::model::operation::OperationResult;
use common::requests::DriverItem;

/// Base of the synthesized driver key used when a row carries no usable code.
const FALLBACK_KEY_BASE: u64 = 1000;

/// Splits at the first whitespace. A missing surname becomes a single space, which the
/// vendor accepts where it rejects an empty string.
pub fn split_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) if !rest.trim().is_empty() => {
            (first.to_string(), rest.trim().to_string())
        }
        Some((first, _)) => (first.to_string(), " ".to_string()),
        None => (trimmed.to_string(), " ".to_string()),
    }
}

pub fn driver_key(code: Option<&str>, index: usize) -> u64 {
    code.and_then(|c| c.trim().parse::<u64>().ok())
        .unwrap_or(FALLBACK_KEY_BASE + index as u64)
}

pub async fn create_drivers(ctx: &BatchContext<'_>, drivers: &[DriverItem]) -> Vec<OperationResult> {
    ctx.runner
        .run(
            "drivers",
            drivers.to_vec(),
            |index, driver| async move {
                let identifier = driver.name.trim().to_string();
                let outcome = async {
                    if identifier.is_empty() {
                        return Err("Nome do motorista ausente".to_string());
                    }
                    let (first_name, last_name) = split_name(&driver.name);
                    let new_driver = NewDriver {
                        first_name,
                        last_name,
                        driver_key: driver_key(driver.code.as_deref(), index),
                    };
                    let id = ctx
                        .vendor
                        .create_driver(ctx.token, &new_driver)
                        .await
                        .map_err(|e| e.to_string())?;
                    Ok(Some(id))
                }
                .await;
                into_result(identifier, outcome)
            },
            ctx.progress,
        )
        .await
}
