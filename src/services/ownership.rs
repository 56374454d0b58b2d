//! Per-instance ownership enforcement, symmetric for every owned resource.

use uuid::Uuid;

use crate::database::models::Owned;
use crate::error::ApiError;

/// Resolve a bare-id lookup into an owned resource. The existence check and
/// the ownership check run in sequence and stay independently observable:
/// a missing resource is `NotFound`, an existing one owned by someone else
/// is `Forbidden`. Lookups are deliberately NOT scoped to the caller.
pub fn authorize_owned<T: Owned>(found: Option<T>, caller: Uuid) -> Result<T, ApiError> {
    let resource = found
        .ok_or_else(|| ApiError::not_found(format!("{} not found", T::resource_name())))?;
    if resource.created_by() != caller {
        return Err(ApiError::forbidden(format!(
            "You do not have access to this {}",
            T::resource_name().to_lowercase()
        )));
    }
    Ok(resource)
}
