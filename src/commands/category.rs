use crate::models::category::CategoryRegistry;

use super::{AppState, CommandResult};

pub fn categories_get(state: &AppState) -> CommandResult<CategoryRegistry> {
    Ok(state.categories().registry()?)
}

/// Restores the built-in categories and writes them to disk.
pub fn categories_reset(state: &AppState) -> CommandResult<CategoryRegistry> {
    let service = state.categories();
    let registry = service.reset_to_defaults()?;
    service.save()?;
    Ok(registry)
}
