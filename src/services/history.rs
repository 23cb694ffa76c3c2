use crate::{
    error::{AppError, AppResult},
    models::ReadingHistory,
    store::Catalog,
};

/// Parses a selector user id into the catalog's integer key
pub fn parse_user_id(user_id: &str) -> AppResult<i64> {
    user_id
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidInput(format!("User id must be an integer: {}", user_id)))
}

/// Books rated by `user_id`, row-aligned and in catalog order
pub fn reading_history(catalog: &Catalog, user_id: &str) -> AppResult<ReadingHistory> {
    let id = parse_user_id(user_id)?;
    let history = catalog.history(id);

    tracing::debug!(user_id = id, books = history.len(), "Reading history loaded");

    Ok(history)
}
