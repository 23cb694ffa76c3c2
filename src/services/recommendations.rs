use crate::{
    error::AppResult,
    models::{ReadingHistory, Recommendation},
    services::model::RetrievalModel,
};

/// Top-`k` recommendations for a user, in the order the model ranks them
///
/// The user id is passed to the model as-is. Unknown ids are the model's
/// problem: whatever it returns for them is returned here.
pub fn recommend(
    model: &dyn RetrievalModel,
    user_id: &str,
    k: usize,
) -> AppResult<Vec<Recommendation>> {
    let candidates = model.query(user_id)?;

    tracing::debug!(
        user_id = %user_id,
        model = model.name(),
        candidates = candidates.len(),
        "Model query returned"
    );

    let recommendations = candidates
        .titles
        .iter()
        .zip(candidates.scores.iter())
        .take(k)
        .map(|(title, &score)| Recommendation::new(String::from_utf8_lossy(title), score))
        .collect();

    Ok(recommendations)
}

/// Drops every recommendation whose title the user has already read
///
/// Removed slots are not refilled from lower-ranked candidates, so the result
/// may hold fewer than the `k` titles originally requested.
pub fn exclude_read(
    recommendations: Vec<Recommendation>,
    history: &ReadingHistory,
) -> Vec<Recommendation> {
    recommendations
        .into_iter()
        .filter(|rec| !history.contains_title(&rec.title))
        .collect()
}

/// [`recommend`] followed by [`exclude_read`]
pub fn recommend_unread(
    model: &dyn RetrievalModel,
    user_id: &str,
    k: usize,
    history: &ReadingHistory,
) -> AppResult<Vec<Recommendation>> {
    let recommendations = recommend(model, user_id, k)?;
    let requested = recommendations.len();
    let unread = exclude_read(recommendations, history);

    tracing::info!(
        user_id = %user_id,
        k = k,
        returned = requested,
        already_read = requested - unread.len(),
        displayed = unread.len(),
        "Recommendations computed"
    );

    Ok(unread)
}
