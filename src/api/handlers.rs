use std::ops::RangeInclusive;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{ReadingHistory, Recommendation},
    services::{
        gallery::{
            self, Gallery, HISTORY_CAPTION_CHARS, HISTORY_MAX_ROWS, RECOMMENDATION_CAPTION_CHARS,
        },
        history, recommendations, Cover, NO_COVER,
    },
};

use super::AppContext;

/// Allowed number of recommendations per request
pub const COUNT_RANGE: RangeInclusive<usize> = 1..=10;
pub const DEFAULT_COUNT: usize = 3;
/// Allowed number of gallery columns
pub const COLUMNS_RANGE: RangeInclusive<usize> = 1..=8;
pub const DEFAULT_COLUMNS: usize = 5;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct DisplayParams {
    pub columns: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    pub count: Option<usize>,
    pub columns: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CoverQuery {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub loaded_at: DateTime<Utc>,
    pub users: usize,
    pub titles: usize,
    pub catalog_rows: usize,
    pub model: &'static str,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ControlRange {
    pub min: usize,
    pub max: usize,
    pub default: usize,
}

impl ControlRange {
    fn new(range: &RangeInclusive<usize>, default: usize) -> Self {
        Self {
            min: *range.start(),
            max: *range.end(),
            default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ControlsResponse {
    pub recommendations: ControlRange,
    pub columns: ControlRange,
}

/// Cover as embedded in a gallery card
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoverView {
    Image {
        content_type: Option<String>,
        /// Base64-encoded image bytes
        data: String,
    },
    Missing {
        marker: &'static str,
    },
}

impl From<Cover> for CoverView {
    fn from(cover: Cover) -> Self {
        match cover {
            Cover::Image {
                bytes,
                content_type,
            } => CoverView::Image {
                content_type,
                data: STANDARD.encode(&bytes),
            },
            Cover::Missing => CoverView::Missing { marker: NO_COVER },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryCard {
    pub title: String,
    pub caption: String,
    pub rating: i32,
    pub author: String,
    pub cover: CoverView,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationCard {
    pub title: String,
    pub caption: String,
    pub score: String,
    pub cover: CoverView,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub books: usize,
    pub gallery: Gallery<HistoryCard>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub user_id: String,
    pub requested: usize,
    pub history: Gallery<HistoryCard>,
    pub recommendations: Gallery<RecommendationCard>,
}

// Helpers

fn checked(
    value: Option<usize>,
    default: usize,
    range: &RangeInclusive<usize>,
    what: &str,
) -> AppResult<usize> {
    let value = value.unwrap_or(default);
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(AppError::InvalidInput(format!(
            "{} must be between {} and {}, got {}",
            what,
            range.start(),
            range.end(),
            value
        )))
    }
}

fn ensure_known_user(ctx: &AppContext, user_id: &str) -> AppResult<()> {
    if ctx.identity.contains_user(user_id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Unknown user id: {}", user_id)))
    }
}

/// Cards for the books a user has read, covers fetched one at a time
async fn history_gallery(
    ctx: &AppContext,
    history: &ReadingHistory,
    columns: usize,
) -> Gallery<HistoryCard> {
    let shown = gallery::capacity(columns, Some(HISTORY_MAX_ROWS)).unwrap_or(usize::MAX);

    let mut cards = Vec::new();
    for (title, rating, author) in history.rows().take(shown) {
        let cover = ctx.covers.resolve(title).await;
        cards.push(HistoryCard {
            title: title.to_string(),
            caption: gallery::caption(title, HISTORY_CAPTION_CHARS),
            rating,
            author: author.to_string(),
            cover: cover.into(),
        });
    }

    gallery::layout(cards, columns, Some(HISTORY_MAX_ROWS))
}

async fn recommendation_gallery(
    ctx: &AppContext,
    recommendations: Vec<Recommendation>,
    columns: usize,
) -> Gallery<RecommendationCard> {
    let mut cards = Vec::new();
    for rec in recommendations {
        let cover = ctx.covers.resolve(&rec.title).await;
        cards.push(RecommendationCard {
            caption: gallery::caption(&rec.title, RECOMMENDATION_CAPTION_CHARS),
            title: rec.title,
            score: rec.score,
            cover: cover.into(),
        });
    }

    gallery::layout(cards, columns, None)
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        loaded_at: ctx.loaded_at,
        users: ctx.identity.user_ids.len(),
        titles: ctx.identity.book_titles.len(),
        catalog_rows: ctx.catalog.len(),
        model: ctx.model.name(),
    })
}

/// Ranges and defaults for the recommendation and column controls
pub async fn get_controls() -> Json<ControlsResponse> {
    Json(ControlsResponse {
        recommendations: ControlRange::new(&COUNT_RANGE, DEFAULT_COUNT),
        columns: ControlRange::new(&COLUMNS_RANGE, DEFAULT_COLUMNS),
    })
}

/// Known user ids, for the user selector
pub async fn get_users(State(ctx): State<Arc<AppContext>>) -> Json<Vec<String>> {
    Json(ctx.identity.user_ids.clone())
}

/// Known book titles
pub async fn get_titles(State(ctx): State<Arc<AppContext>>) -> Json<Vec<String>> {
    Json(ctx.identity.book_titles.clone())
}

/// Books a user has already rated
pub async fn get_history(
    State(ctx): State<Arc<AppContext>>,
    Path(user_id): Path<String>,
    params: Result<Query<DisplayParams>, QueryRejection>,
) -> AppResult<Json<HistoryResponse>> {
    let Query(params) = params?;
    let columns = checked(params.columns, DEFAULT_COLUMNS, &COLUMNS_RANGE, "columns")?;
    ensure_known_user(&ctx, &user_id)?;

    let history = history::reading_history(&ctx.catalog, &user_id)?;
    let gallery = history_gallery(&ctx, &history, columns).await;

    Ok(Json(HistoryResponse {
        user_id,
        books: history.len(),
        gallery,
    }))
}

/// Reading history plus unread recommendations for one user
pub async fn recommend(
    State(ctx): State<Arc<AppContext>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(request) = payload?;
    let count = checked(request.count, DEFAULT_COUNT, &COUNT_RANGE, "count")?;
    let columns = checked(request.columns, DEFAULT_COLUMNS, &COLUMNS_RANGE, "columns")?;
    ensure_known_user(&ctx, &request.user_id)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %request.user_id,
        count = count,
        columns = columns,
        "Processing recommendation request"
    );

    let history = history::reading_history(&ctx.catalog, &request.user_id)?;
    let unread =
        recommendations::recommend_unread(ctx.model.as_ref(), &request.user_id, count, &history)?;

    let history_cards = history_gallery(&ctx, &history, columns).await;
    let recommendation_cards = recommendation_gallery(&ctx, unread, columns).await;

    tracing::info!(
        request_id = %request_id,
        history_cards = history_cards.len(),
        recommendation_cards = recommendation_cards.len(),
        "Recommendation request completed"
    );

    Ok(Json(RecommendationResponse {
        user_id: request.user_id,
        requested: count,
        history: history_cards,
        recommendations: recommendation_cards,
    }))
}

/// Raw cover image for a title
pub async fn get_cover(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CoverQuery>,
) -> AppResult<Response> {
    match ctx.covers.resolve(&query.title).await {
        Cover::Image {
            bytes,
            content_type,
        } => {
            let content_type =
                content_type.unwrap_or_else(|| "application/octet-stream".to_string());
            Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], bytes).into_response())
        }
        Cover::Missing => Err(AppError::NotFound(NO_COVER.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    #[test]
    fn test_checked_uses_default() {
        assert_eq!(checked(None, DEFAULT_COUNT, &COUNT_RANGE, "count").unwrap(), 3);
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        assert!(checked(Some(0), DEFAULT_COUNT, &COUNT_RANGE, "count").is_err());
        assert!(checked(Some(11), DEFAULT_COUNT, &COUNT_RANGE, "count").is_err());
        assert!(checked(Some(9), DEFAULT_COLUMNS, &COLUMNS_RANGE, "columns").is_err());
        assert_eq!(checked(Some(10), DEFAULT_COUNT, &COUNT_RANGE, "count").unwrap(), 10);
    }

    #[test]
    fn test_cover_view_from_image() {
        let view = CoverView::from(Cover::Image {
            bytes: Bytes::from_static(b"JPEG"),
            content_type: Some("image/jpeg".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({"kind": "image", "content_type": "image/jpeg", "data": "SlBFRw=="})
        );
    }

    #[test]
    fn test_cover_view_from_missing() {
        let view = CoverView::from(Cover::Missing);
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({"kind": "missing", "marker": "No Image Cover"})
        );
    }

    #[test]
    fn test_control_range_serialization() {
        let range = ControlRange::new(&COLUMNS_RANGE, DEFAULT_COLUMNS);
        assert_eq!(
            range,
            ControlRange {
                min: 1,
                max: 8,
                default: 5
            }
        );
    }
}
