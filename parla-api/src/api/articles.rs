//! Reading-material endpoints

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use parla_common::db::models::Article;

use crate::db::articles;
use crate::db::articles::ArticleSummary;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles", get(list_articles))
        .route("/api/articles/:id", get(get_article))
        .route("/api/articles/search/:title", get(search_articles))
}

async fn list_articles(State(state): State<AppState>) -> ApiResult<Json<Vec<ArticleSummary>>> {
    let articles = articles::list(&state.db).await?;
    Ok(Json(articles))
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Article>> {
    let article = articles::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No article with id {}", id)))?;

    Ok(Json(article))
}

async fn search_articles(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> ApiResult<Json<Vec<Article>>> {
    let articles = articles::find_by_title(&state.db, &title).await?;
    if articles.is_empty() {
        return Err(ApiError::NotFound(format!("No article titled {:?}", title)));
    }

    Ok(Json(articles))
}
