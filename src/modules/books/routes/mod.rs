//! HTTP handlers for the books module.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use shelf_http::error::AppError;

use super::filters::{BookFilter, RawListParams};
use super::models::{BookDetail, BookListResponse, Link};
use super::query::search_books;
use super::repository::CatalogStore;

#[derive(Clone)]
pub struct BooksState {
    store: Arc<dyn CatalogStore>,
}

pub fn router(store: Arc<dyn CatalogStore>) -> Router {
    Router::new()
        .route("/", get(list_books))
        .route("/{id}", get(get_book))
        .route("/{id}/links", get(list_links))
        .with_state(BooksState { store })
}

/// Path ids are plain positive integers; anything else names no book.
fn parse_book_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

async fn list_books(
    State(state): State<BooksState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BookListResponse>, AppError> {
    let filter = BookFilter::normalize(&RawListParams::from_pairs(pairs));

    let page = search_books(state.store.as_ref(), &filter)
        .await
        .map_err(|e| AppError::internal("Failed to list books", e))?;

    Ok(Json(BookListResponse {
        total: page.total,
        page: filter.pagination.page(),
        page_size: filter.pagination.page_size(),
        tags: page.tags_applied,
        items: page.items,
    }))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<BookDetail>, AppError> {
    let not_found = || AppError::not_found(format!("Book '{}' not found", id));

    let Some(book_id) = parse_book_id(&id) else {
        return Err(not_found());
    };

    state
        .store
        .find_book(book_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch book", e))?
        .map(Json)
        .ok_or_else(not_found)
}

async fn list_links(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Link>>, AppError> {
    let Some(book_id) = parse_book_id(&id) else {
        return Ok(Json(Vec::new()));
    };

    let links = state
        .store
        .book_links(book_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch links", e))?;

    Ok(Json(links))
}
