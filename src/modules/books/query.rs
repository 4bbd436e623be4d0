//! Catalog search: store-side predicates in SQL, the accent-insensitive text
//! predicate in memory, then an exact total and one page.

use shelf_db::DbError;

use super::filters::{BookFilter, SearchText};
use super::models::{BookPage, BookSummary};
use super::repository::CatalogStore;

/// Run a listing query.
///
/// Without search text the store counts and windows the rows itself. SQLite
/// cannot fold accents, so with search text the candidates are scanned here
/// and `total` and `items` are cut from that one filtered sequence. Either
/// way `total` is exact regardless of the requested page, and a page past
/// the end yields no items and the real total.
#[tracing::instrument(skip_all, fields(
    page = filter.pagination.page(),
    page_size = filter.pagination.page_size(),
    text = filter.text.is_some()
))]
pub async fn search_books<S>(store: &S, filter: &BookFilter) -> Result<BookPage, DbError>
where
    S: CatalogStore + ?Sized,
{
    let limit = filter.pagination.page_size();
    let offset = filter.pagination.offset();

    let (total, items) = match &filter.text {
        None => {
            let total = store.count_books(filter).await?;
            let items = if offset >= total {
                Vec::new()
            } else {
                store.page_books(filter, limit, offset).await?
            };
            (total, items)
        }
        Some(text) => {
            let matching: Vec<BookSummary> = store
                .candidate_books(filter)
                .await?
                .into_iter()
                .filter(|book| matches_text(text, book))
                .collect();
            let total = matching.len() as u64;
            let items = matching
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(limit as usize)
                .collect();
            (total, items)
        }
    };

    tracing::debug!(total, returned = items.len(), "catalog search completed");

    Ok(BookPage {
        total,
        tags_applied: filter.tags.clone(),
        items,
    })
}

/// Title OR author contains the search text.
fn matches_text(text: &SearchText, book: &BookSummary) -> bool {
    text.matches(&book.title) || text.matches(&book.author)
}
