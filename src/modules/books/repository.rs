//! SQLite access for books, authors, tags and links.

use async_trait::async_trait;
use shelf_db::{Database, DbError};
use sqlx::{QueryBuilder, Sqlite};

use super::filters::BookFilter;
use super::models::{BookDetail, BookSummary, Link, LinkRow};

const SUMMARY_SELECT: &str = r#"
    SELECT b.id, b.title, b.year, b.slug, b.cover_url, b.is_public_domain, a.name AS author
    FROM books b
    JOIN authors a ON a.id = b.author_id
    WHERE 1 = 1"#;

const COUNT_SELECT: &str = r#"
    SELECT COUNT(*)
    FROM books b
    JOIN authors a ON a.id = b.author_id
    WHERE 1 = 1"#;

const ORDER_BY: &str = " ORDER BY b.year ASC, b.id ASC";

#[derive(Clone)]
pub struct CatalogRepository {
    db: Database,
}

impl CatalogRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Books passing every store-side predicate of `filter` (domain, year
    /// bounds, tag containment), ordered by year then id.
    ///
    /// Text search and pagination are not applied here.
    #[tracing::instrument(skip(self, filter), fields(tags = filter.tags.len()))]
    pub async fn candidate_books(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, DbError> {
        let pool = self.db.pool().await?;
        let mut query = build_candidate_query(filter);

        let rows = query
            .build_query_as::<BookSummary>()
            .fetch_all(pool)
            .await?;

        tracing::debug!(count = rows.len(), "candidate books fetched");
        Ok(rows)
    }

    /// Number of books passing the store-side predicates of `filter`.
    #[tracing::instrument(skip(self, filter), fields(tags = filter.tags.len()))]
    pub async fn count_books(&self, filter: &BookFilter) -> Result<u64, DbError> {
        let pool = self.db.pool().await?;
        let mut query = build_count_query(filter);

        let total: i64 = query.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    /// One ordered window of the store-side candidates.
    #[tracing::instrument(skip(self, filter), fields(tags = filter.tags.len()))]
    pub async fn page_books(
        &self,
        filter: &BookFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<BookSummary>, DbError> {
        let pool = self.db.pool().await?;
        let mut query = build_page_query(filter, limit, offset);

        let rows = query
            .build_query_as::<BookSummary>()
            .fetch_all(pool)
            .await?;

        tracing::debug!(count = rows.len(), "book page fetched");
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_book(&self, id: i64) -> Result<Option<BookDetail>, DbError> {
        let pool = self.db.pool().await?;
        let book = sqlx::query_as::<_, BookDetail>(
            r#"
            SELECT b.id, b.title, b.year, b.slug, b.cover_url, b.is_public_domain,
                   b.author_id, a.name AS author
            FROM books b
            JOIN authors a ON a.id = b.author_id
            WHERE b.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(book)
    }

    /// Links for a book ordered by kind priority, then label.
    #[tracing::instrument(skip(self))]
    pub async fn book_links(&self, book_id: i64) -> Result<Vec<Link>, DbError> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT kind, label, url
            FROM links
            WHERE book_id = ?1
            ORDER BY label, id
            "#,
        )
        .bind(book_id)
        .fetch_all(pool)
        .await?;

        let mut links: Vec<Link> = rows.into_iter().map(Link::from).collect();
        // stable: label order survives within a kind
        links.sort_by_key(|link| link.kind);
        Ok(links)
    }
}

fn build_candidate_query(filter: &BookFilter) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
    push_predicates(&mut query, filter);
    query.push(ORDER_BY);
    query
}

fn build_count_query(filter: &BookFilter) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::<Sqlite>::new(COUNT_SELECT);
    push_predicates(&mut query, filter);
    query
}

fn build_page_query(filter: &BookFilter, limit: u64, offset: u64) -> QueryBuilder<'static, Sqlite> {
    let mut query = build_candidate_query(filter);
    query
        .push(" LIMIT ")
        .push_bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .push(" OFFSET ")
        .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));
    query
}

/// Append the active store-side filters as `AND` clauses.
///
/// Tag containment groups the matching `books_tags` rows per book and keeps
/// books that matched every requested slug, so a book appears once however
/// many tags it carries. The slug list travels as a single JSON array bind,
/// so its length is not bounded by SQLite's variable limit. Slugs compare
/// ASCII case-insensitively; the normalizer has already deduplicated them
/// the same way, so the bound count is the number of distinct slugs.
fn push_predicates(query: &mut QueryBuilder<'static, Sqlite>, filter: &BookFilter) {
    if let Some(domain) = filter.domain {
        query
            .push(" AND b.is_public_domain = ")
            .push_bind(domain.is_public_domain());
    }
    if let Some(year_from) = filter.year_from {
        query.push(" AND b.year >= ").push_bind(year_from);
    }
    if let Some(year_to) = filter.year_to {
        query.push(" AND b.year <= ").push_bind(year_to);
    }

    if !filter.tags.is_empty() {
        let slugs = serde_json::Value::from(filter.tags.clone()).to_string();
        query
            .push(
                " AND b.id IN (SELECT bt.book_id FROM books_tags bt \
                 JOIN tags t ON t.id = bt.tag_id \
                 WHERE lower(t.slug) IN (SELECT lower(value) FROM json_each(",
            )
            .push_bind(slugs)
            .push(")) GROUP BY bt.book_id HAVING COUNT(DISTINCT lower(t.slug)) = ")
            .push_bind(filter.tags.len() as i64)
            .push(")");
    }
}

/// Read seam used by the handlers and the query engine.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn candidate_books(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, DbError>;
    async fn count_books(&self, filter: &BookFilter) -> Result<u64, DbError>;
    async fn page_books(
        &self,
        filter: &BookFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<BookSummary>, DbError>;
    async fn find_book(&self, id: i64) -> Result<Option<BookDetail>, DbError>;
    async fn book_links(&self, book_id: i64) -> Result<Vec<Link>, DbError>;
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn candidate_books(&self, filter: &BookFilter) -> Result<Vec<BookSummary>, DbError> {
        self.candidate_books(filter).await
    }

    async fn count_books(&self, filter: &BookFilter) -> Result<u64, DbError> {
        self.count_books(filter).await
    }

    async fn page_books(
        &self,
        filter: &BookFilter,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<BookSummary>, DbError> {
        self.page_books(filter, limit, offset).await
    }

    async fn find_book(&self, id: i64) -> Result<Option<BookDetail>, DbError> {
        self.find_book(id).await
    }

    async fn book_links(&self, book_id: i64) -> Result<Vec<Link>, DbError> {
        self.book_links(book_id).await
    }
}
