use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Book row as listed: the book joined with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub slug: String,
    pub cover_url: Option<String>,
    pub is_public_domain: bool,
    /// Author name
    pub author: String,
}

/// Full book record for the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookDetail {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub slug: String,
    pub cover_url: Option<String>,
    pub is_public_domain: bool,
    pub author_id: i64,
    pub author: String,
}

/// Where a link points. Variant order is the display priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Source,
    ReadOnline,
    Library,
    Buy,
    Other,
}

impl LinkKind {
    /// Unrecognised kinds sort with `Other`.
    pub fn from_db(kind: &str) -> Self {
        match kind {
            "source" => LinkKind::Source,
            "read_online" => LinkKind::ReadOnline,
            "library" => LinkKind::Library,
            "buy" => LinkKind::Buy,
            _ => LinkKind::Other,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct LinkRow {
    pub kind: String,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub kind: LinkKind,
    pub label: String,
    pub url: String,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Self {
            kind: LinkKind::from_db(&row.kind),
            label: row.label,
            url: row.url,
        }
    }
}

/// Result of a catalog search: the page slice plus the pre-pagination total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub total: u64,
    /// Effective tag slugs, echoed from the request.
    pub tags_applied: Vec<String>,
    pub items: Vec<BookSummary>,
}

/// Response body of `GET /books`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListResponse {
    pub total: u64,
    pub page: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    pub tags: Vec<String>,
    pub items: Vec<BookSummary>,
}
