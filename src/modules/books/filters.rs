//! Normalisation of raw `GET /books` query parameters.
//!
//! Nothing here fails: malformed values fall back to "no constraint" or to
//! the pagination defaults.

use std::collections::HashSet;

use crate::utils::{fold_search_text, parse_leading_int};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 24;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Untyped listing parameters exactly as they arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListParams {
    pub q: Option<String>,
    pub domain: Option<String>,
    pub tags: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl RawListParams {
    /// Collect from decoded query pairs. The first occurrence of a key wins;
    /// unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "q" => &mut params.q,
                "domain" => &mut params.domain,
                "tags" => &mut params.tags,
                "yearFrom" => &mut params.year_from,
                "yearTo" => &mut params.year_to,
                "page" => &mut params.page,
                "pageSize" => &mut params.page_size,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }
}

/// Public-domain constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Public,
    NonPublic,
}

impl Domain {
    /// `public` / `non-public`, case-insensitive; anything else is no filter.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("public") {
            Some(Domain::Public)
        } else if raw.eq_ignore_ascii_case("non-public") {
            Some(Domain::NonPublic)
        } else {
            None
        }
    }

    pub fn is_public_domain(self) -> bool {
        matches!(self, Domain::Public)
    }
}

/// Free-text needle, folded for case/accent-insensitive substring matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchText {
    folded: String,
}

impl SearchText {
    /// `None` when the input is blank.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            folded: fold_search_text(trimmed),
        })
    }

    pub fn matches(&self, haystack: &str) -> bool {
        fold_search_text(haystack).contains(&self.folded)
    }
}

/// Clamped page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    page_size: u64,
}

impl Pagination {
    /// Clamp raw values: `page` is floored at 1; `page_size` defaults to 24
    /// when missing, unparsable or zero and is clamped into `1..=100`.
    pub fn new(page: Option<&str>, page_size: Option<&str>) -> Self {
        let page = match page.and_then(parse_leading_int) {
            Some(n) if n >= 1 => n as u64,
            _ => DEFAULT_PAGE,
        };
        let page_size = match page_size.and_then(parse_leading_int) {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(n) => n.clamp(1, MAX_PAGE_SIZE as i64) as u64,
        };
        Self { page, page_size }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Rows to skip; saturates instead of overflowing for absurd pages.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Normalised listing filter. Every `None` / empty field is inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub text: Option<SearchText>,
    pub domain: Option<Domain>,
    /// Effective tag slugs: trimmed, non-empty, first occurrence kept.
    pub tags: Vec<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub pagination: Pagination,
}

impl BookFilter {
    pub fn normalize(raw: &RawListParams) -> Self {
        Self {
            text: raw.q.as_deref().and_then(SearchText::new),
            domain: raw.domain.as_deref().and_then(Domain::parse),
            tags: raw.tags.as_deref().map(parse_tag_slugs).unwrap_or_default(),
            year_from: raw.year_from.as_deref().and_then(parse_year),
            year_to: raw.year_to.as_deref().and_then(parse_year),
            pagination: Pagination::new(raw.page.as_deref(), raw.page_size.as_deref()),
        }
    }
}

/// Split a comma-separated slug list, dropping blanks and repeats.
///
/// Slugs match case-insensitively, so `Romance` repeats `romance`; the first
/// spelling is kept.
pub fn parse_tag_slugs(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|slug| !slug.is_empty() && seen.insert(slug.to_ascii_lowercase()))
        .map(str::to_string)
        .collect()
}

fn parse_year(raw: &str) -> Option<i32> {
    parse_leading_int(raw).and_then(|year| i32::try_from(year).ok())
}
