//! Page requests and paged responses

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{
    book::{BookShort, HeldBook},
    library::{LibraryProfile, LibrarySummary},
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const DEFAULT_SORT_FIELD: &str = "id";

/// Raw paging parameters from the query string
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 0
    pub page: Option<i64>,
    /// Page size (default 20, max 100)
    pub size: Option<i64>,
    /// Sort field
    pub sort: Option<String>,
    /// ASC or DESC
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Normalized paging parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
    pub sort: String,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT_FIELD.to_string(),
            direction: SortDirection::Asc,
        }
    }
}

impl From<&PageQuery> for PageRequest {
    fn from(query: &PageQuery) -> Self {
        let page = query.page.filter(|p| *p >= 0).unwrap_or(0);
        let size = query
            .size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let sort = query
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SORT_FIELD)
            .to_string();
        let direction = match query.direction.as_deref().map(str::to_uppercase).as_deref() {
            Some("DESC") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        Self { page, size, sort, direction }
    }
}

impl PageRequest {
    /// Row offset of the page, saturating for out-of-range page numbers
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    /// Build an ORDER BY clause from a whitelist of `(api field, sql column)`.
    ///
    /// Unknown fields fall back to the first entry, which should be the id.
    pub fn order_by(&self, columns: &[(&str, &'static str)]) -> String {
        let column = columns
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(&self.sort))
            .or_else(|| columns.first())
            .map(|(_, column)| *column)
            .unwrap_or("id");
        format!("ORDER BY {} {}", column, self.direction.as_sql())
    }
}

/// One page of results
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    BookPage = Page<BookShort>,
    LibraryPage = Page<LibrarySummary>,
    LibraryProfilePage = Page<LibraryProfile>,
    CollectionPage = Page<HeldBook>
)]
pub struct Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub content: Vec<T>,
    /// Current page, starting at 0
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + request.size - 1) / request.size
        };

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }
}
