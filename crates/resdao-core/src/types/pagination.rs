//! Paging value objects for list queries.
//!
//! A [`PageLink`] is built by the caller for one query; the store answers
//! with a [`PageData`]. Both are immutable once built.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::sorting::SortOrder;

/// Maximum page size accepted by any store.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Paging, search and sort parameters of a list query.
///
/// Construction validates the parameters, so a `PageLink` always has
/// `0 < page_size <= MAX_PAGE_SIZE`. Deserialization goes through the same
/// checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PageLinkParams")]
pub struct PageLink {
    page_size: u32,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_order: Option<SortOrder>,
}

impl PageLink {
    /// Create a link for zero-based `page` of `page_size` items.
    pub fn new(page_size: u32, page: u32) -> AppResult<Self> {
        if page_size == 0 {
            return Err(AppError::validation("Page size must be greater than 0"));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(AppError::validation(format!(
                "Page size must not exceed {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }
        Ok(Self {
            page_size,
            page,
            text_search: None,
            sort_order: None,
        })
    }

    /// Create a link from untrusted signed values.
    pub fn from_raw(page_size: i64, page: i64) -> AppResult<Self> {
        if page < 0 {
            return Err(AppError::validation(format!(
                "Page index must be non-negative, got {page}"
            )));
        }
        if page_size <= 0 {
            return Err(AppError::validation(format!(
                "Page size must be greater than 0, got {page_size}"
            )));
        }
        let page_size = u32::try_from(page_size).map_err(|_| {
            AppError::validation(format!("Page size must not exceed {MAX_PAGE_SIZE}"))
        })?;
        let page = u32::try_from(page)
            .map_err(|_| AppError::validation(format!("Page index {page} is out of range")))?;
        Self::new(page_size, page)
    }

    /// Set the free-text search term. Blank terms are dropped.
    pub fn with_text_search(mut self, text_search: impl Into<String>) -> Self {
        let text = text_search.into();
        let trimmed = text.trim();
        self.text_search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Set the sort order.
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Number of items per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Free-text search term, if any.
    pub fn text_search(&self) -> Option<&str> {
        self.text_search.as_deref()
    }

    /// Requested sort order, if any.
    pub fn sort_order(&self) -> Option<&SortOrder> {
        self.sort_order.as_ref()
    }

    /// Number of items to skip (SQL `OFFSET`).
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    /// Maximum number of items to return (SQL `LIMIT`).
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// The link for the page after this one, with the same search and sort.
    pub fn next_page_link(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }
}

/// Unvalidated wire form of a [`PageLink`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageLinkParams {
    page_size: i64,
    #[serde(default)]
    page: i64,
    #[serde(default)]
    text_search: Option<String>,
    #[serde(default)]
    sort_order: Option<SortOrder>,
}

impl TryFrom<PageLinkParams> for PageLink {
    type Error = AppError;

    fn try_from(params: PageLinkParams) -> Result<Self, Self::Error> {
        let mut link = PageLink::from_raw(params.page_size, params.page)?;
        if let Some(text) = params.text_search {
            link = link.with_text_search(text);
        }
        if let Some(order) = params.sort_order {
            link = link.with_sort_order(order);
        }
        Ok(link)
    }
}

/// One page of query results plus totals across all pages.
///
/// Stores build pages with [`PageData::new`]. Deserialization rejects
/// totals that contradict each other or the items carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "PageDataParams<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct PageData<T> {
    data: Vec<T>,
    total_pages: u64,
    total_elements: u64,
    has_next: bool,
}

impl<T> PageData<T> {
    /// Build the page answering `page_link`.
    ///
    /// `data` must hold at most `page_link.page_size()` items.
    pub fn new(data: Vec<T>, total_elements: u64, page_link: &PageLink) -> Self {
        debug_assert!(data.len() as u64 <= page_link.limit());
        let total_pages = total_elements.div_ceil(page_link.limit());
        Self {
            data,
            total_pages,
            total_elements,
            has_next: u64::from(page_link.page()) + 1 < total_pages,
        }
    }

    /// A page with no items and zero totals.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total_pages: 0,
            total_elements: 0,
            has_next: false,
        }
    }

    /// Items on this page.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consume the page and return its items.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Total number of pages.
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Total number of items across all pages.
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Whether a page follows this one.
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Convert the items, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageData<U> {
        PageData {
            data: self.data.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            total_elements: self.total_elements,
            has_next: self.has_next,
        }
    }
}

/// Unvalidated wire form of a [`PageData`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageDataParams<T> {
    data: Vec<T>,
    total_pages: u64,
    total_elements: u64,
    has_next: bool,
}

impl<T> TryFrom<PageDataParams<T>> for PageData<T> {
    type Error = AppError;

    fn try_from(params: PageDataParams<T>) -> Result<Self, Self::Error> {
        let items = params.data.len() as u64;
        if items > params.total_elements {
            return Err(AppError::validation(format!(
                "Page holds {items} items but totalElements is {}",
                params.total_elements
            )));
        }
        if (params.total_elements == 0) != (params.total_pages == 0)
            || params.total_pages > params.total_elements
        {
            return Err(AppError::validation(format!(
                "totalPages {} does not fit totalElements {}",
                params.total_pages, params.total_elements
            )));
        }
        // A page followed by another is full, so its length is the page size.
        if params.has_next
            && (items == 0 || params.total_pages != params.total_elements.div_ceil(items))
        {
            return Err(AppError::validation(format!(
                "hasNext is set but {items} items do not give {} pages of {} items",
                params.total_pages, params.total_elements
            )));
        }
        Ok(Self {
            data: params.data,
            total_pages: params.total_pages,
            total_elements: params.total_elements,
            has_next: params.has_next,
        })
    }
}

impl<T> Default for PageData<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::sorting::SortDirection;

    #[test]
    fn test_offset_and_limit() {
        let link = PageLink::new(10, 2).unwrap();
        assert_eq!(link.offset(), 20);
        assert_eq!(link.limit(), 10);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = PageLink::new(0, 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_oversized_page_rejected() {
        assert!(PageLink::new(MAX_PAGE_SIZE, 0).is_ok());
        assert!(PageLink::new(MAX_PAGE_SIZE + 1, 0).is_err());
    }

    #[test]
    fn test_negative_raw_values_rejected() {
        assert_eq!(
            PageLink::from_raw(10, -1).unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            PageLink::from_raw(-5, 0).unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            PageLink::from_raw(i64::MAX, 0).unwrap_err().kind,
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let link = PageLink::new(5, 0).unwrap().with_text_search("   ");
        assert_eq!(link.text_search(), None);

        let link = PageLink::new(5, 0).unwrap().with_text_search("  model ");
        assert_eq!(link.text_search(), Some("model"));
    }

    #[test]
    fn test_next_page_link_keeps_search_and_sort() {
        let link = PageLink::new(5, 0)
            .unwrap()
            .with_text_search("jks")
            .with_sort_order(SortOrder::desc("title"));
        let next = link.next_page_link();
        assert_eq!(next.page(), 1);
        assert_eq!(next.text_search(), Some("jks"));
        assert_eq!(next.sort_order(), link.sort_order());
    }

    #[test]
    fn test_page_link_deserialize_validates() {
        let link: PageLink = serde_json::from_str(
            r#"{"pageSize":20,"page":1,"textSearch":"x","sortOrder":{"property":"title","direction":"DESC"}}"#,
        )
        .unwrap();
        assert_eq!(link.page_size(), 20);
        assert_eq!(link.page(), 1);
        assert_eq!(link.sort_order().map(|s| s.direction), Some(SortDirection::Desc));

        assert!(serde_json::from_str::<PageLink>(r#"{"pageSize":0}"#).is_err());
        assert!(serde_json::from_str::<PageLink>(r#"{"pageSize":10,"page":-1}"#).is_err());
    }

    #[test]
    fn test_page_data_totals_for_25_items() {
        let expected = [(0, 10, true), (1, 10, true), (2, 5, false)];
        for (page, len, has_next) in expected {
            let link = PageLink::new(10, page).unwrap();
            let data = PageData::new(vec![0u8; len], 25, &link);
            assert_eq!(data.total_elements(), 25);
            assert_eq!(data.total_pages(), 3);
            assert_eq!(data.has_next(), has_next);
            assert_eq!(data.data().len(), len);
        }
    }

    #[test]
    fn test_page_data_exact_multiple() {
        let link = PageLink::new(5, 1).unwrap();
        let data = PageData::new(vec![1, 2, 3, 4, 5], 10, &link);
        assert_eq!(data.total_pages(), 2);
        assert!(!data.has_next());
    }

    #[test]
    fn test_page_data_empty_has_zero_pages() {
        let link = PageLink::new(10, 0).unwrap();
        let data: PageData<u8> = PageData::new(Vec::new(), 0, &link);
        assert_eq!(data.total_pages(), 0);
        assert!(!data.has_next());
        assert_eq!(data, PageData::empty());
    }

    #[test]
    fn test_page_data_map_keeps_metadata() {
        let link = PageLink::new(2, 0).unwrap();
        let data = PageData::new(vec![1, 2], 3, &link).map(|n| n * 10);
        assert_eq!(data.data(), &[10, 20]);
        assert_eq!(data.total_pages(), 2);
        assert!(data.has_next());
    }

    #[test]
    fn test_page_data_deserialize_rejects_contradictory_totals() {
        let page: PageData<u8> = serde_json::from_str(
            r#"{"data":[1,2],"totalPages":2,"totalElements":3,"hasNext":true}"#,
        )
        .unwrap();
        assert_eq!(page, PageData::new(vec![1, 2], 3, &PageLink::new(2, 0).unwrap()));

        for json in [
            r#"{"data":[1,2,3],"totalPages":9,"totalElements":1,"hasNext":true}"#,
            r#"{"data":[],"totalPages":1,"totalElements":0,"hasNext":false}"#,
            r#"{"data":[1],"totalPages":5,"totalElements":3,"hasNext":false}"#,
            r#"{"data":[1,2],"totalPages":3,"totalElements":3,"hasNext":true}"#,
        ] {
            assert!(serde_json::from_str::<PageData<u8>>(json).is_err(), "{json}");
        }
    }

    #[test]
    fn test_page_data_json_shape() {
        let link = PageLink::new(2, 0).unwrap();
        let json = serde_json::to_value(PageData::new(vec!["a"], 1, &link)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": ["a"],
                "totalPages": 1,
                "totalElements": 1,
                "hasNext": false
            })
        );
    }
}
