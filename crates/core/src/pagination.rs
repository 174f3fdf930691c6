//! Page-number pagination for list endpoints.
//!
//! Pages are 1-based and selected with `?pagina=N`. A missing value means the
//! first page. The first page is always valid, even when there are no rows;
//! any other page past the end is rejected.

use crate::error::CoreError;

/// Query parameter carrying the page number.
pub const PAGE_PARAM: &str = "pagina";

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const MSG_INVALID_PAGE: &str = "Página inválida.";

/// A resolved page over `total` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

impl PageWindow {
    /// Number of pages; zero rows still count as one (empty) page.
    pub fn page_count(&self) -> u32 {
        let size = i64::from(self.page_size.max(1));
        let pages = (self.total.max(0) + size - 1) / size;
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.max(1))
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * self.limit()
    }

    pub fn next_page(&self) -> Option<u32> {
        (self.page < self.page_count()).then(|| self.page + 1)
    }

    pub fn previous_page(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }
}

/// Parse the raw `pagina` value. Absent or blank means page 1.
pub fn parse_page(raw: Option<&str>) -> Result<u32, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(1),
        Some(value) => match value.parse::<u32>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(CoreError::InvalidPage(MSG_INVALID_PAGE.into())),
        },
    }
}

/// Resolve the requested page against the row count.
pub fn resolve_page(raw: Option<&str>, total: i64, page_size: u32) -> Result<PageWindow, CoreError> {
    let window = PageWindow {
        page: parse_page(raw)?,
        page_size: page_size.max(1),
        total,
    };
    if window.page > window.page_count() {
        return Err(CoreError::InvalidPage(MSG_INVALID_PAGE.into()));
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_page_is_first() {
        assert_eq!(parse_page(None).unwrap(), 1);
        assert_eq!(parse_page(Some("")).unwrap(), 1);
        assert_eq!(parse_page(Some("3")).unwrap(), 3);
    }

    #[test]
    fn malformed_page_is_rejected() {
        assert_matches!(parse_page(Some("0")), Err(CoreError::InvalidPage(_)));
        assert_matches!(parse_page(Some("-1")), Err(CoreError::InvalidPage(_)));
        assert_matches!(parse_page(Some("abc")), Err(CoreError::InvalidPage(_)));
    }

    #[test]
    fn empty_first_page_is_allowed() {
        let window = resolve_page(None, 0, 10).unwrap();
        assert_eq!(window.page_count(), 1);
        assert_eq!(window.next_page(), None);
        assert_eq!(window.previous_page(), None);
    }

    #[test]
    fn page_past_end_is_rejected() {
        assert_matches!(resolve_page(Some("2"), 10, 10), Err(CoreError::InvalidPage(_)));
        assert!(resolve_page(Some("2"), 11, 10).is_ok());
    }

    #[test]
    fn window_math() {
        let window = resolve_page(Some("2"), 25, 10).unwrap();
        assert_eq!(window.offset(), 10);
        assert_eq!(window.limit(), 10);
        assert_eq!(window.page_count(), 3);
        assert_eq!(window.next_page(), Some(3));
        assert_eq!(window.previous_page(), Some(1));
    }
}
