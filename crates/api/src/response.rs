//! Shared response envelope types for API handlers.
//!
//! Every list endpoint answers with a [`Page`]:
//! `{pagina_atual, links: {proximo, anterior}, quantidade, resultados}`.

use axum::http::Uri;
use serde::Serialize;
use sgp_core::pagination::{PageWindow, PAGE_PARAM};

/// Links to the neighbouring pages, `null` at either end.
#[derive(Debug, Serialize)]
pub struct PageLinks {
    pub proximo: Option<String>,
    pub anterior: Option<String>,
}

/// Standard paginated response envelope.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub pagina_atual: u32,
    pub links: PageLinks,
    /// Total rows across every page.
    pub quantidade: i64,
    pub resultados: Vec<T>,
}

impl<T: Serialize> Page<T> {
    /// Wrap one page of `resultados`. Links reuse the request path and its
    /// other query parameters.
    pub fn new(window: PageWindow, uri: &Uri, resultados: Vec<T>) -> Self {
        Self {
            pagina_atual: window.page,
            links: PageLinks {
                proximo: window.next_page().map(|p| page_link(uri, p)),
                anterior: window.previous_page().map(|p| page_link(uri, p)),
            },
            quantidade: window.total,
            resultados,
        }
    }
}

/// `uri` with its `pagina` parameter replaced by `page`.
fn page_link(uri: &Uri, page: u32) -> String {
    let page_param = format!("{PAGE_PARAM}={page}");
    let mut params: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty() && p.split('=').next() != Some(PAGE_PARAM))
        .collect();
    params.push(&page_param);
    format!("{}?{}", uri.path(), params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(page: u32, total: i64) -> PageWindow {
        PageWindow {
            page,
            page_size: 10,
            total,
        }
    }

    #[test]
    fn links_keep_filters_and_replace_page() {
        let uri: Uri = "/projetos/?ativo=true&pagina=2".parse().unwrap();
        let page = Page::new(window(2, 25), &uri, vec![1, 2, 3]);
        assert_eq!(page.links.proximo.as_deref(), Some("/projetos/?ativo=true&pagina=3"));
        assert_eq!(page.links.anterior.as_deref(), Some("/projetos/?ativo=true&pagina=1"));
        assert_eq!(page.quantidade, 25);
    }

    #[test]
    fn single_page_has_no_links() {
        let uri: Uri = "/grupos/".parse().unwrap();
        let page: Page<u8> = Page::new(window(1, 0), &uri, Vec::new());
        assert!(page.links.proximo.is_none());
        assert!(page.links.anterior.is_none());
        assert_eq!(page.pagina_atual, 1);
    }
}
