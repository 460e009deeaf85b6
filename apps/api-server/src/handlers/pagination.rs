//! Page envelope and `next`/`previous` link construction.

use actix_web::HttpRequest;
use quill_core::query::Page;
use quill_shared::PageResponse;
use url::Url;

/// Wrap a page of results, linking to its neighbours with the request's own query string.
pub fn envelope<T>(req: &HttpRequest, page: Page<T>) -> PageResponse<T> {
    let next = if page.has_next() {
        page_link(req, page.page + 1)
    } else {
        None
    };
    let previous = if page.has_previous() {
        page_link(req, page.page - 1)
    } else {
        None
    };

    PageResponse {
        count: page.total,
        next,
        previous,
        results: page.items,
    }
}

/// The request URL with `page` replaced. Page 1 drops the parameter.
fn page_link(req: &HttpRequest, page: u64) -> Option<String> {
    let info = req.connection_info();
    let raw = format!("{}://{}{}", info.scheme(), info.host(), req.uri());
    let mut url = match Url::parse(&raw) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(url = %raw, error = %e, "Cannot build page link");
            return None;
        }
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| *key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    if !kept.is_empty() || page > 1 {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(kept);
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use quill_core::query::PageRequest;

    fn page_of(total: u64, page: u64) -> Page<u64> {
        let request = PageRequest::new(Some(page), Some(10)).unwrap();
        Page::new(Vec::new(), total, request)
    }

    #[test]
    fn test_middle_page_links_both_ways() {
        let req = TestRequest::get()
            .uri("/posts?page=2&ordering=-created_at")
            .to_http_request();
        let body = envelope(&req, page_of(25, 2));

        assert_eq!(body.count, 25);
        assert_eq!(
            body.next.as_deref(),
            Some("http://localhost:8080/posts?ordering=-created_at&page=3")
        );
        assert_eq!(
            body.previous.as_deref(),
            Some("http://localhost:8080/posts?ordering=-created_at")
        );
    }

    #[test]
    fn test_link_back_to_first_page_drops_query() {
        let req = TestRequest::get().uri("/posts?page=2").to_http_request();
        let body = envelope(&req, page_of(15, 2));

        assert!(body.next.is_none());
        assert_eq!(body.previous.as_deref(), Some("http://localhost:8080/posts"));
    }

    #[test]
    fn test_single_page_has_no_links() {
        let req = TestRequest::get().uri("/posts").to_http_request();
        let body = envelope(&req, page_of(3, 1));

        assert!(body.next.is_none());
        assert!(body.previous.is_none());
    }
}
