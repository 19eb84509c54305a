use std::sync::OnceLock;

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use sha2::{Digest as _, Sha256};

static INDEX_CSS: &str = include_str!("../../frontend/index.css");

static INDEX_CSS_VERSION: OnceLock<String> = OnceLock::new();

/// Hex encoded SHA-256 of the stylesheet, used for cache busting and as etag.
pub fn index_css_version() -> &'static str {
    INDEX_CSS_VERSION.get_or_init(|| format!("{:x}", Sha256::digest(INDEX_CSS.as_bytes())))
}

fn etag() -> String {
    format!("\"{}\"", index_css_version())
}

fn not_modified(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

pub async fn indexcss(headers: HeaderMap) -> Response {
    let etag = etag();
    if not_modified(&headers, &etag) {
        return StatusCode::NOT_MODIFIED.into_response();
    }
    let etag = HeaderValue::try_from(etag).unwrap_or_else(|_| HeaderValue::from_static("\"\""));
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/css; charset=utf-8"),
            ),
            (header::ETAG, etag),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=31536000, immutable"),
            ),
        ],
        INDEX_CSS,
    )
        .into_response()
}
