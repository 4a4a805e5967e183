//! Security headers added to every response.

use axum::http::HeaderValue;
use axum::http::header::{HeaderName, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use tower_http::set_header::SetResponseHeaderLayer;

/// Headers set on every response, overriding handler values.
const SECURITY_HEADERS: [(HeaderName, &str); 2] = [
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "DENY"),
];

/// One layer per security header.
pub(crate) fn security_header_layers() -> impl Iterator<Item = SetResponseHeaderLayer<HeaderValue>>
{
    SECURITY_HEADERS.into_iter().map(|(name, value)| {
        SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_layer_per_header() {
        assert_eq!(security_header_layers().count(), SECURITY_HEADERS.len());
    }
}
