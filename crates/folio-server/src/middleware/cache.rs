//! Cache-Control middleware.

use axum::http::HeaderValue;
use axum::http::header::CACHE_CONTROL;
use tower_http::set_header::SetResponseHeaderLayer;

/// `Cache-Control` value for `max_age` seconds.
fn cache_control(max_age: u32) -> HeaderValue {
    HeaderValue::try_from(format!("max-age={max_age}"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

/// Create layer that adds `Cache-Control: max-age=<max_age>` unless the
/// handler already set one.
pub(crate) fn cache_control_layer(max_age: u32) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(CACHE_CONTROL, cache_control(max_age))
}
