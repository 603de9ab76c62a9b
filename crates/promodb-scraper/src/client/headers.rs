//! Default headers sent with every promotions request.
//!
//! The endpoint is built for the retailer's web storefront and rejects
//! requests that do not look like they come from it.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};

pub(super) const STOREFRONT_REFERER: &str = "https://magnit.ru/";

const DEVICE_HEADERS: [(&str, &str); 5] = [
    ("x-device-id", "bm0h29is9e"),
    ("x-device-platform", "Web"),
    ("x-device-tag", "disabled"),
    ("x-platform-version", "window.navigator.userAgent"),
    ("x-app-version", "0.1.0"),
];

/// Everything except `User-Agent`, which is configurable and set on the
/// client builder.
pub(super) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(DEVICE_HEADERS.len() + 1);
    headers.insert(REFERER, HeaderValue::from_static(STOREFRONT_REFERER));
    for (name, value) in DEVICE_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}
