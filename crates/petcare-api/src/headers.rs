// Outbound header set for every request to the service.
//
// The upstream API expects the same browser-like header set the official
// app sends, plus the per-process device id and the bearer token.

use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

const APP_ORIGIN: &str = "https://surepetcare.io";
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en-GB;q=0.9";
const REQUESTED_WITH_VALUE: &str = "com.sureflap.surepetcare";

pub const X_DEVICE_ID: HeaderName = HeaderName::from_static("x-device-id");
pub const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
/// Conditional header carrying the cached ETag. The service reads it under
/// this name rather than `If-None-Match`.
pub const ETAG: HeaderName = HeaderName::from_static("etag");

/// Build the header map for a request.
///
/// `Authorization` is only present when a token is held. `etag` is the
/// cached validator for the target resource, if any.
pub fn build_headers(device_id: &str, token: Option<&SecretString>, etag: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ORIGIN, HeaderValue::from_static(APP_ORIGIN));
    headers.insert(REFERER, HeaderValue::from_static(APP_ORIGIN));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
    headers.insert(X_REQUESTED_WITH, HeaderValue::from_static(REQUESTED_WITH_VALUE));

    insert_dynamic(&mut headers, X_DEVICE_ID, device_id);

    if let Some(token) = token {
        let bearer = format!("Bearer {}", token.expose_secret());
        match HeaderValue::from_str(&bearer) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("bearer token contains invalid header characters, omitting"),
        }
    }

    if let Some(etag) = etag {
        insert_dynamic(&mut headers, ETAG, etag);
    }

    headers
}

fn insert_dynamic(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => warn!(header = %name, "dropping header with invalid characters"),
    }
}
