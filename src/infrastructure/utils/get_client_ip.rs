use actix_web::http::header::HeaderMap;

use crate::constants::UNKNOWN_CLIENT;

/// Identify the caller for rate limiting.
///
/// The first `X-Forwarded-For` entry wins when proxy headers are
/// trusted; `X-Real-IP` is consulted either way. Callers without a usable
/// header share the `unknown` bucket. The socket address is not used:
/// behind the site's reverse proxy it is always the proxy itself.
pub fn get_client_ip(headers: &HeaderMap, trust_x_forwarded_for: bool) -> String {
    let forwarded = trust_x_forwarded_for
        .then(|| header_value(headers, "x-forwarded-for"))
        .flatten()
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    forwarded
        .or_else(|| {
            header_value(headers, "x-real-ip")
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
