use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use may_minihttp::Response;

use crate::response::BufferedResponse;

/// Flush a buffered response out through the wire response.
pub(crate) fn flush(buffered: BufferedResponse, out: &mut Response) {
    let (status, headers, body) = buffered.into_parts();
    out.status_code(
        status.as_u16() as usize,
        status.canonical_reason().unwrap_or("Unknown"),
    );
    for (name, value) in headers.iter() {
        if let Some(line) = static_header_line(name, value) {
            out.header(line);
        } else if let Ok(text) = value.to_str() {
            // may_minihttp only accepts 'static header lines; uncommon
            // dynamic headers (e.g. Allow on a 405) pay a small leak.
            let line = format!("{}: {}", name.as_str(), text);
            out.header(Box::leak(line.into_boxed_str()));
        }
    }
    out.body_vec(body);
}

/// Write a bare error response without going through the router.
pub(crate) fn flush_error(out: &mut Response, status: StatusCode, message: &str) {
    out.status_code(
        status.as_u16() as usize,
        status.canonical_reason().unwrap_or("Unknown"),
    );
    out.header("Content-Type: text/plain; charset=utf-8");
    out.body_vec(message.as_bytes().to_vec());
}

/// The static header lines the pipeline emits most; everything here avoids
/// the leak in [`flush`].
fn static_header_line(name: &HeaderName, value: &HeaderValue) -> Option<&'static str> {
    let text = value.to_str().ok()?;
    if *name == CONTENT_TYPE {
        return match text {
            "application/json" => Some("Content-Type: application/json"),
            "application/xml; charset=UTF-8" => Some("Content-Type: application/xml; charset=UTF-8"),
            "text/html; charset=UTF-8" => Some("Content-Type: text/html; charset=UTF-8"),
            "text/plain; charset=utf-8" => Some("Content-Type: text/plain; charset=utf-8"),
            _ => None,
        };
    }
    None
}
