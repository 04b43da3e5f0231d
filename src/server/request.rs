use std::io::Read;

use anyhow::Result;
use http::Request;

/// Convert a wire request into the `http::Request` the router consumes.
///
/// The request target (path plus query) is carried as the URI; headers move
/// over verbatim; the body is read to its end into the request's buffer.
pub(crate) fn build_request(mut req: may_minihttp::Request) -> Result<Request<Vec<u8>>> {
    let method = req.method().to_string();
    let target = req.path().to_string();

    let mut builder = Request::builder().method(method.as_str()).uri(target.as_str());
    for header in req.headers() {
        builder = builder.header(header.name, header.value);
    }

    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;
    Ok(builder.body(body)?)
}
